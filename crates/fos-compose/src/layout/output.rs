//! Output sink for rebuilt lines

use std::sync::Arc;

use super::line::LineDescriptor;
use super::run::RunKind;
use crate::geometry::Point;
use crate::style::CharacterStyle;

/// Characters and glyphs of one cluster, in output order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterMap {
    pub chars: usize,
    pub glyphs: usize,
    pub width: f32,
}

/// One renderable run
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Index of the tile the run belongs to
    pub tile: usize,
    /// Left edge of the run's first glyph
    pub x: f32,
    pub style: Arc<CharacterStyle>,
    pub kind: RunKind,
    pub glyph_ids: Vec<u16>,
    pub advances: Vec<f32>,
    pub offsets: Vec<Point>,
    pub clusters: Vec<ClusterMap>,
    /// Horizontal glyph scale, 1.0 when unscaled
    pub horizontal_scale: f32,
    pub height: f32,
    pub width: f32,
}

impl RunOutput {
    /// Characters covered by the run
    pub fn span(&self) -> usize {
        self.clusters.iter().map(|c| c.chars).sum()
    }
}

/// Receives rebuilt lines
pub trait LineSink {
    fn begin_line(&mut self, line: &LineDescriptor);
    fn add_run(&mut self, run: RunOutput);
    fn finish_line(&mut self);
}

/// Collects one rebuilt line in memory
#[derive(Debug, Clone, Default)]
pub struct RenderedLine {
    pub line: Option<LineDescriptor>,
    pub runs: Vec<RunOutput>,
    pub finished: bool,
}

impl RenderedLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of run widths
    pub fn width(&self) -> f32 {
        self.runs.iter().map(|r| r.width).sum()
    }

    pub fn span(&self) -> usize {
        self.runs.iter().map(RunOutput::span).sum()
    }

    /// Runs belonging to one tile
    pub fn tile_runs(&self, tile: usize) -> impl Iterator<Item = &RunOutput> {
        self.runs.iter().filter(move |r| r.tile == tile)
    }

    /// Width of one tile's runs
    pub fn tile_width(&self, tile: usize) -> f32 {
        self.tile_runs(tile).map(|r| r.width).sum()
    }
}

impl LineSink for RenderedLine {
    fn begin_line(&mut self, line: &LineDescriptor) {
        self.line = Some(line.clone());
        self.runs.clear();
        self.finished = false;
    }

    fn add_run(&mut self, run: RunOutput) {
        self.runs.push(run);
    }

    fn finish_line(&mut self) {
        self.finished = true;
    }
}
