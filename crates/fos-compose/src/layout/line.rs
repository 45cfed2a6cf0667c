//! Line composition
//!
//! `compose_line` settles one line: propose geometry, fill and break the
//! tiles, check the line's depth and retry if a taller style turned up.
//! The resulting [`LineDescriptor`] records only spans and geometry;
//! `rebuild_line` re-shapes exactly those spans to produce output.

use super::metrics::{FirstLineMetric, LineMetrics, PageSide};
use super::output::{ClusterMap, LineSink, RunOutput};
use super::tile::{BreakOutcome, Tile};
use super::tiler::{GeometryProvider, Tiler};
use crate::font::FaceCache;
use crate::geometry::Rect;
use crate::host::TextSource;
use crate::{ComposeError, Result};

/// Geometry and content of one composed tile
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileDescriptor {
    pub x: f32,
    pub y: f32,
    pub target_width: f32,
    pub height: f32,
    /// Characters in the tile
    pub span: usize,
}

impl TileDescriptor {
    pub fn region(&self) -> Rect {
        Rect::new(self.x, self.y, self.target_width, self.height)
    }
}

/// Drop cap carried by the first line of a paragraph
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DropCapIndent {
    pub lines: usize,
    pub clusters: usize,
    /// Width of the enlarged clusters
    pub width: f32,
}

/// A composed line
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineDescriptor {
    /// Text offset of the first character
    pub offset: usize,
    pub tiles: Vec<TileDescriptor>,
    /// Characters in the line
    pub span: usize,
    /// Top of the line
    pub y: f32,
    pub line_height: f32,
    pub first_line_height: f32,
    pub first_line_metric: FirstLineMetric,
    pub metrics: LineMetrics,
    pub parcel: u64,
    pub at_top: bool,
    pub position_dependent: bool,
    /// More than one tile; the host must not reorder them
    pub no_shuffle: bool,
    pub drop_cap: Option<DropCapIndent>,
    /// Some tile holds more than fits its region
    pub overset: bool,
    pub page_side: PageSide,
}

impl LineDescriptor {
    /// Offset just past the line
    pub fn end(&self) -> usize {
        self.offset + self.span
    }
}

/// Compose the line starting at `offset`
///
/// Returns `Ok(None)` once the text or the available geometry runs out.
pub fn compose_line<G: GeometryProvider>(
    tiler: &mut Tiler<G>,
    faces: &mut FaceCache,
    source: &dyn TextSource,
    offset: usize,
) -> Result<Option<LineDescriptor>> {
    let bounds = source.paragraph_bounds(offset);
    let Some(chunk) = source.text_at(offset) else {
        return Ok(None);
    };
    let style = chunk.style.ok_or(ComposeError::MissingStyle(offset))?;

    let first_line = offset == bounds.start;
    let span_wanted = bounds.end.saturating_sub(offset);
    let max_attempts = tiler.config().max_line_attempts;
    let factor = tiler.config().fallback_stretch_factor;
    let mut lm = LineMetrics::from_style(&style);

    for attempt in 1..=max_attempts {
        let para = source
            .paragraph_style_at(offset)
            .ok_or(ComposeError::MissingStyle(offset))?;

        if !tiler.next_line(&lm, &para, first_line, offset)? {
            return Ok(None);
        }

        let mut tiles: Vec<Tile> = tiler.tiles().iter().map(|r| Tile::new(*r)).collect();
        tiles[0].fill_by_span(source, faces, offset, span_wanted)?;

        let drop_cap = tiler.is_drop_cap_line() && tiles.len() > 1;
        let mut drop_width = 0.0;
        let mut start = 0;
        if drop_cap {
            let (head, tail) = tiles.split_at_mut(1);
            drop_width = head[0].break_drop_caps(
                para.drop_cap.lines,
                para.drop_cap.clusters,
                &mut tail[0],
            );
            start = 1;
        }

        let mut overset = false;
        let mut runoff = Tile::default();
        for i in start..tiles.len() {
            let (head, tail) = tiles.split_at_mut(i + 1);
            let tile = &mut head[i];
            tile.apply_tab_widths(&para);
            let next = tail.first_mut().unwrap_or(&mut runoff);
            match tile.break_into(next, &para, factor) {
                BreakOutcome::Overset => overset = true,
                BreakOutcome::Forced => {
                    // Later tiles of this line stay empty
                    if let Some(next) = tail.first_mut() {
                        runoff.thread_mut().append(std::mem::take(next.thread_mut()));
                    }
                    break;
                }
                BreakOutcome::Fits | BreakOutcome::Broken => {}
            }
        }

        for tile in &tiles[start..] {
            tile.update_line_metrics(&mut lm);
        }
        let span: usize = tiles.iter().map(Tile::span).sum();

        if span == 0 {
            tracing::debug!(attempt, offset, "empty line, moving down");
            continue;
        }
        if tiler.need_retry_line(&lm) {
            tracing::debug!(attempt, offset, leading = lm.leading, "line too shallow, retrying");
            tiler.reset_line();
            continue;
        }

        if drop_cap {
            tiler.record_drop_cap(drop_width, lm.leading * para.drop_cap.lines as f32);
        }

        let cursor = tiler.cursor();
        let line = LineDescriptor {
            offset,
            tiles: tiles
                .iter()
                .map(|t| TileDescriptor {
                    x: t.region.x,
                    y: t.region.y,
                    target_width: t.region.width,
                    height: t.region.height,
                    span: t.span(),
                })
                .collect(),
            span,
            y: tiler.line_top(),
            line_height: lm.leading,
            first_line_height: lm.get(cursor.first_line_metric),
            first_line_metric: cursor.first_line_metric,
            metrics: lm,
            parcel: cursor.parcel,
            at_top: tiler.at_top(),
            position_dependent: cursor.position_dependent,
            no_shuffle: tiles.len() > 1,
            drop_cap: drop_cap.then(|| DropCapIndent {
                lines: para.drop_cap.lines,
                clusters: para.drop_cap.clusters,
                width: drop_width,
            }),
            overset,
            page_side: cursor.page_side,
        };

        tracing::trace!(offset, span, tiles = line.tiles.len(), overset, "composed line");
        return Ok(Some(line));
    }

    Err(ComposeError::RetryLimit(max_attempts))
}

/// Compose lines until the paragraph at `offset` is used up
///
/// Stops early, without error, when the geometry runs out.
pub fn compose_paragraph<G: GeometryProvider>(
    tiler: &mut Tiler<G>,
    faces: &mut FaceCache,
    source: &dyn TextSource,
    offset: usize,
) -> Result<Vec<LineDescriptor>> {
    let end = source.paragraph_bounds(offset).end;
    let mut lines = Vec::new();
    let mut at = offset;

    while at < end {
        match compose_line(tiler, faces, source, at)? {
            Some(line) if line.span > 0 => {
                at = line.end();
                lines.push(line);
            }
            _ => break,
        }
    }

    Ok(lines)
}

/// Re-shape a composed line and hand its runs to `sink`
///
/// Every tile must refill to the span it was composed with. Nothing reaches
/// the sink unless all tiles rebuild.
pub fn rebuild_line(
    faces: &mut FaceCache,
    source: &dyn TextSource,
    line: &LineDescriptor,
    sink: &mut dyn LineSink,
) -> Result<()> {
    if line.tiles.is_empty() {
        return Err(ComposeError::EmptyRebuild);
    }

    let para = source
        .paragraph_style_at(line.offset)
        .ok_or(ComposeError::MissingStyle(line.offset))?;
    let paragraph_end = source.paragraph_bounds(line.offset).end;

    let mut built = Vec::with_capacity(line.tiles.len());
    let mut offset = line.offset;

    for (i, td) in line.tiles.iter().enumerate() {
        let mut tile = Tile::new(td.region());
        tile.fill_by_span(source, faces, offset, td.span)?;
        if tile.span() != td.span {
            return Err(ComposeError::SpanMismatch {
                tile: i,
                expected: td.span,
                actual: tile.span(),
            });
        }
        offset += td.span;

        let x_offset = match line.drop_cap {
            Some(dc) if i == 0 => {
                tile.scale(dc.lines as f32);
                0.0
            }
            _ => tile.align_text(&para, line.page_side, offset >= paragraph_end),
        };
        tile.thread_mut().merge_runs();
        built.push((tile, x_offset));
    }

    sink.begin_line(line);
    for (index, (tile, x_offset)) in built.iter().enumerate() {
        let mut x = tile.region.x + x_offset;
        for (r, run) in tile.runs().iter().enumerate() {
            let clusters = tile.thread().run_clusters(r);
            let glyphs = clusters.iter().flat_map(|c| c.glyphs());
            let width: f32 = clusters.iter().map(|c| c.width()).sum();

            sink.add_run(RunOutput {
                tile: index,
                x,
                style: run.style.clone(),
                kind: run.kind.clone(),
                glyph_ids: glyphs.clone().map(|g| g.id).collect(),
                advances: glyphs.clone().map(|g| g.advance()).collect(),
                offsets: glyphs.map(|g| g.offset).collect(),
                clusters: clusters
                    .iter()
                    .map(|c| ClusterMap {
                        chars: c.span,
                        glyphs: c.len(),
                        width: c.width(),
                    })
                    .collect(),
                horizontal_scale: 1.0 + run.extra_scale,
                height: run.height,
                width,
            });
            x += width;
        }
    }
    sink.finish_line();

    Ok(())
}
