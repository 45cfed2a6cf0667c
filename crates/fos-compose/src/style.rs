//! Character and paragraph style snapshots
//!
//! Styles are read-only values handed to the composer by the host. They are
//! re-queried on every line attempt, so a host may change them between calls.

use std::sync::Arc;

use crate::font::FontRef;
use crate::host::HostFont;

/// Vertical font metrics at a given point size
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub cap_height: f32,
    pub x_height: f32,
    pub em_box_height: f32,
    pub em_box_depth: f32,
}

impl FontMetrics {
    /// Typical Latin proportions, used when the host has no better numbers
    pub fn from_point_size(point_size: f32) -> Self {
        Self {
            ascent: point_size * 0.8,
            descent: point_size * 0.2,
            cap_height: point_size * 0.7,
            x_height: point_size * 0.5,
            em_box_height: point_size * 0.88,
            em_box_depth: point_size * 0.12,
        }
    }

    /// Metrics read from a parsed face
    pub fn from_face(face: &crate::font::FontFace, point_size: f32) -> Self {
        let scale = point_size / face.units_per_em() as f32;
        let ascent = face.ascender() as f32 * scale;
        let descent = -(face.descender() as f32) * scale;
        let fallback = Self::from_point_size(point_size);
        Self {
            ascent,
            descent,
            cap_height: face
                .cap_height()
                .map(|h| h as f32 * scale)
                .unwrap_or(fallback.cap_height),
            x_height: face
                .x_height()
                .map(|h| h as f32 * scale)
                .unwrap_or(fallback.x_height),
            em_box_height: fallback.em_box_height,
            em_box_depth: fallback.em_box_depth,
        }
    }
}

/// Text style for a span of characters
#[derive(Debug, Clone)]
pub struct CharacterStyle {
    /// File backed font, used for smart shaping
    pub font: FontRef,
    /// Host font, used for fallback shaping and glue glyphs
    pub host_font: Arc<dyn HostFont>,
    pub point_size: f32,
    pub leading: f32,
    pub metrics: FontMetrics,
    pub space_width: f32,
    pub en_space_width: f32,
    pub em_space_width: f32,
    /// Desired width of a word space
    pub altered_word_space: f32,
    /// Tracking added after every letter
    pub altered_letter_space: f32,
    /// Text in this style is never broken
    pub no_break: bool,
    /// Runs with equal keys may be merged for output
    pub share_key: u64,
}

impl CharacterStyle {
    /// Create a style with defaults derived from the point size
    pub fn new(host_font: Arc<dyn HostFont>, point_size: f32) -> Self {
        let space_width = host_font
            .glyph_id(' ')
            .map(|gid| host_font.advance(gid, point_size))
            .unwrap_or(point_size / 4.0);

        Self {
            font: FontRef::default(),
            host_font,
            point_size,
            leading: point_size * 1.2,
            metrics: FontMetrics::from_point_size(point_size),
            space_width,
            en_space_width: point_size / 2.0,
            em_space_width: point_size,
            altered_word_space: space_width,
            altered_letter_space: 0.0,
            no_break: false,
            share_key: 0,
        }
    }

    pub fn with_font(mut self, font: FontRef) -> Self {
        self.font = font;
        self
    }

    pub fn with_leading(mut self, leading: f32) -> Self {
        self.leading = leading;
        self
    }

    pub fn with_metrics(mut self, metrics: FontMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Set the natural space width; the desired word space follows it
    pub fn with_space_width(mut self, width: f32) -> Self {
        self.space_width = width;
        self.altered_word_space = width;
        self
    }

    pub fn with_word_space(mut self, width: f32) -> Self {
        self.altered_word_space = width;
        self
    }

    pub fn with_letter_space(mut self, tracking: f32) -> Self {
        self.altered_letter_space = tracking;
        self
    }

    pub fn with_no_break(mut self, no_break: bool) -> Self {
        self.no_break = no_break;
        self
    }

    pub fn with_share_key(mut self, key: u64) -> Self {
        self.share_key = key;
        self
    }

    /// Glyph used for inserted glue
    pub fn space_glyph(&self) -> u16 {
        self.host_font.glyph_id(' ').unwrap_or(0)
    }

    /// Advance of a single character in the host font
    pub fn char_width(&self, c: char) -> f32 {
        self.host_font
            .glyph_id(c)
            .map(|gid| self.host_font.advance(gid, self.point_size))
            .unwrap_or(0.0)
    }
}

/// Paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alignment {
    #[default]
    Left,
    Right,
    Center,
    JustifyFull,
    JustifyLeft,
    JustifyCenter,
    JustifyRight,
    ToBinding,
    AwayBinding,
}

impl Alignment {
    pub fn is_justified(self) -> bool {
        matches!(
            self,
            Alignment::JustifyFull
                | Alignment::JustifyLeft
                | Alignment::JustifyCenter
                | Alignment::JustifyRight
        )
    }
}

/// Minimum, desired and maximum value of a spacing control
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingRange {
    pub min: f32,
    pub desired: f32,
    pub max: f32,
}

impl SpacingRange {
    pub fn new(min: f32, desired: f32, max: f32) -> Self {
        Self { min, desired, max }
    }

    /// A range that allows no variation around `value`
    pub fn fixed(value: f32) -> Self {
        Self::new(value, value, value)
    }

    /// How far below the desired value we may go
    pub fn shrink(&self) -> f32 {
        (self.desired - self.min).max(0.0)
    }

    /// How far above the desired value we may go
    pub fn grow(&self) -> f32 {
        (self.max - self.desired).max(0.0)
    }
}

/// Drop cap settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropCap {
    /// Number of lines the drop cap occupies
    pub lines: usize,
    /// Number of clusters the drop cap consumes
    pub clusters: usize,
}

impl Default for DropCap {
    fn default() -> Self {
        Self { lines: 1, clusters: 0 }
    }
}

impl DropCap {
    pub fn is_active(&self) -> bool {
        self.lines > 1 && self.clusters > 0
    }
}

/// Tab stop alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabAlignment {
    #[default]
    Left,
    Center,
    Right,
    /// Align on the first occurrence of a character
    Char,
}

/// Tab stop, positioned relative to the left edge of the tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabStop {
    pub position: f32,
    pub alignment: TabAlignment,
    pub align_char: char,
}

impl TabStop {
    pub fn new(position: f32, alignment: TabAlignment) -> Self {
        Self {
            position,
            alignment,
            align_char: '.',
        }
    }

    pub fn on_char(position: f32, c: char) -> Self {
        Self {
            position,
            alignment: TabAlignment::Char,
            align_char: c,
        }
    }
}

/// Paragraph level composition settings
#[derive(Debug, Clone)]
pub struct ParagraphStyle {
    pub alignment: Alignment,
    pub indent_left: f32,
    pub indent_first: f32,
    pub indent_right: f32,
    /// Word space as a fraction of the natural space width
    pub word_space: SpacingRange,
    /// Letter space as a fraction of each glyph's width
    pub letter_space: SpacingRange,
    /// Horizontal glyph scale
    pub glyph_scale: SpacingRange,
    pub drop_cap: DropCap,
    /// Explicit stops, sorted by position
    pub tab_stops: Vec<TabStop>,
    pub default_tab_interval: f32,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self {
            alignment: Alignment::Left,
            indent_left: 0.0,
            indent_first: 0.0,
            indent_right: 0.0,
            word_space: SpacingRange::new(0.8, 1.0, 1.33),
            letter_space: SpacingRange::fixed(0.0),
            glyph_scale: SpacingRange::fixed(1.0),
            drop_cap: DropCap::default(),
            tab_stops: Vec::new(),
            default_tab_interval: 36.0,
        }
    }
}

impl ParagraphStyle {
    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn indents(mut self, left: f32, first: f32, right: f32) -> Self {
        self.indent_left = left;
        self.indent_first = first;
        self.indent_right = right;
        self
    }

    pub fn word_space(mut self, range: SpacingRange) -> Self {
        self.word_space = range;
        self
    }

    pub fn letter_space(mut self, range: SpacingRange) -> Self {
        self.letter_space = range;
        self
    }

    pub fn glyph_scale(mut self, range: SpacingRange) -> Self {
        self.glyph_scale = range;
        self
    }

    pub fn drop_cap(mut self, lines: usize, clusters: usize) -> Self {
        self.drop_cap = DropCap { lines, clusters };
        self
    }

    pub fn tab_stop(mut self, stop: TabStop) -> Self {
        let at = self
            .tab_stops
            .partition_point(|s| s.position <= stop.position);
        self.tab_stops.insert(at, stop);
        self
    }

    pub fn default_tab_interval(mut self, interval: f32) -> Self {
        self.default_tab_interval = interval;
        self
    }

    /// First tab stop strictly after `position`
    ///
    /// Past the last explicit stop, left aligned stops repeat every
    /// `default_tab_interval`.
    pub fn tab_stop_after(&self, position: f32) -> TabStop {
        if let Some(stop) = self.tab_stops.iter().find(|s| s.position > position) {
            return *stop;
        }

        let interval = if self.default_tab_interval > 0.0 {
            self.default_tab_interval
        } else {
            36.0
        };
        let next = ((position / interval).floor() + 1.0) * interval;
        TabStop::new(next, TabAlignment::Left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::UniformFont;

    #[test]
    fn test_metrics_from_face_scale_by_em() {
        let data = crate::font::test_font_data(1000, 800, -200);
        let face = crate::font::FontFace::from_data(data, 0).unwrap();
        let metrics = FontMetrics::from_face(&face, 10.0);

        assert!((metrics.ascent - 8.0).abs() < 1e-4);
        assert!((metrics.descent - 2.0).abs() < 1e-4);
        // Face without OS/2 heights falls back to the point size estimate
        let fallback = FontMetrics::from_point_size(10.0);
        assert_eq!(metrics.cap_height, fallback.cap_height);
        assert_eq!(metrics.x_height, fallback.x_height);
        assert_eq!(metrics.em_box_height, fallback.em_box_height);
    }

    #[test]
    fn test_style_defaults_from_font() {
        let style = CharacterStyle::new(Arc::new(UniformFont::new(0.5)), 20.0);
        assert_eq!(style.space_width, 10.0);
        assert_eq!(style.altered_word_space, 10.0);
        assert_eq!(style.leading, 24.0);
        assert_eq!(style.em_space_width, 20.0);
    }

    #[test]
    fn test_spacing_range() {
        let r = SpacingRange::new(0.8, 1.0, 1.5);
        assert!((r.shrink() - 0.2).abs() < 1e-6);
        assert!((r.grow() - 0.5).abs() < 1e-6);
        assert_eq!(SpacingRange::fixed(1.0).grow(), 0.0);
    }

    #[test]
    fn test_tab_stop_after_explicit() {
        let para = ParagraphStyle::default()
            .tab_stop(TabStop::new(100.0, TabAlignment::Right))
            .tab_stop(TabStop::new(50.0, TabAlignment::Left));

        assert_eq!(para.tab_stop_after(0.0).position, 50.0);
        let stop = para.tab_stop_after(50.0);
        assert_eq!(stop.position, 100.0);
        assert_eq!(stop.alignment, TabAlignment::Right);
    }

    #[test]
    fn test_tab_stop_after_default_interval() {
        let para = ParagraphStyle::default().default_tab_interval(40.0);
        assert_eq!(para.tab_stop_after(0.0).position, 40.0);
        assert_eq!(para.tab_stop_after(40.0).position, 80.0);
        assert_eq!(para.tab_stop_after(95.0).position, 120.0);
    }

    #[test]
    fn test_drop_cap_activity() {
        assert!(!DropCap::default().is_active());
        assert!(DropCap { lines: 3, clusters: 1 }.is_active());
        assert!(!DropCap { lines: 3, clusters: 0 }.is_active());
    }

    #[test]
    fn test_justified_alignments() {
        assert!(Alignment::JustifyLeft.is_justified());
        assert!(!Alignment::Center.is_justified());
        assert!(!Alignment::ToBinding.is_justified());
    }
}
