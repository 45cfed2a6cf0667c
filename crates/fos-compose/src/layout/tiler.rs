//! Tiler: proposes line geometry and detects when it was too shallow
//!
//! Each line attempt asks the [`GeometryProvider`] for regions sized for
//! the metrics known so far. Filling may reveal a taller style; the line is
//! then proposed again from the same y offset.

use super::metrics::{FirstLineMetric, LineMetrics, PageSide};
use crate::config::ComposerConfig;
use crate::geometry::Rect;
use crate::style::ParagraphStyle;
use crate::{ComposeError, Result};

/// Pagination state shared with the geometry provider
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationCursor {
    /// Host key of the frame being filled
    pub parcel: u64,
    /// Top of the next line
    pub y_offset: f32,
    pub first_line_metric: FirstLineMetric,
    /// The next line is the first of its frame
    pub at_top: bool,
    /// Line geometry depends on where the line lands
    pub position_dependent: bool,
    pub left_margin: f32,
    pub right_margin: f32,
    pub page_side: PageSide,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self {
            parcel: 0,
            y_offset: 0.0,
            first_line_metric: FirstLineMetric::Ascent,
            at_top: true,
            position_dependent: false,
            left_margin: 0.0,
            right_margin: f32::INFINITY,
            page_side: PageSide::Unisex,
        }
    }
}

/// What a line needs from the provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRequest {
    /// Narrowest usable region, indents included
    pub min_width: f32,
    /// Depth of the line
    pub height: f32,
    /// First-line metric assumed if this line starts a frame
    pub top_height: f32,
    /// Text offset of the line, for hosts that care
    pub text_offset: usize,
}

/// Answer of a geometry query
#[derive(Debug, Clone, PartialEq)]
pub enum TileQuery {
    /// Regions for the line, left to right; empty when no space is left
    Ready(Vec<Rect>),
    /// The cursor changed (for example the first-line metric); ask again
    Retry,
}

/// Host side of line geometry
pub trait GeometryProvider {
    /// Regions for the line at `cursor.y_offset`
    ///
    /// Implementations advance the cursor past the line they return.
    fn get_tiles(&mut self, request: &TileRequest, cursor: &mut PaginationCursor) -> TileQuery;
}

impl<G: GeometryProvider + ?Sized> GeometryProvider for &mut G {
    fn get_tiles(&mut self, request: &TileRequest, cursor: &mut PaginationCursor) -> TileQuery {
        (**self).get_tiles(request, cursor)
    }
}

/// Single column frame with an optional rectangular obstacle
///
/// Lines crossing the obstacle are split into the parts left and right of
/// it; parts narrower than the requested minimum are dropped, and when none
/// remain the line moves below the obstacle.
#[derive(Debug, Clone)]
pub struct ColumnGeometry {
    frame: Rect,
    obstacle: Option<Rect>,
}

impl ColumnGeometry {
    pub fn new(frame: Rect) -> Self {
        Self { frame, obstacle: None }
    }

    pub fn with_obstacle(mut self, obstacle: Rect) -> Self {
        self.obstacle = Some(obstacle);
        self
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Cursor at the top of the frame
    pub fn cursor(&self) -> PaginationCursor {
        PaginationCursor {
            y_offset: self.frame.top(),
            left_margin: self.frame.left(),
            right_margin: self.frame.right(),
            ..PaginationCursor::default()
        }
    }

    fn regions_at(&self, y: f32, height: f32, min_width: f32) -> Vec<Rect> {
        let line = Rect::new(self.frame.x, y, self.frame.width, height);
        let Some(ob) = self.obstacle.filter(|ob| y < ob.bottom() && y + height > ob.top()) else {
            return vec![line];
        };

        [
            Rect::new(line.left(), y, ob.left() - line.left(), height),
            Rect::new(ob.right(), y, line.right() - ob.right(), height),
        ]
        .into_iter()
        .filter(|r| r.width > 0.0 && r.width >= min_width)
        .collect()
    }
}

impl GeometryProvider for ColumnGeometry {
    fn get_tiles(&mut self, request: &TileRequest, cursor: &mut PaginationCursor) -> TileQuery {
        let mut y = cursor.y_offset;

        loop {
            if y + request.height > self.frame.bottom() + 1e-3 {
                return TileQuery::Ready(Vec::new());
            }

            let regions = self.regions_at(y, request.height, request.min_width);
            if !regions.is_empty() {
                cursor.y_offset = y + request.height;
                cursor.at_top = false;
                return TileQuery::Ready(regions);
            }

            match self.obstacle {
                Some(ob) if ob.bottom() > y => y = ob.bottom(),
                _ => return TileQuery::Ready(Vec::new()),
            }
        }
    }
}

/// Line geometry state machine
pub struct Tiler<G> {
    geometry: G,
    cursor: PaginationCursor,
    config: ComposerConfig,
    /// Leading the current proposal was made for
    height: f32,
    /// First-line metric the current proposal was made for
    top_height: f32,
    y_original: f32,
    at_top: bool,
    tiles: Vec<Rect>,
    drop_cap_line: bool,
    drop_cap_extent: Option<Rect>,
}

impl<G: GeometryProvider> Tiler<G> {
    pub fn new(geometry: G, cursor: PaginationCursor) -> Self {
        Self::with_config(geometry, cursor, ComposerConfig::default())
    }

    pub fn with_config(geometry: G, cursor: PaginationCursor, config: ComposerConfig) -> Self {
        Self {
            geometry,
            cursor,
            config,
            height: 0.0,
            top_height: 0.0,
            y_original: 0.0,
            at_top: false,
            tiles: Vec::new(),
            drop_cap_line: false,
            drop_cap_extent: None,
        }
    }

    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut PaginationCursor {
        &mut self.cursor
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    pub fn into_geometry(self) -> G {
        self.geometry
    }

    /// Regions of the current proposal, drop cap region first
    pub fn tiles(&self) -> &[Rect] {
        &self.tiles
    }

    /// Top of the line being proposed
    pub fn line_top(&self) -> f32 {
        self.y_original
    }

    /// Whether the current proposal started at the top of a frame
    pub fn at_top(&self) -> bool {
        self.at_top
    }

    pub fn is_drop_cap_line(&self) -> bool {
        self.drop_cap_line
    }

    /// Area still covered by the paragraph's drop cap
    pub fn drop_cap_extent(&self) -> Option<Rect> {
        self.drop_cap_extent
    }

    /// Propose regions for the next line
    ///
    /// Returns `false` when the provider has no more space.
    pub fn next_line(
        &mut self,
        lm: &LineMetrics,
        para: &ParagraphStyle,
        first_line: bool,
        text_offset: usize,
    ) -> Result<bool> {
        self.height = lm.leading;
        self.y_original = self.cursor.y_offset;
        self.at_top = self.cursor.at_top;
        self.drop_cap_line = false;
        self.tiles.clear();

        let indent_left = para.indent_left + if first_line { para.indent_first } else { 0.0 };
        let indent_right = para.indent_right;

        if first_line {
            self.drop_cap_extent = None;
        }

        if first_line && para.drop_cap.is_active() {
            let lines = para.drop_cap.lines as f32;
            let dclm = lm.scaled(lines);
            let min_width = lm.em_box_height * lines * para.drop_cap.clusters as f32;
            if !self.get_line_tiles(&dclm, min_width, indent_left, indent_right, text_offset)? {
                return Ok(false);
            }

            let drop = self.tiles[0];
            self.cursor.y_offset = self.y_original;
            self.cursor.at_top = self.at_top;
            if !self.get_line_tiles(lm, lm.em_box_height, indent_left, indent_right, text_offset)? {
                return Ok(false);
            }

            self.tiles.insert(0, drop);
            self.drop_cap_line = true;
            return Ok(true);
        }

        self.get_line_tiles(lm, lm.em_box_height, indent_left, indent_right, text_offset)
    }

    fn get_line_tiles(
        &mut self,
        lm: &LineMetrics,
        min_width: f32,
        indent_left: f32,
        indent_right: f32,
        text_offset: usize,
    ) -> Result<bool> {
        let mut queries = 0;

        loop {
            self.top_height = lm.get(self.cursor.first_line_metric);
            let request = TileRequest {
                min_width: min_width + indent_left + indent_right,
                height: lm.leading,
                top_height: self.top_height,
                text_offset,
            };

            let regions = match self.geometry.get_tiles(&request, &mut self.cursor) {
                TileQuery::Retry => {
                    queries += 1;
                    if queries >= self.config.max_tile_queries {
                        return Err(ComposeError::TileQueryLimit(self.config.max_tile_queries));
                    }
                    continue;
                }
                TileQuery::Ready(regions) => regions,
            };

            if regions.is_empty() {
                tracing::debug!(y = self.cursor.y_offset, "geometry exhausted");
                return Ok(false);
            }

            let left = self.cursor.left_margin + indent_left;
            let right = self.cursor.right_margin - indent_right;
            let extent = self.drop_cap_extent;
            self.tiles = regions
                .into_iter()
                .map(|mut r| {
                    if r.left() < left {
                        r.set_left(left);
                    }
                    if r.right() > right {
                        r.set_right(right);
                    }
                    if let Some(extent) = extent {
                        if r.top() < extent.bottom() && r.left() < extent.right() {
                            r.set_left(extent.right());
                        }
                    }
                    r
                })
                .filter(|r| r.width > 0.0)
                .collect();

            return Ok(!self.tiles.is_empty());
        }
    }

    /// Whether the filled line is deeper than the proposal allowed for
    pub fn need_retry_line(&self, lm: &LineMetrics) -> bool {
        lm.leading > self.height
            || (self.at_top && lm.get(self.cursor.first_line_metric) > self.top_height)
    }

    /// Rewind the cursor to the top of the current line
    pub fn reset_line(&mut self) {
        self.cursor.y_offset = self.y_original;
        self.cursor.at_top = self.at_top;
    }

    /// Remember the drop cap so following lines are indented past it
    pub fn record_drop_cap(&mut self, width: f32, height: f32) {
        if let Some(drop) = self.tiles.first().filter(|_| self.drop_cap_line) {
            self.drop_cap_extent = Some(Rect::new(drop.x, drop.y, width, height));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::UniformFont;
    use crate::style::CharacterStyle;
    use std::sync::Arc;

    fn metrics(size: f32) -> LineMetrics {
        LineMetrics::from_style(&CharacterStyle::new(Arc::new(UniformFont::new(0.5)), size))
    }

    fn tiler() -> Tiler<ColumnGeometry> {
        let geometry = ColumnGeometry::new(Rect::new(0.0, 0.0, 200.0, 100.0));
        let cursor = geometry.cursor();
        Tiler::new(geometry, cursor)
    }

    #[test]
    fn test_next_line_stacks_lines() {
        let mut t = tiler();
        let lm = metrics(10.0);
        let para = ParagraphStyle::default();

        assert!(t.next_line(&lm, &para, true, 0).unwrap());
        assert_eq!(t.tiles(), &[Rect::new(0.0, 0.0, 200.0, 12.0)]);
        assert!(t.at_top());

        assert!(t.next_line(&lm, &para, false, 0).unwrap());
        assert_eq!(t.tiles()[0].y, 12.0);
        assert!(!t.at_top());
    }

    #[test]
    fn test_indents_clamp_tiles() {
        let mut t = tiler();
        let para = ParagraphStyle::default().indents(10.0, 15.0, 5.0);

        t.next_line(&metrics(10.0), &para, true, 0).unwrap();
        assert_eq!(t.tiles()[0].left(), 25.0);
        assert_eq!(t.tiles()[0].right(), 195.0);

        t.next_line(&metrics(10.0), &para, false, 0).unwrap();
        assert_eq!(t.tiles()[0].left(), 10.0);
    }

    #[test]
    fn test_exhausted_frame() {
        let mut t = tiler();
        let lm = metrics(40.0);
        let para = ParagraphStyle::default();

        assert!(t.next_line(&lm, &para, true, 0).unwrap());
        assert!(t.next_line(&lm, &para, false, 0).unwrap());
        assert!(!t.next_line(&lm, &para, false, 0).unwrap());
    }

    #[test]
    fn test_retry_when_taller_style_found() {
        let mut t = tiler();
        let para = ParagraphStyle::default();
        t.next_line(&metrics(10.0), &para, false, 0).unwrap();

        assert!(!t.need_retry_line(&metrics(10.0)));
        assert!(t.need_retry_line(&metrics(15.0)));

        t.reset_line();
        assert_eq!(t.cursor().y_offset, 0.0);
        assert!(t.cursor().at_top);
    }

    #[test]
    fn test_obstacle_splits_line() {
        let geometry = ColumnGeometry::new(Rect::new(0.0, 0.0, 200.0, 100.0))
            .with_obstacle(Rect::new(80.0, 0.0, 40.0, 30.0));
        let cursor = geometry.cursor();
        let mut t = Tiler::new(geometry, cursor);

        t.next_line(&metrics(10.0), &ParagraphStyle::default(), false, 0).unwrap();
        assert_eq!(t.tiles().len(), 2);
        assert_eq!(t.tiles()[0].right(), 80.0);
        assert_eq!(t.tiles()[1].left(), 120.0);
    }

    #[test]
    fn test_narrow_parts_skip_below_obstacle() {
        let geometry = ColumnGeometry::new(Rect::new(0.0, 0.0, 100.0, 100.0))
            .with_obstacle(Rect::new(2.0, 0.0, 96.0, 30.0));
        let cursor = geometry.cursor();
        let mut t = Tiler::new(geometry, cursor);

        t.next_line(&metrics(10.0), &ParagraphStyle::default(), false, 0).unwrap();
        assert_eq!(t.tiles().len(), 1);
        assert_eq!(t.tiles()[0].y, 30.0);
    }

    #[test]
    fn test_drop_cap_proposal() {
        let mut t = tiler();
        let lm = metrics(10.0);
        let para = ParagraphStyle::default().drop_cap(3, 1);

        assert!(t.next_line(&lm, &para, true, 0).unwrap());
        assert!(t.is_drop_cap_line());
        assert_eq!(t.tiles().len(), 2);
        assert_eq!(t.tiles()[0].height, 36.0);
        assert_eq!(t.tiles()[1].height, 12.0);
        assert_eq!(t.cursor().y_offset, 12.0);

        t.record_drop_cap(20.0, 36.0);
        assert!(t.next_line(&lm, &para, false, 0).unwrap());
        assert_eq!(t.tiles()[0].left(), 20.0);
    }

    struct AlwaysRetry;

    impl GeometryProvider for AlwaysRetry {
        fn get_tiles(&mut self, _: &TileRequest, _: &mut PaginationCursor) -> TileQuery {
            TileQuery::Retry
        }
    }

    #[test]
    fn test_tile_query_limit() {
        let mut t = Tiler::new(AlwaysRetry, PaginationCursor::default());
        let err = t.next_line(&metrics(10.0), &ParagraphStyle::default(), false, 0);
        assert!(matches!(err, Err(ComposeError::TileQueryLimit(8))));
    }
}
