//! fOS Compose - Paragraph Composition Engine
//!
//! This crate turns styled paragraph text into composed lines:
//! - Shaping text into glyph clusters (rustybuzz, with a per-character fallback)
//! - Grouping clusters into runs of one style and runs into tiles of one region
//! - Choosing break points with TeX style badness/demerits scoring
//! - Justifying lines across fill, space, letter and glyph-scale stretch
//! - Proposing line geometry and retrying when a taller style shows up
//!
//! The host supplies text and styles ([`TextSource`]), line geometry
//! ([`GeometryProvider`]) and receives renderable runs through a [`LineSink`].

pub mod config;
pub mod font;
pub mod geometry;
pub mod host;
pub mod layout;
pub mod shaping;
pub mod style;

pub use config::ComposerConfig;
pub use font::{FaceCache, FaceCacheStats, FontFace, FontRef, FontTechnology};
pub use geometry::{Point, Rect};
pub use host::{HostFont, InlineObject, StyledText, TextChunk, TextSource, UniformFont};
pub use layout::{
    compose_line, compose_paragraph, rebuild_line, BreakOutcome, Cluster, ClusterMap,
    ClusterThread, ColumnGeometry, DropCapIndent, FirstLineMetric, GeometryProvider, Glyph,
    JustifyOutcome, Justification, LineDescriptor, LineMetrics, LineSink, PageSide,
    PaginationCursor, Penalty, RenderedLine, Run, RunKind, RunOutput, Tile, TileDescriptor,
    TileQuery, TileRequest, Tiler,
};
pub use shaping::{ShapedRun, ShapingStrategy};
pub use style::{
    Alignment, CharacterStyle, DropCap, FontMetrics, ParagraphStyle, SpacingRange, TabAlignment,
    TabStop,
};

/// Composition error types
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("No style available at text offset {0}")]
    MissingStyle(usize),

    #[error("No font available for style: {0}")]
    MissingFont(String),

    #[error("Failed to load font face {path}: {reason}")]
    FontLoad { path: String, reason: String },

    #[error("Shaping failed: {0}")]
    ShapingFailed(String),

    #[error("Tile {tile} refilled {actual} characters, expected {expected}")]
    SpanMismatch {
        tile: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Line geometry did not settle after {0} attempts")]
    RetryLimit(usize),

    #[error("Geometry provider asked for more than {0} re-queries")]
    TileQueryLimit(usize),

    #[error("Line descriptor has no tiles to rebuild")]
    EmptyRebuild,
}

pub type Result<T> = std::result::Result<T, ComposeError>;
