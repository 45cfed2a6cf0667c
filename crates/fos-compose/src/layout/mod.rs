//! Paragraph layout module
//!
//! Glyphs group into clusters, clusters into runs of one style, runs into
//! tiles of one region and tiles into lines.

mod cluster;
mod glyph;
mod line;
mod metrics;
mod output;
mod run;
mod thread;
mod tile;
mod tiler;

pub use cluster::{Cluster, Penalty};
pub use glyph::{ClassStretch, Glyph, Justification, StretchTable};
pub use line::{
    compose_line, compose_paragraph, rebuild_line, DropCapIndent, LineDescriptor, TileDescriptor,
};
pub use metrics::{FirstLineMetric, LineMetrics, PageSide};
pub use output::{ClusterMap, LineSink, RenderedLine, RunOutput};
pub use run::{Adjustment, Run, RunKind};
pub use thread::ClusterThread;
pub use tile::{badness, demerits, BreakOutcome, JustifyOutcome, Tile};
pub use tiler::{ColumnGeometry, GeometryProvider, PaginationCursor, TileQuery, TileRequest, Tiler};
