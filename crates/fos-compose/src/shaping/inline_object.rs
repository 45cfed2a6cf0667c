//! Placeholder runs for anchored objects

use super::ShapedRun;
use crate::host::InlineObject;
use crate::layout::{Cluster, Justification, Penalty, RunKind};

/// Glyph id carried by object placeholders
pub const OBJECT_GLYPH: u16 = u16::MAX;

/// A single fixed cluster sized by the object
///
/// The marker is always consumed. A missing object leaves a zero-width
/// cluster so the text around it still composes.
pub(crate) fn shape(object: Option<InlineObject>) -> ShapedRun {
    let (width, height) = match object {
        Some(obj) => (obj.width, Some(obj.height)),
        None => {
            tracing::debug!("Inline object marker without an object, using zero width");
            (0.0, None)
        }
    };

    ShapedRun {
        kind: RunKind::InlineObject(object),
        clusters: vec![Cluster::glue(OBJECT_GLYPH, Justification::Fixed, width, Penalty::CLIP)],
        consumed: 1,
        height,
        forbid_break_before: false,
    }
}
