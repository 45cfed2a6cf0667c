//! Text shaping module
//!
//! Turns one style chunk of text into clusters. Three strategies share one
//! entry point: font shaping through rustybuzz, per-character fallback
//! through the host font, and inline object placeholders.

mod breaks;
mod builder;
mod control;
mod fallback;
mod inline_object;
mod shaper;

use std::sync::Arc;

use crate::font::{FaceCache, FontFace};
use crate::host::{InlineObject, TextSource};
use crate::layout::{Cluster, RunKind};
use crate::style::CharacterStyle;

pub use inline_object::OBJECT_GLYPH;

/// Output of one shaping call
#[derive(Debug, Clone)]
pub struct ShapedRun {
    pub kind: RunKind,
    pub clusters: Vec<Cluster>,
    /// Characters consumed from the chunk
    pub consumed: usize,
    /// Height override for the run (inline objects)
    pub height: Option<f32>,
    /// The run starts with never-break glue, so the cluster before it
    /// must not be a break either
    pub forbid_break_before: bool,
}

impl ShapedRun {
    fn empty(kind: RunKind) -> Self {
        Self {
            kind,
            clusters: Vec::new(),
            consumed: 0,
            height: None,
            forbid_break_before: false,
        }
    }
}

/// How a chunk of text is shaped
#[derive(Debug, Clone)]
pub enum ShapingStrategy {
    /// Shape through the face's OpenType tables
    FontShaped(Arc<FontFace>),
    /// One glyph per character from the host font
    Fallback,
    /// Placeholder for the object anchored at the marker
    InlineObject(Option<InlineObject>),
}

impl ShapingStrategy {
    /// Pick the strategy for the chunk starting at `offset`
    pub fn select(
        faces: &mut FaceCache,
        source: &dyn TextSource,
        style: &CharacterStyle,
        text: &str,
        offset: usize,
    ) -> Self {
        if text.starts_with(control::OBJECT_REPLACEMENT) {
            return ShapingStrategy::InlineObject(source.inline_object_at(offset));
        }

        match faces.lookup(&style.font) {
            Some(face) => ShapingStrategy::FontShaped(face),
            None => {
                if style.font.path.is_some() {
                    tracing::debug!(
                        "No shapeable face for {:?}, using fallback shaping",
                        style.font.path
                    );
                }
                ShapingStrategy::Fallback
            }
        }
    }

    pub fn kind(&self) -> RunKind {
        match self {
            ShapingStrategy::FontShaped(_) => RunKind::Shaped,
            ShapingStrategy::Fallback => RunKind::Fallback,
            ShapingStrategy::InlineObject(obj) => RunKind::InlineObject(*obj),
        }
    }

    /// Shape from the start of `text` until a run-ending control
    pub fn shape(&self, style: &CharacterStyle, text: &str) -> ShapedRun {
        match self {
            ShapingStrategy::InlineObject(obj) => inline_object::shape(*obj),
            _ => builder::build(self, style, text),
        }
    }

    /// Clusters for text that holds no control characters
    fn shape_segment(&self, style: &CharacterStyle, text: &str) -> Vec<Cluster> {
        match self {
            ShapingStrategy::FontShaped(face) => {
                shaper::shape(face, style, text).unwrap_or_else(|| {
                    tracing::warn!("rustybuzz could not read face, using fallback shaping");
                    fallback::shape(style, text)
                })
            }
            _ => fallback::shape(style, text),
        }
    }
}

/// Shape the next run of a chunk
pub(crate) fn create_run(
    faces: &mut FaceCache,
    source: &dyn TextSource,
    style: &CharacterStyle,
    text: &str,
    offset: usize,
) -> ShapedRun {
    let strategy = ShapingStrategy::select(faces, source, style, text, offset);
    let run = strategy.shape(style, text);
    tracing::trace!(
        offset,
        consumed = run.consumed,
        clusters = run.clusters.len(),
        "shaped run"
    );
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{StyledText, UniformFont};
    use crate::style::ParagraphStyle;

    fn style() -> Arc<CharacterStyle> {
        Arc::new(CharacterStyle::new(Arc::new(UniformFont::new(0.5)), 20.0))
    }

    #[test]
    fn test_select_fallback_without_font_file() {
        let s = style();
        let text = StyledText::new(ParagraphStyle::default()).push("abc", &s);
        let mut faces = FaceCache::new(4);
        let strategy = ShapingStrategy::select(&mut faces, &text, &s, "abc", 0);
        assert!(matches!(strategy, ShapingStrategy::Fallback));
        assert_eq!(strategy.kind(), RunKind::Fallback);
    }

    #[test]
    fn test_select_inline_object() {
        let s = style();
        let obj = InlineObject {
            id: 1,
            width: 12.0,
            height: 8.0,
        };
        let text = StyledText::new(ParagraphStyle::default()).push_object(obj, &s);
        let mut faces = FaceCache::new(4);

        let run = create_run(&mut faces, &text, &s, "\u{FFFC}", 0);
        assert_eq!(run.kind, RunKind::InlineObject(Some(obj)));
        assert_eq!(run.consumed, 1);
        assert_eq!(run.clusters[0].width(), 12.0);
    }

    #[test]
    fn test_unreadable_font_falls_back() {
        let font = crate::font::FontRef::new(
            "/nonexistent/face.otf",
            crate::font::FontTechnology::OpenType,
        );
        let s = CharacterStyle::new(Arc::new(UniformFont::new(0.5)), 20.0).with_font(font);
        let text = StyledText::new(ParagraphStyle::default()).push("ab", &Arc::new(s.clone()));
        let mut faces = FaceCache::new(4);

        let run = create_run(&mut faces, &text, &s, "ab", 0);
        assert_eq!(run.kind, RunKind::Fallback);
        assert_eq!(run.consumed, 2);
    }
}
