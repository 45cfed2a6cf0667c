//! Host interfaces
//!
//! The composer reads text, styles and inline objects through [`TextSource`]
//! and measures fallback glyphs through [`HostFont`]. [`StyledText`] and
//! [`UniformFont`] are in-memory implementations.

use std::collections::HashMap;
use std::fmt::Debug;
use std::ops::Range;
use std::sync::Arc;

use crate::style::{CharacterStyle, ParagraphStyle};

/// Paragraph separator characters
pub(crate) fn is_paragraph_end(c: char) -> bool {
    c == '\r' || c == '\u{2029}'
}

/// Host font used for per-character shaping
pub trait HostFont: Debug + Send + Sync {
    /// Glyph for a character, `None` when the font has no glyph
    fn glyph_id(&self, c: char) -> Option<u16>;

    /// Horizontal advance of a glyph at `point_size`
    fn advance(&self, glyph: u16, point_size: f32) -> f32;

    /// Pair kerning between two glyphs at `point_size`
    fn kerning(&self, _left: u16, _right: u16, _point_size: f32) -> f32 {
        0.0
    }
}

/// Fixed pitch font: every glyph advances by the same fraction of the em
#[derive(Debug, Clone)]
pub struct UniformFont {
    advance_em: f32,
    kerning: HashMap<(u16, u16), f32>,
}

impl UniformFont {
    pub fn new(advance_em: f32) -> Self {
        Self {
            advance_em,
            kerning: HashMap::new(),
        }
    }

    /// Add a kerning pair, in ems
    pub fn with_kerning(mut self, left: char, right: char, em: f32) -> Self {
        self.kerning.insert((left as u16, right as u16), em);
        self
    }
}

impl HostFont for UniformFont {
    fn glyph_id(&self, c: char) -> Option<u16> {
        u16::try_from(c as u32).ok()
    }

    fn advance(&self, _glyph: u16, point_size: f32) -> f32 {
        self.advance_em * point_size
    }

    fn kerning(&self, left: u16, right: u16, point_size: f32) -> f32 {
        self.kerning
            .get(&(left, right))
            .map(|em| em * point_size)
            .unwrap_or(0.0)
    }
}

/// Object anchored in the text by U+FFFC
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InlineObject {
    pub id: u64,
    pub width: f32,
    /// Height above the baseline
    pub height: f32,
}

/// Text of one style run, starting at the queried offset
#[derive(Debug, Clone)]
pub struct TextChunk<'a> {
    pub text: &'a str,
    pub style: Option<Arc<CharacterStyle>>,
}

/// Compose scanner: styled access to the story text
///
/// Offsets count characters, not bytes.
pub trait TextSource {
    /// Text from `offset` to the end of its style run, `None` past the end
    fn text_at(&self, offset: usize) -> Option<TextChunk<'_>>;

    fn paragraph_style_at(&self, offset: usize) -> Option<Arc<ParagraphStyle>>;

    /// Character range of the paragraph containing `offset`, terminator included
    fn paragraph_bounds(&self, offset: usize) -> Range<usize>;

    fn inline_object_at(&self, _offset: usize) -> Option<InlineObject> {
        None
    }
}

#[derive(Debug, Clone)]
struct StyleSpan {
    chars: Range<usize>,
    style: Option<Arc<CharacterStyle>>,
}

/// In-memory story
#[derive(Debug, Clone)]
pub struct StyledText {
    text: String,
    /// Byte offset of every char, plus the total length
    char_starts: Vec<usize>,
    spans: Vec<StyleSpan>,
    paragraph_style: Arc<ParagraphStyle>,
    objects: HashMap<usize, InlineObject>,
}

impl StyledText {
    pub fn new(paragraph_style: ParagraphStyle) -> Self {
        Self {
            text: String::new(),
            char_starts: vec![0],
            spans: Vec::new(),
            paragraph_style: Arc::new(paragraph_style),
            objects: HashMap::new(),
        }
    }

    /// Append text in a style
    pub fn push(self, text: &str, style: &Arc<CharacterStyle>) -> Self {
        self.push_span(text, Some(Arc::clone(style)))
    }

    /// Append text that has no style attached
    pub fn push_unstyled(self, text: &str) -> Self {
        self.push_span(text, None)
    }

    /// Append an inline object marker
    pub fn push_object(mut self, object: InlineObject, style: &Arc<CharacterStyle>) -> Self {
        self.objects.insert(self.len(), object);
        self.push("\u{FFFC}", style)
    }

    /// Append a marker whose object the host cannot find
    pub fn push_missing_object(self, style: &Arc<CharacterStyle>) -> Self {
        self.push("\u{FFFC}", style)
    }

    fn push_span(mut self, text: &str, style: Option<Arc<CharacterStyle>>) -> Self {
        if text.is_empty() {
            return self;
        }

        let start = self.len();
        self.char_starts.pop();
        for (i, _) in text.char_indices() {
            self.char_starts.push(self.text.len() + i);
        }
        self.text.push_str(text);
        self.char_starts.push(self.text.len());

        self.spans.push(StyleSpan {
            chars: start..self.len(),
            style,
        });
        self
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.char_starts.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn paragraph_style(&self) -> &Arc<ParagraphStyle> {
        &self.paragraph_style
    }

    /// Text of a character range
    pub fn slice(&self, range: Range<usize>) -> &str {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        &self.text[self.char_starts[start]..self.char_starts[end]]
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.text[self.char_starts[offset]..].chars().next()
    }
}

impl TextSource for StyledText {
    fn text_at(&self, offset: usize) -> Option<TextChunk<'_>> {
        let span = self
            .spans
            .iter()
            .find(|s| s.chars.start <= offset && offset < s.chars.end)?;

        Some(TextChunk {
            text: self.slice(offset..span.chars.end),
            style: span.style.clone(),
        })
    }

    fn paragraph_style_at(&self, offset: usize) -> Option<Arc<ParagraphStyle>> {
        (offset <= self.len()).then(|| Arc::clone(&self.paragraph_style))
    }

    fn paragraph_bounds(&self, offset: usize) -> Range<usize> {
        let len = self.len();
        let offset = offset.min(len);

        let start = (0..offset)
            .rev()
            .find(|&i| self.char_at(i).is_some_and(is_paragraph_end))
            .map(|i| i + 1)
            .unwrap_or(0);
        let end = (offset..len)
            .find(|&i| self.char_at(i).is_some_and(is_paragraph_end))
            .map(|i| i + 1)
            .unwrap_or(len);

        start..end
    }

    fn inline_object_at(&self, offset: usize) -> Option<InlineObject> {
        self.objects.get(&offset).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> Arc<CharacterStyle> {
        Arc::new(CharacterStyle::new(Arc::new(UniformFont::new(0.5)), 10.0))
    }

    #[test]
    fn test_uniform_font() {
        let font = UniformFont::new(0.5).with_kerning('A', 'V', -0.1);
        let a = font.glyph_id('A').unwrap_or(0);
        let v = font.glyph_id('V').unwrap_or(0);
        assert_eq!(font.advance(a, 20.0), 10.0);
        assert!((font.kerning(a, v, 20.0) + 2.0).abs() < 1e-6);
        assert_eq!(font.kerning(v, a, 20.0), 0.0);
    }

    #[test]
    fn test_text_at_spans_styles() {
        let s = style();
        let text = StyledText::new(ParagraphStyle::default())
            .push("héllo ", &s)
            .push_unstyled("wörld");

        assert_eq!(text.len(), 11);
        let chunk = text.text_at(2).unwrap();
        assert_eq!(chunk.text, "llo ");
        assert!(chunk.style.is_some());

        let chunk = text.text_at(7).unwrap();
        assert_eq!(chunk.text, "örld");
        assert!(chunk.style.is_none());

        assert!(text.text_at(11).is_none());
    }

    #[test]
    fn test_paragraph_bounds() {
        let s = style();
        let text = StyledText::new(ParagraphStyle::default()).push("ab\rcd\u{2029}ef", &s);

        assert_eq!(text.paragraph_bounds(0), 0..3);
        assert_eq!(text.paragraph_bounds(2), 0..3);
        assert_eq!(text.paragraph_bounds(3), 3..6);
        assert_eq!(text.paragraph_bounds(7), 6..8);
    }

    #[test]
    fn test_inline_objects() {
        let s = style();
        let obj = InlineObject {
            id: 7,
            width: 30.0,
            height: 12.0,
        };
        let text = StyledText::new(ParagraphStyle::default())
            .push("a", &s)
            .push_object(obj, &s)
            .push_missing_object(&s);

        assert_eq!(text.inline_object_at(1), Some(obj));
        assert_eq!(text.inline_object_at(2), None);
        assert_eq!(text.slice(1..3), "\u{FFFC}\u{FFFC}");
    }
}
