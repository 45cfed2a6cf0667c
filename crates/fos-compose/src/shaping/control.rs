//! Control characters consumed by the run builder

use crate::layout::{Justification, Penalty};
use crate::style::CharacterStyle;

pub(crate) const OBJECT_REPLACEMENT: char = '\u{FFFC}';

/// How a glue character's width is derived from the style
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum GlueWidth {
    Space,
    EnSpace,
    /// Em space divided by the given amount
    Em(f32),
    /// Width of a character in the host font
    Char(char),
    Zero,
}

impl GlueWidth {
    pub(crate) fn resolve(self, style: &CharacterStyle) -> f32 {
        match self {
            GlueWidth::Space => style.space_width,
            GlueWidth::EnSpace => style.en_space_width,
            GlueWidth::Em(div) => style.em_space_width / div,
            GlueWidth::Char(c) => style.char_width(c),
            GlueWidth::Zero => 0.0,
        }
    }
}

/// What a control character does to the run being built
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Control {
    /// Zero width space glue, then the run ends
    RunInBreak,
    /// Space glue carrying a mandatory break, then the run ends
    ForcedBreak,
    /// Tab glue, sized later by tab resolution
    Tab,
    /// The run ends before the marker
    EndBefore,
    /// Fixed or stretchable glue in place of the character
    Glue {
        class: Justification,
        width: GlueWidth,
        penalty: Penalty,
    },
}

const fn glue(class: Justification, width: GlueWidth, penalty: Penalty) -> Control {
    Control::Glue {
        class,
        width,
        penalty,
    }
}

/// Classify a character, `None` for ordinary text
pub(crate) fn classify(c: char) -> Option<Control> {
    use GlueWidth::*;
    use Justification::{Fill, Fixed, Glyph, Space};

    let control = match c {
        '\u{0003}' => Control::RunInBreak,
        '\r' | '\n' | '\u{2028}' | '\u{2029}' => Control::ForcedBreak,
        '\t' => Control::Tab,
        OBJECT_REPLACEMENT | '\u{0016}' | '\u{0017}' => Control::EndBefore,
        '\u{00A0}' => glue(Space, GlueWidth::Space, Penalty::NEVER),
        '\u{2001}' => glue(Fill, GlueWidth::Space, Penalty::WHITESPACE),
        '\u{2000}' | '\u{2002}' => glue(Fixed, EnSpace, Penalty::WHITESPACE),
        '\u{2003}' => glue(Fixed, Em(1.0), Penalty::WHITESPACE),
        '\u{2004}' => glue(Fixed, Em(3.0), Penalty::WHITESPACE),
        '\u{2005}' => glue(Fixed, Em(4.0), Penalty::WHITESPACE),
        '\u{2006}' => glue(Fixed, Em(6.0), Penalty::WHITESPACE),
        '\u{2007}' => glue(Fixed, Char('0'), Penalty::WHITESPACE),
        '\u{2008}' => glue(Fixed, Char('.'), Penalty::WHITESPACE),
        '\u{2009}' => glue(Fixed, Em(8.0), Penalty::WHITESPACE),
        '\u{200A}' => glue(Fixed, Em(24.0), Penalty::WHITESPACE),
        '\u{200B}' => glue(Fixed, Zero, Penalty::WHITESPACE),
        '\u{200C}' | '\u{200D}' => glue(Glyph, Zero, Penalty::NEVER),
        '\u{202F}' => glue(Fixed, GlueWidth::Space, Penalty::NEVER),
        '\u{FEFF}' => glue(Fixed, Zero, Penalty::NEVER),
        _ => return None,
    };
    Some(control)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::UniformFont;
    use std::sync::Arc;

    #[test]
    fn test_ordinary_text() {
        assert_eq!(classify('a'), None);
        assert_eq!(classify(' '), None);
    }

    #[test]
    fn test_breaks() {
        assert_eq!(classify('\r'), Some(Control::ForcedBreak));
        assert_eq!(classify('\u{2028}'), Some(Control::ForcedBreak));
        assert_eq!(classify('\u{0003}'), Some(Control::RunInBreak));
        assert_eq!(classify('\u{FFFC}'), Some(Control::EndBefore));
    }

    #[test]
    fn test_glue_widths() {
        let style = CharacterStyle::new(Arc::new(UniformFont::new(0.5)), 24.0);
        assert_eq!(GlueWidth::Em(3.0).resolve(&style), 8.0);
        assert_eq!(GlueWidth::Em(24.0).resolve(&style), 1.0);
        assert_eq!(GlueWidth::Char('0').resolve(&style), 12.0);
        assert_eq!(GlueWidth::Space.resolve(&style), 12.0);
    }

    #[test]
    fn test_no_break_spaces() {
        for c in ['\u{00A0}', '\u{202F}', '\u{FEFF}', '\u{200D}'] {
            match classify(c) {
                Some(Control::Glue { penalty, .. }) => assert!(penalty.is_never()),
                other => panic!("unexpected {:?}", other),
            }
        }
    }
}
