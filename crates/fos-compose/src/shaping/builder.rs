//! Run builder: walks one style chunk, shaping text between control
//! characters and turning the controls into glue or run ends

use super::control::{self, Control};
use super::{ShapedRun, ShapingStrategy};
use crate::layout::{Cluster, Justification, Penalty};
use crate::style::CharacterStyle;

struct RunBuilder<'a> {
    strategy: &'a ShapingStrategy,
    style: &'a CharacterStyle,
    text: &'a str,
    run: ShapedRun,
}

impl<'a> RunBuilder<'a> {
    fn shape_segment(&mut self, bytes: std::ops::Range<usize>) {
        if let Some(segment) = self.text.get(bytes).filter(|s| !s.is_empty()) {
            let clusters = self.strategy.shape_segment(self.style, segment);
            self.run.clusters.extend(clusters);
        }
    }

    fn push_glue(&mut self, class: Justification, width: f32, penalty: Penalty) {
        self.run
            .clusters
            .push(Cluster::glue(self.style.space_glyph(), class, width, penalty));
    }

    fn finish(mut self, consumed: usize) -> ShapedRun {
        self.run.consumed = consumed;
        self.run
    }
}

/// Shape text until a run-ending control or the end of the chunk
pub(crate) fn build(strategy: &ShapingStrategy, style: &CharacterStyle, text: &str) -> ShapedRun {
    let mut b = RunBuilder {
        strategy,
        style,
        text,
        run: ShapedRun::empty(strategy.kind()),
    };

    let mut segment_start = 0;
    let mut count = 0;

    for (i, (at, c)) in text.char_indices().enumerate() {
        count = i + 1;
        let Some(control) = control::classify(c) else {
            continue;
        };

        b.shape_segment(segment_start..at);
        segment_start = at + c.len_utf8();

        match control {
            Control::RunInBreak => {
                b.push_glue(Justification::Space, 0.0, Penalty::WHITESPACE);
                return b.finish(i + 1);
            }
            Control::ForcedBreak => {
                b.push_glue(Justification::Space, style.space_width, Penalty::MANDATORY);
                return b.finish(i + 1);
            }
            Control::EndBefore if i == 0 => {
                b.push_glue(Justification::Fixed, 0.0, Penalty::WHITESPACE);
                return b.finish(1);
            }
            Control::EndBefore => {
                if let Some(last) = b.run.clusters.last_mut() {
                    last.penalty = Penalty::WHITESPACE;
                }
                return b.finish(i);
            }
            Control::Tab => {
                b.push_glue(Justification::Tab, style.space_width, Penalty::WHITESPACE);
            }
            Control::Glue {
                class,
                width,
                penalty,
            } => {
                if penalty.is_never() {
                    match b.run.clusters.last_mut() {
                        Some(prev) => prev.penalty = Penalty::NEVER,
                        None => b.run.forbid_break_before = true,
                    }
                }
                b.push_glue(class, width.resolve(style), penalty);
            }
        }
    }

    b.shape_segment(segment_start..text.len());
    b.finish(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::UniformFont;
    use std::sync::Arc;

    fn style() -> CharacterStyle {
        CharacterStyle::new(Arc::new(UniformFont::new(0.5)), 20.0)
    }

    fn run(text: &str) -> ShapedRun {
        build(&ShapingStrategy::Fallback, &style(), text)
    }

    #[test]
    fn test_plain_text_consumes_all() {
        let r = run("ab cd");
        assert_eq!(r.consumed, 5);
        assert_eq!(r.clusters.len(), 5);
        assert!(!r.forbid_break_before);
    }

    #[test]
    fn test_paragraph_end_is_mandatory() {
        let r = run("ab\rcd");
        assert_eq!(r.consumed, 3);
        assert_eq!(r.clusters.len(), 3);
        assert!(r.clusters[2].penalty.is_mandatory());
        assert_eq!(r.clusters[2].width(), 10.0);
    }

    #[test]
    fn test_run_in_break() {
        let r = run("a\u{0003}b");
        assert_eq!(r.consumed, 2);
        assert_eq!(r.clusters[1].width(), 0.0);
        assert_eq!(r.clusters[1].penalty, Penalty::WHITESPACE);
    }

    #[test]
    fn test_tab_continues_run() {
        let r = run("a\tb");
        assert_eq!(r.consumed, 3);
        assert!(r.clusters[1].is_tab());
    }

    #[test]
    fn test_object_marker_ends_run_before() {
        let r = run("ab\u{FFFC}c");
        assert_eq!(r.consumed, 2);
        assert_eq!(r.clusters.len(), 2);
        assert_eq!(r.clusters[1].penalty, Penalty::WHITESPACE);
    }

    #[test]
    fn test_table_marker_at_start() {
        let r = run("\u{0016}ab");
        assert_eq!(r.consumed, 1);
        assert_eq!(r.clusters.len(), 1);
        assert_eq!(r.clusters[0].width(), 0.0);
    }

    #[test]
    fn test_nbsp_glues_neighbours() {
        let r = run("a\u{00A0}b");
        assert_eq!(r.consumed, 3);
        assert!(r.clusters[0].penalty.is_never());
        assert!(r.clusters[1].penalty.is_never());
        assert_eq!(r.clusters[1].glyphs()[0].class, Justification::Space);
    }

    #[test]
    fn test_leading_nbsp_forbids_break_before() {
        let r = run("\u{202F}a");
        assert!(r.forbid_break_before);
        assert_eq!(r.clusters.len(), 2);
    }

    #[test]
    fn test_fixed_spaces() {
        let r = run("a\u{2003}b\u{2009}c");
        assert_eq!(r.clusters[1].width(), 20.0);
        assert_eq!(r.clusters[1].glyphs()[0].class, Justification::Fixed);
        assert_eq!(r.clusters[3].width(), 2.5);
        assert_eq!(r.clusters.iter().map(|c| c.span).sum::<usize>(), 5);
    }
}
