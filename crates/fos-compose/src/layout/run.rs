//! Runs: clusters sharing one character style

use std::ops::Range;
use std::sync::Arc;

use super::cluster::Cluster;
use super::glyph::{Glyph, Justification, StretchTable};
use crate::host::InlineObject;
use crate::style::CharacterStyle;

/// Which shaping strategy produced a run
#[derive(Debug, Clone, PartialEq)]
pub enum RunKind {
    /// Shaped through the font's own tables
    Shaped,
    /// One glyph per character through the host font
    Fallback,
    /// Placeholder for an anchored object, `None` when the host has no object
    InlineObject(Option<InlineObject>),
}

/// Per class width changes applied by [`Run::adjust_widths`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Adjustment {
    /// Added to every fill glyph
    pub fill: f32,
    /// Added to every word space
    pub word: f32,
    /// Added to every letter
    pub letter: f32,
    /// Horizontal scale applied to every glyph (0 keeps the natural width)
    pub glyph_scale: f32,
}

impl Adjustment {
    /// Only flush glue changes
    pub fn fill_only(&self) -> Self {
        Self {
            fill: self.fill,
            ..Self::default()
        }
    }
}

/// A run of clusters in one style
///
/// The clusters live in the owning [`ClusterThread`](super::ClusterThread);
/// a run only records their index range.
#[derive(Debug, Clone)]
pub struct Run {
    pub style: Arc<CharacterStyle>,
    pub kind: RunKind,
    pub(crate) range: Range<usize>,
    /// Height of the tallest cluster, at least the style's leading
    pub height: f32,
    /// Horizontal glyph scale added by justification
    pub extra_scale: f32,
}

fn takes_tracking(g: &Glyph) -> bool {
    match g.class {
        Justification::Space | Justification::Letter => true,
        Justification::Fixed => g.width > 0.0,
        _ => false,
    }
}

impl Run {
    pub fn new(style: Arc<CharacterStyle>, kind: RunKind, range: Range<usize>) -> Self {
        let height = style.leading;
        Self {
            style,
            kind,
            range,
            height,
            extra_scale: 0.0,
        }
    }

    /// Index range of this run's clusters in the thread
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn is_inline_object(&self) -> bool {
        matches!(self.kind, RunKind::InlineObject(_))
    }

    /// Characters covered by `clusters`
    pub fn span(clusters: &[Cluster]) -> usize {
        clusters.iter().map(|c| c.span).sum()
    }

    pub fn width(clusters: &[Cluster]) -> f32 {
        clusters.iter().map(Cluster::width).sum()
    }

    /// Accumulate stretch of every glyph in `clusters`
    pub fn calculate_stretch(
        clusters: &[Cluster],
        ratios: &StretchTable,
        totals: &mut StretchTable,
    ) {
        for cl in clusters {
            cl.calculate_stretch(ratios, totals);
        }
    }

    /// Apply justification deltas to this run's clusters
    pub fn adjust_widths(&mut self, clusters: &mut [Cluster], adj: &Adjustment) {
        for cl in clusters.iter_mut() {
            for g in cl.glyphs_mut() {
                if adj.glyph_scale != 0.0 {
                    let grow = adj.glyph_scale * g.advance();
                    let shift = adj.glyph_scale * g.offset.x;
                    g.kern(grow);
                    g.shift(shift);
                }

                match g.class {
                    Justification::Fill => g.kern(adj.fill),
                    Justification::Space => g.kern(adj.word),
                    Justification::Letter => g.kern(adj.letter),
                    _ => {}
                }
            }
        }

        if adj.glyph_scale != 0.0 {
            self.extra_scale = adj.glyph_scale;
        }
    }

    /// Apply the style's desired word space and tracking
    pub fn apply_desired_widths(&self, clusters: &mut [Cluster]) {
        let word = self.style.altered_word_space - self.style.space_width;
        let tracking = self.style.altered_letter_space;
        if word == 0.0 && tracking == 0.0 {
            return;
        }

        for cl in clusters.iter_mut() {
            for g in cl.glyphs_mut() {
                if g.class == Justification::Space {
                    g.kern(word);
                }
                if takes_tracking(g) {
                    g.kern(tracking);
                }
            }
        }
    }

    /// Remove tracking from a cluster that ends a line
    pub(crate) fn untrack(cluster: &mut Cluster, tracking: f32) -> bool {
        match cluster.glyphs().last() {
            Some(g) if takes_tracking(g) => {
                cluster.trim(tracking);
                true
            }
            _ => false,
        }
    }

    /// Enlarge every glyph by `factor`, used for drop caps
    pub fn scale(&mut self, clusters: &mut [Cluster], factor: f32) {
        for cl in clusters.iter_mut() {
            for g in cl.glyphs_mut() {
                g.scale(factor);
            }
        }
        self.height *= factor;
    }

    /// Whether `next` can be merged onto the end of this run for output
    pub fn joinable(&self, next: &Run) -> bool {
        let same_kind = matches!(
            (&self.kind, &next.kind),
            (RunKind::Shaped, RunKind::Shaped) | (RunKind::Fallback, RunKind::Fallback)
        );
        let same_style = Arc::ptr_eq(&self.style, &next.style)
            || (self.style.share_key != 0 && self.style.share_key == next.style.share_key);

        same_kind && same_style && self.extra_scale == next.extra_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::UniformFont;
    use crate::layout::cluster::Penalty;

    fn style() -> Arc<CharacterStyle> {
        Arc::new(CharacterStyle::new(Arc::new(UniformFont::new(0.5)), 20.0))
    }

    fn word_and_space() -> Vec<Cluster> {
        vec![
            Cluster::letter(65, 10.0, Penalty::LETTER),
            Cluster::letter(66, 10.0, Penalty::WORD),
            Cluster::glue(32, Justification::Space, 10.0, Penalty::WHITESPACE),
        ]
    }

    #[test]
    fn test_adjust_widths_per_class() {
        let mut clusters = word_and_space();
        clusters.push(Cluster::glue(32, Justification::Fill, 10.0, Penalty::WHITESPACE));
        let mut run = Run::new(style(), RunKind::Fallback, 0..4);

        run.adjust_widths(
            &mut clusters,
            &Adjustment {
                fill: 4.0,
                word: 2.0,
                letter: 1.0,
                glyph_scale: 0.0,
            },
        );

        assert_eq!(clusters[0].width(), 11.0);
        assert_eq!(clusters[2].width(), 12.0);
        assert_eq!(clusters[3].width(), 14.0);
        assert_eq!(run.extra_scale, 0.0);
    }

    #[test]
    fn test_glyph_scale_widens_proportionally() {
        let mut clusters = word_and_space();
        let mut run = Run::new(style(), RunKind::Fallback, 0..3);
        run.adjust_widths(
            &mut clusters,
            &Adjustment {
                glyph_scale: 0.1,
                ..Adjustment::default()
            },
        );

        assert!((Run::width(&clusters) - 33.0).abs() < 1e-4);
        assert_eq!(run.extra_scale, 0.1);
    }

    #[test]
    fn test_desired_widths() {
        let s = CharacterStyle::new(Arc::new(UniformFont::new(0.5)), 20.0)
            .with_word_space(14.0)
            .with_letter_space(1.0);
        let run = Run::new(Arc::new(s), RunKind::Fallback, 0..3);
        let mut clusters = word_and_space();
        run.apply_desired_widths(&mut clusters);

        assert_eq!(clusters[0].width(), 11.0);
        // word space delta plus tracking
        assert_eq!(clusters[2].width(), 15.0);
    }

    #[test]
    fn test_scale() {
        let mut clusters = word_and_space();
        let mut run = Run::new(style(), RunKind::Fallback, 0..3);
        let h = run.height;
        run.scale(&mut clusters, 3.0);
        assert_eq!(Run::width(&clusters), 90.0);
        assert_eq!(run.height, h * 3.0);
    }

    #[test]
    fn test_joinable() {
        let s = style();
        let a = Run::new(Arc::clone(&s), RunKind::Fallback, 0..2);
        let b = Run::new(Arc::clone(&s), RunKind::Fallback, 2..4);
        let c = Run::new(s, RunKind::InlineObject(None), 4..5);
        let d = Run::new(style(), RunKind::Fallback, 5..6);

        assert!(a.joinable(&b));
        assert!(!b.joinable(&c));
        assert!(!a.joinable(&d));
    }
}
