//! Per-character shaping through the host font

use unicode_segmentation::UnicodeSegmentation;

use super::breaks::BreakOpportunities;
use crate::layout::{Cluster, Glyph, Justification, Penalty};
use crate::style::CharacterStyle;

/// Shape a control-free segment one grapheme per cluster
///
/// Glyphs narrower than 1/48 em join the previous cluster, pair kerning
/// widens the glyph before the pair.
pub(crate) fn shape(style: &CharacterStyle, text: &str) -> Vec<Cluster> {
    let font = &style.host_font;
    let size = style.point_size;
    let min_width = style.em_space_width / 48.0;
    let breaks = BreakOpportunities::new(text);

    let mut clusters: Vec<Cluster> = Vec::with_capacity(text.len());
    let mut prev_glyph: Option<u16> = None;

    for (start, grapheme) in text.grapheme_indices(true) {
        let end = start + grapheme.len();
        let span = grapheme.chars().count();
        let mut chars = grapheme.chars();
        let Some(first) = chars.next() else {
            continue;
        };

        if first.is_whitespace() {
            let penalty = breaks.penalty_after(end, true, Penalty::LETTER);
            clusters.push(
                Cluster::glue(style.space_glyph(), Justification::Space, style.space_width, penalty)
                    .with_span(span),
            );
            prev_glyph = None;
            continue;
        }

        let gid = font.glyph_id(first).unwrap_or(0);
        let width = font.advance(gid, size);
        let penalty = breaks.penalty_after(end, false, Penalty::LETTER);

        if let Some(prev) = prev_glyph {
            let kern = font.kerning(prev, gid, size);
            if kern != 0.0 {
                if let Some(g) = clusters.last_mut().and_then(|c| c.glyphs_mut().last_mut()) {
                    g.width += kern;
                }
            }
        }

        let marks =
            chars.map(|c| Glyph::new(font.glyph_id(c).unwrap_or(0), 0.0, Justification::Glyph));

        let joins = width < min_width && prev_glyph.is_some();
        if let Some(prev) = clusters.last_mut().filter(|_| joins) {
            prev.add_glyph(Glyph::new(gid, width, Justification::Glyph));
            for mark in marks {
                prev.add_glyph(mark);
            }
            prev.add_chars(span);
            prev.penalty = penalty;
        } else {
            let mut cluster = Cluster::new(penalty)
                .with_glyph(Glyph::new(gid, width, Justification::Letter))
                .with_span(span);
            for mark in marks {
                cluster.add_glyph(mark);
            }
            clusters.push(cluster);
        }
        prev_glyph = Some(gid);
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::UniformFont;
    use std::sync::Arc;

    fn style(font: UniformFont) -> CharacterStyle {
        CharacterStyle::new(Arc::new(font), 20.0)
    }

    #[test]
    fn test_one_cluster_per_character() {
        let clusters = shape(&style(UniformFont::new(0.5)), "ab c");
        assert_eq!(clusters.len(), 4);
        assert!(clusters[2].is_whitespace());
        assert_eq!(clusters[2].penalty, Penalty::WHITESPACE);
        assert_eq!(clusters[0].penalty, Penalty::LETTER);
        assert_eq!(clusters.iter().map(|c| c.span).sum::<usize>(), 4);
        assert_eq!(clusters.iter().map(Cluster::width).sum::<f32>(), 40.0);
    }

    #[test]
    fn test_combining_marks_stay_with_base() {
        let clusters = shape(&style(UniformFont::new(0.5)), "e\u{0301}x");
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].span, 2);
        assert_eq!(clusters[0].len(), 2);
        assert_eq!(clusters[0].glyphs()[1].class, Justification::Glyph);
        assert_eq!(clusters[0].width(), 10.0);
    }

    #[test]
    fn test_kerning_widens_previous() {
        let font = UniformFont::new(0.5).with_kerning('A', 'V', -0.1);
        let clusters = shape(&style(font), "AV");
        assert!((clusters[0].width() - 8.0).abs() < 1e-6);
        assert_eq!(clusters[1].width(), 10.0);
    }

    #[test]
    fn test_narrow_glyph_joins_previous() {
        let clusters = shape(&style(UniformFont::new(0.01)), "ab");
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].span, 2);
    }
}
