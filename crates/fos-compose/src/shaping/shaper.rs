//! Font shaping using rustybuzz

use rustybuzz::{Direction, UnicodeBuffer};

use super::breaks::BreakOpportunities;
use crate::font::FontFace;
use crate::geometry::Point;
use crate::layout::{Cluster, Glyph, Justification, Penalty};
use crate::style::CharacterStyle;

/// One positioned glyph from the shaper, already in points
#[derive(Debug, Clone, Copy)]
struct PositionedGlyph {
    id: u16,
    /// Byte offset of the first character this glyph belongs to
    cluster: usize,
    advance: f32,
    offset: Point,
}

/// Shape a control-free segment through the face's own tables
///
/// Returns `None` when rustybuzz cannot read the face.
pub(crate) fn shape(face: &FontFace, style: &CharacterStyle, text: &str) -> Option<Vec<Cluster>> {
    let rb_face = face.rustybuzz_face()?;

    let mut buffer = UnicodeBuffer::new();
    buffer.push_str(text);
    buffer.set_direction(Direction::LeftToRight);

    let output = rustybuzz::shape(&rb_face, &[], buffer);
    let scale = style.point_size / face.units_per_em().max(1) as f32;

    let glyphs: Vec<PositionedGlyph> = output
        .glyph_infos()
        .iter()
        .zip(output.glyph_positions())
        .map(|(info, pos)| PositionedGlyph {
            id: info.glyph_id as u16,
            cluster: info.cluster as usize,
            advance: pos.x_advance as f32 * scale,
            offset: Point::new(pos.x_offset as f32 * scale, -(pos.y_offset as f32) * scale),
        })
        .collect();

    Some(build_clusters(text, &glyphs))
}

/// Group shaped glyphs into clusters by their source character range
fn build_clusters(text: &str, glyphs: &[PositionedGlyph]) -> Vec<Cluster> {
    // Start offset and glyph range of every group
    let mut groups: Vec<(usize, std::ops::Range<usize>)> = Vec::new();
    for (i, g) in glyphs.iter().enumerate() {
        match groups.last_mut() {
            Some((start, range)) if g.cluster <= *start => range.end = i + 1,
            Some(_) => groups.push((g.cluster, i..i + 1)),
            None => groups.push((0, i..i + 1)),
        }
    }

    let breaks = BreakOpportunities::new(text);
    let mut clusters = Vec::with_capacity(groups.len());

    for (n, (start, range)) in groups.iter().enumerate() {
        let end = groups
            .get(n + 1)
            .map(|(next, _)| *next)
            .unwrap_or(text.len())
            .min(text.len());
        let chars = text.get(*start..end).unwrap_or_default();
        let span = chars.chars().count();

        let group = &glyphs[range.clone()];
        let whitespace = group.len() == 1 && chars.chars().next().is_some_and(char::is_whitespace);
        let penalty = breaks.penalty_after(end, whitespace, Penalty::INTRA);

        let mut cluster = Cluster::new(penalty).with_span(span);
        for (k, g) in group.iter().enumerate() {
            let class = if whitespace {
                Justification::Space
            } else if k == 0 {
                Justification::Letter
            } else {
                Justification::Glyph
            };
            cluster.add_glyph(Glyph::new(g.id, g.advance, class).with_offset(g.offset));
        }
        clusters.push(cluster);
    }

    clusters
}
