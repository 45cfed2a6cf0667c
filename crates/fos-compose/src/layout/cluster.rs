//! Clusters: the unbreakable unit of line breaking

use super::glyph::{Glyph, Justification, StretchTable};

/// Cost of breaking after a cluster; negative values are favourable
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Penalty(pub f32);

impl Penalty {
    /// Forced break (paragraph end, line break)
    pub const MANDATORY: Penalty = Penalty(-10_000.0);
    pub const WHITESPACE: Penalty = Penalty(-1.0);
    pub const WORD: Penalty = Penalty(-0.5);
    pub const INTRA: Penalty = Penalty(0.5);
    pub const LETTER: Penalty = Penalty(0.75);
    pub const CLIP: Penalty = Penalty(1.0);
    /// Break forbidden
    pub const NEVER: Penalty = Penalty(10_000.0);

    pub fn is_mandatory(self) -> bool {
        self == Self::MANDATORY
    }

    pub fn is_never(self) -> bool {
        self == Self::NEVER
    }

    /// Square of the penalty, keeping its sign
    pub fn signed_square(self) -> f32 {
        let sq = self.0 * self.0;
        if self.0 < 0.0 { -sq } else { sq }
    }
}

impl Default for Penalty {
    fn default() -> Self {
        Self::CLIP
    }
}

/// Glyphs that must stay together on one line
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cluster {
    glyphs: Vec<Glyph>,
    pub penalty: Penalty,
    /// Source characters covered
    pub span: usize,
}

impl Cluster {
    pub fn new(penalty: Penalty) -> Self {
        Self {
            glyphs: Vec::with_capacity(1),
            penalty,
            span: 0,
        }
    }

    /// Single glyph glue covering one character
    pub fn glue(id: u16, class: Justification, width: f32, penalty: Penalty) -> Self {
        Self::new(penalty).with_glyph(Glyph::new(id, width, class)).with_span(1)
    }

    /// Single letter covering one character
    pub fn letter(id: u16, width: f32, penalty: Penalty) -> Self {
        Self::glue(id, Justification::Letter, width, penalty)
    }

    pub fn with_glyph(mut self, glyph: Glyph) -> Self {
        self.glyphs.push(glyph);
        self
    }

    pub fn with_span(mut self, span: usize) -> Self {
        self.span = span;
        self
    }

    pub fn add_glyph(&mut self, glyph: Glyph) {
        self.glyphs.push(glyph);
    }

    pub fn add_chars(&mut self, n: usize) {
        self.span += n;
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn glyphs_mut(&mut self) -> &mut [Glyph] {
        &mut self.glyphs
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Sum of glyph advances
    pub fn width(&self) -> f32 {
        self.glyphs.iter().map(Glyph::advance).sum()
    }

    fn single(&self) -> Option<&Glyph> {
        match self.glyphs.as_slice() {
            [g] => Some(g),
            _ => None,
        }
    }

    /// Single glyph of fill, space or tab class, or fixed glue marked as a
    /// whitespace break
    pub fn is_whitespace(&self) -> bool {
        match self.single().map(|g| g.class) {
            Some(Justification::Fill | Justification::Space | Justification::Tab) => true,
            Some(Justification::Fixed) => self.penalty == Penalty::WHITESPACE,
            _ => false,
        }
    }

    pub fn is_tab(&self) -> bool {
        self.single()
            .is_some_and(|g| g.class == Justification::Tab)
    }

    /// Single glyph with the given id
    pub fn is_glyph(&self, id: u16) -> bool {
        self.single().is_some_and(|g| g.id == id)
    }

    /// Add this cluster's glyphs to the stretch totals
    pub fn calculate_stretch(&self, ratios: &StretchTable, totals: &mut StretchTable) {
        for g in &self.glyphs {
            totals.accumulate(g.class, g.width, ratios);
        }
    }

    /// Remove `amount` of trailing space from the last glyph
    pub fn trim(&mut self, amount: f32) {
        if let Some(g) = self.glyphs.last_mut() {
            g.kern(-amount);
        }
    }

    pub(crate) fn front_mut(&mut self) -> Option<&mut Glyph> {
        self.glyphs.first_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_square() {
        assert_eq!(Penalty::WHITESPACE.signed_square(), -1.0);
        assert_eq!(Penalty::WORD.signed_square(), -0.25);
        assert_eq!(Penalty::CLIP.signed_square(), 1.0);
    }

    #[test]
    fn test_sentinels() {
        assert!(Penalty::MANDATORY.is_mandatory());
        assert!(Penalty::NEVER.is_never());
        assert!(!Penalty::CLIP.is_never());
        assert!(Penalty::MANDATORY < Penalty::WHITESPACE);
    }

    #[test]
    fn test_whitespace_classes() {
        assert!(Cluster::glue(3, Justification::Space, 5.0, Penalty::WHITESPACE).is_whitespace());
        assert!(Cluster::glue(3, Justification::Fill, 5.0, Penalty::CLIP).is_whitespace());
        assert!(Cluster::glue(3, Justification::Tab, 5.0, Penalty::CLIP).is_whitespace());
        assert!(Cluster::glue(3, Justification::Fixed, 5.0, Penalty::WHITESPACE).is_whitespace());
        assert!(!Cluster::glue(3, Justification::Fixed, 5.0, Penalty::NEVER).is_whitespace());
        assert!(!Cluster::letter(65, 5.0, Penalty::WHITESPACE).is_whitespace());
    }

    #[test]
    fn test_multi_glyph_never_whitespace() {
        let cl = Cluster::new(Penalty::WHITESPACE)
            .with_glyph(Glyph::new(1, 5.0, Justification::Space))
            .with_glyph(Glyph::new(2, 0.0, Justification::Glyph));
        assert!(!cl.is_whitespace());
        assert_eq!(cl.len(), 2);
    }

    #[test]
    fn test_width_includes_adjustment() {
        let mut cl = Cluster::letter(65, 10.0, Penalty::LETTER);
        cl.trim(1.5);
        assert_eq!(cl.width(), 8.5);
    }
}
