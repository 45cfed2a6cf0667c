//! Glyph boxes and justification classes

use crate::geometry::Point;
use crate::style::ParagraphStyle;

/// How freely a glyph's advance may change during justification
///
/// Ordered from most to least stretchable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Justification {
    /// Flush glue, absorbs any remaining width
    Fill,
    /// Word space
    Space,
    /// Letter, takes letter spacing
    Letter,
    /// Only takes horizontal glyph scaling (marks, joiners)
    Glyph,
    /// Never adjusted
    Fixed,
    /// Tab glue, sized by tab resolution
    Tab,
}

impl Justification {
    /// Classes that take a share of the stretch, in priority order
    pub const PRIORITY: [Justification; 4] = [
        Justification::Fill,
        Justification::Space,
        Justification::Letter,
        Justification::Glyph,
    ];

    fn index(self) -> usize {
        match self {
            Justification::Fill => 0,
            Justification::Space => 1,
            Justification::Letter => 2,
            Justification::Glyph => 3,
            Justification::Fixed | Justification::Tab => 4,
        }
    }
}

/// A shaped glyph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub id: u16,
    /// Natural advance
    pub width: f32,
    /// Accumulated kerning and spacing
    pub adjust: f32,
    /// Position relative to the pen
    pub offset: Point,
    pub class: Justification,
}

impl Glyph {
    pub fn new(id: u16, width: f32, class: Justification) -> Self {
        Self {
            id,
            width,
            adjust: 0.0,
            offset: Point::ZERO,
            class,
        }
    }

    pub fn with_offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    pub fn advance(&self) -> f32 {
        self.width + self.adjust
    }

    /// Widen (or narrow) the advance
    pub fn kern(&mut self, delta: f32) {
        self.adjust += delta;
    }

    /// Move the glyph without changing its advance
    pub fn shift(&mut self, delta: f32) {
        self.offset.x += delta;
    }

    /// Multiply every horizontal and vertical measure
    pub(crate) fn scale(&mut self, factor: f32) {
        self.width *= factor;
        self.adjust *= factor;
        self.offset.x *= factor;
        self.offset.y *= factor;
    }
}

/// Stretch capacity of one justification class
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassStretch {
    /// How much the class may shrink (a magnitude)
    pub min: f32,
    /// How much the class may grow
    pub max: f32,
    /// Number of contributing glyphs
    pub num: usize,
}

impl ClassStretch {
    fn ratio(min: f32, max: f32) -> Self {
        Self { min, max, num: 0 }
    }
}

/// Per class stretch, either ratios per unit width or accumulated totals
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StretchTable {
    classes: [ClassStretch; 5],
}

impl StretchTable {
    /// Stretch ratios allowed by a paragraph's spacing controls
    ///
    /// Only justified paragraphs may stretch; every other alignment gets
    /// all-zero ratios.
    pub fn ratios(para: &ParagraphStyle) -> Self {
        let mut table = Self::default();
        if !para.alignment.is_justified() {
            return table;
        }

        let space = ClassStretch::ratio(para.word_space.shrink(), para.word_space.grow());
        *table.class_mut(Justification::Space) = space;
        *table.class_mut(Justification::Letter) =
            ClassStretch::ratio(para.letter_space.shrink(), para.letter_space.grow());
        *table.class_mut(Justification::Glyph) =
            ClassStretch::ratio(para.glyph_scale.shrink(), para.glyph_scale.grow());
        *table.class_mut(Justification::Fill) = ClassStretch::ratio(space.min, 1_000_000.0);
        table
    }

    pub fn class(&self, class: Justification) -> &ClassStretch {
        &self.classes[class.index()]
    }

    pub fn class_mut(&mut self, class: Justification) -> &mut ClassStretch {
        &mut self.classes[class.index()]
    }

    /// Add `unit` width of `class` using the given ratios
    pub fn accumulate(&mut self, class: Justification, unit: f32, ratios: &StretchTable) {
        if matches!(class, Justification::Fixed | Justification::Tab) {
            return;
        }
        let ratio = *ratios.class(class);
        let total = self.class_mut(class);
        total.min += unit * ratio.min;
        total.max += unit * ratio.max;
        total.num += 1;
    }

    /// Fold another table's totals into this one
    pub fn merge(&mut self, other: &StretchTable) {
        for (a, b) in self.classes.iter_mut().zip(other.classes.iter()) {
            a.min += b.min;
            a.max += b.max;
            a.num += b.num;
        }
    }

    /// Combined space, letter and glyph capacity for growing or shrinking
    pub fn total(&self, grow: bool) -> f32 {
        [
            Justification::Space,
            Justification::Letter,
            Justification::Glyph,
        ]
        .iter()
        .map(|&c| {
            let s = self.class(c);
            if grow { s.max } else { s.min }
        })
        .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Alignment, SpacingRange};

    #[test]
    fn test_kern_and_shift() {
        let mut g = Glyph::new(1, 10.0, Justification::Letter);
        g.kern(2.0);
        g.shift(1.5);
        assert_eq!(g.advance(), 12.0);
        assert_eq!(g.width, 10.0);
        assert_eq!(g.offset.x, 1.5);
    }

    #[test]
    fn test_ratios_zero_unless_justified() {
        let para = ParagraphStyle::default();
        assert_eq!(StretchTable::ratios(&para), StretchTable::default());
    }

    #[test]
    fn test_ratios_for_justified() {
        let para = ParagraphStyle::default()
            .alignment(Alignment::JustifyFull)
            .word_space(SpacingRange::new(0.75, 1.0, 1.5));
        let r = StretchTable::ratios(&para);

        assert_eq!(r.class(Justification::Space).min, 0.25);
        assert_eq!(r.class(Justification::Space).max, 0.5);
        assert_eq!(r.class(Justification::Fill).min, 0.25);
        assert!(r.class(Justification::Fill).max >= 1_000_000.0);
        assert_eq!(r.class(Justification::Fixed).max, 0.0);
    }

    #[test]
    fn test_accumulate_skips_fixed() {
        let para = ParagraphStyle::default()
            .alignment(Alignment::JustifyFull)
            .word_space(SpacingRange::new(0.5, 1.0, 1.5));
        let r = StretchTable::ratios(&para);
        let mut t = StretchTable::default();

        t.accumulate(Justification::Space, 10.0, &r);
        t.accumulate(Justification::Space, 10.0, &r);
        t.accumulate(Justification::Fixed, 10.0, &r);
        t.accumulate(Justification::Tab, 10.0, &r);

        assert_eq!(t.class(Justification::Space).num, 2);
        assert_eq!(t.class(Justification::Space).max, 10.0);
        assert_eq!(t.class(Justification::Fixed).num, 0);
        assert_eq!(t.total(true), 10.0);
        assert_eq!(t.total(false), 10.0);
    }
}
