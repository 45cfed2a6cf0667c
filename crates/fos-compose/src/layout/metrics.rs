//! Line metrics

use crate::style::CharacterStyle;

/// Which metric places the first baseline of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FirstLineMetric {
    Leading,
    #[default]
    Ascent,
    CapHeight,
    XHeight,
    EmBoxHeight,
    FixedHeight,
    EmBoxDepth,
}

/// Side of the spread a page sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageSide {
    Left,
    Right,
    #[default]
    Unisex,
}

/// Tallest metrics of every style used on a line
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineMetrics {
    pub leading: f32,
    pub ascent: f32,
    pub cap_height: f32,
    pub x_height: f32,
    pub em_box_height: f32,
    pub em_box_depth: f32,
}

impl LineMetrics {
    pub fn from_style(style: &CharacterStyle) -> Self {
        let m = &style.metrics;
        Self {
            leading: style.leading,
            ascent: m.ascent,
            cap_height: m.cap_height,
            x_height: m.x_height,
            em_box_height: m.em_box_height,
            em_box_depth: m.em_box_depth,
        }
    }

    /// Grow to cover `style`
    pub fn add_style(&mut self, style: &CharacterStyle) {
        let other = Self::from_style(style);
        self.leading = self.leading.max(other.leading);
        self.ascent = self.ascent.max(other.ascent);
        self.cap_height = self.cap_height.max(other.cap_height);
        self.x_height = self.x_height.max(other.x_height);
        self.em_box_height = self.em_box_height.max(other.em_box_height);
        self.em_box_depth = self.em_box_depth.max(other.em_box_depth);
    }

    /// Every metric multiplied by `factor`, used for drop cap proposals
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            leading: self.leading * factor,
            ascent: self.ascent * factor,
            cap_height: self.cap_height * factor,
            x_height: self.x_height * factor,
            em_box_height: self.em_box_height * factor,
            em_box_depth: self.em_box_depth * factor,
        }
    }

    /// Fixed first baselines sit one ascent down
    pub fn fixed_height(&self) -> f32 {
        self.ascent
    }

    pub fn get(&self, metric: FirstLineMetric) -> f32 {
        match metric {
            FirstLineMetric::Leading => self.leading,
            FirstLineMetric::Ascent => self.ascent,
            FirstLineMetric::CapHeight => self.cap_height,
            FirstLineMetric::XHeight => self.x_height,
            FirstLineMetric::EmBoxHeight => self.em_box_height,
            FirstLineMetric::FixedHeight => self.fixed_height(),
            FirstLineMetric::EmBoxDepth => self.em_box_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::UniformFont;
    use std::sync::Arc;

    fn style(size: f32) -> CharacterStyle {
        CharacterStyle::new(Arc::new(UniformFont::new(0.5)), size)
    }

    #[test]
    fn test_add_style_keeps_maximum() {
        let mut lm = LineMetrics::from_style(&style(10.0));
        lm.add_style(&style(20.0));
        lm.add_style(&style(15.0));
        assert_eq!(lm.leading, 24.0);
        assert_eq!(lm.ascent, 16.0);
    }

    #[test]
    fn test_scaled_and_get() {
        let lm = LineMetrics::from_style(&style(10.0)).scaled(3.0);
        assert_eq!(lm.get(FirstLineMetric::Leading), 36.0);
        assert_eq!(lm.get(FirstLineMetric::Ascent), 24.0);
        assert_eq!(lm.get(FirstLineMetric::FixedHeight), lm.ascent);
        assert!((lm.get(FirstLineMetric::CapHeight) - 21.0).abs() < 1e-4);
    }
}
