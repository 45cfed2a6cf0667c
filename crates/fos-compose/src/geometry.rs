//! Geometry primitives

/// 2D point (or offset)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// Rectangle, `y` grows downwards
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Move the left edge, keeping the right edge where it is
    pub fn set_left(&mut self, left: f32) {
        let right = self.right();
        self.x = left;
        self.width = (right - left).max(0.0);
    }

    /// Move the right edge, keeping the left edge where it is
    pub fn set_right(&mut self, right: f32) {
        self.width = (right - self.x).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
    }

    #[test]
    fn test_set_left_keeps_right() {
        let mut r = Rect::new(0.0, 0.0, 100.0, 10.0);
        r.set_left(25.0);
        assert_eq!(r.x, 25.0);
        assert_eq!(r.right(), 100.0);
    }

    #[test]
    fn test_set_edges_clamp() {
        let mut r = Rect::new(0.0, 0.0, 10.0, 10.0);
        r.set_left(50.0);
        assert_eq!(r.width, 0.0);
        r.set_right(-5.0);
        assert_eq!(r.width, 0.0);
    }
}
