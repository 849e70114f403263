//! Page-space rectangles.
//!
//! Coordinates are top-down: `top` is the distance from the top edge of the
//! page, so `top < bottom` for any non-empty box.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BBox {
    pub x0: f32,
    pub top: f32,
    pub x1: f32,
    pub bottom: f32,
}

impl BBox {
    pub fn new(x0: f32, top: f32, x1: f32, bottom: f32) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Half-open on the right edge so that two boxes sharing an edge never
    /// both claim a point on it.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.top && y <= self.bottom
    }

    /// Split vertically at the horizontal midpoint.
    pub fn split_halves(&self) -> (BBox, BBox) {
        let mid = self.x0 + self.width() / 2.0;
        (
            BBox::new(self.x0, self.top, mid, self.bottom),
            BBox::new(mid, self.top, self.x1, self.bottom),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width() {
        let b = BBox::new(10.0, 20.0, 110.0, 70.0);
        assert_eq!(b.width(), 100.0);
    }

    #[test]
    fn test_split_halves_share_midpoint() {
        let page = BBox::new(0.0, 0.0, 612.0, 792.0);
        let (left, right) = page.split_halves();

        assert_eq!(left, BBox::new(0.0, 0.0, 306.0, 792.0));
        assert_eq!(right, BBox::new(306.0, 0.0, 612.0, 792.0));
        assert!(left.contains(305.9, 10.0));
        assert!(!left.contains(306.0, 10.0));
        assert!(right.contains(306.0, 10.0));
    }

    #[test]
    fn test_contains_bounds() {
        let b = BBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(b.contains(0.0, 0.0));
        assert!(b.contains(5.0, 10.0));
        assert!(!b.contains(-0.1, 5.0));
        assert!(!b.contains(5.0, 10.1));
    }
}
