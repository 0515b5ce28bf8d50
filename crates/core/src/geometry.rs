//! Page-space geometry primitives
//!
//! Everything the measurement engine stores lives in page space: the
//! coordinate system intrinsic to a single plan page, independent of how the
//! page is currently zoomed, panned or rotated on screen.

use serde::{Deserialize, Serialize};

/// A point in page space
///
/// Units are PDF points (1/72 inch). Once captured a point is never mutated;
/// takeoff geometry is an ordered list of these.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether both coordinates are finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Axis-aligned rectangle, used for page bounds and on-screen placement
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle from its origin and size
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin with the given size
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Origin corner
    pub fn origin(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// A rectangle is usable for mapping only with a finite, positive extent
    pub fn has_area(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Bounding box of a point list as (min_x, min_y, max_x, max_y)
///
/// Returns `None` for an empty list.
pub fn bounding_box(points: &[Point2D]) -> Option<(f64, f64, f64, f64)> {
    let first = points.first()?;
    let mut bounds = (first.x, first.y, first.x, first.y);
    for point in points.iter().skip(1) {
        bounds.0 = bounds.0.min(point.x);
        bounds.1 = bounds.1.min(point.y);
        bounds.2 = bounds.2.max(point.x);
        bounds.3 = bounds.3.max(point.y);
    }
    Some(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(3.0, 4.0);
        assert_eq!(a.distance_to(&b), 5.0);
        assert_eq!(b.distance_to(&a), 5.0);
    }

    #[test]
    fn test_rect_has_area() {
        assert!(Rect::from_size(612.0, 792.0).has_area());
        assert!(!Rect::from_size(0.0, 792.0).has_area());
        assert!(!Rect::from_size(612.0, -1.0).has_area());
        assert!(!Rect::new(f64::NAN, 0.0, 10.0, 10.0).has_area());
    }

    #[test]
    fn test_bounding_box() {
        assert_eq!(bounding_box(&[]), None);

        let points = [
            Point2D::new(10.0, 5.0),
            Point2D::new(-2.0, 8.0),
            Point2D::new(4.0, -1.0),
        ];
        assert_eq!(bounding_box(&points), Some((-2.0, -1.0, 10.0, 8.0)));
    }
}
