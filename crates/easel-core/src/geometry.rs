//! Flat bounds type and drag-gesture geometry.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An axis-aligned box the way the model stores it: origin plus extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Create bounds from origin and extent.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalized bounds from two opposite corners (min origin, absolute
    /// extent). This is the rectangle-draw gesture: anchor plus current
    /// pointer, in either order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    /// Circle-draw gesture bounds: the origin stays at the anchor and the
    /// extent is the diameter.
    pub fn circle_from_anchor(anchor: Point, radius: f64) -> Self {
        Self {
            x: anchor.x,
            y: anchor.y,
            width: radius * 2.0,
            height: radius * 2.0,
        }
    }

    /// The origin corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The center point.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Convert to a kurbo rect (normalizing any negative extent).
    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height).abs()
    }

    /// Check if a point lies inside these bounds.
    pub fn contains(&self, point: Point) -> bool {
        self.as_rect().contains(point)
    }
}

/// Radius of a circle-draw gesture: the straight-line distance from the
/// anchor to the pointer, not a bounding-box half-extent.
pub fn drag_radius(anchor: Point, pointer: Point) -> f64 {
    (pointer - anchor).hypot()
}
