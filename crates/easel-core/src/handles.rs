//! Resize handles and the delete affordance: layout, hit boxes, resize math.

use crate::geometry::Bounds;
use kurbo::{Point, Vec2};

/// Edge length of a corner handle (a square centered on its corner).
pub const HANDLE_SIZE: f64 = 8.0;

/// Edge length of the delete affordance box.
pub const DELETE_HANDLE_SIZE: f64 = 16.0;

/// Gap between an entity's top-right corner and the delete affordance.
pub const DELETE_HANDLE_OFFSET: f64 = 18.0;

/// Smallest width/height a resize may produce.
pub const MIN_ENTITY_SIZE: f64 = 10.0;

/// A corner of an entity's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// All four corners, in handle layout order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Whether this corner sits on the left edge.
    pub fn is_left(&self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    /// Whether this corner sits on the top edge.
    pub fn is_top(&self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    /// Where this corner sits on the given bounds.
    pub fn position(&self, bounds: Bounds) -> Point {
        let x = if self.is_left() {
            bounds.x
        } else {
            bounds.x + bounds.width
        };
        let y = if self.is_top() {
            bounds.y
        } else {
            bounds.y + bounds.height
        };
        Point::new(x, y)
    }
}

/// Affordance roles rendered for the selected entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleRole {
    Corner(Corner),
    Delete,
}

/// Anchor point of the delete affordance, to the right of the top-right
/// corner and nudged above the top edge.
pub fn delete_handle_position(bounds: Bounds) -> Point {
    Point::new(
        bounds.x + bounds.width + DELETE_HANDLE_OFFSET,
        bounds.y - DELETE_HANDLE_OFFSET / 2.0,
    )
}

/// The affordance (if any) under a pointer, for an entity with these live
/// bounds. Hit boxes are the drawn squares themselves.
pub fn handle_at(bounds: Bounds, point: Point) -> Option<HandleRole> {
    for corner in Corner::ALL {
        if square_contains(corner.position(bounds), HANDLE_SIZE, point) {
            return Some(HandleRole::Corner(corner));
        }
    }
    if square_contains(delete_handle_position(bounds), DELETE_HANDLE_SIZE, point) {
        return Some(HandleRole::Delete);
    }
    None
}

fn square_contains(center: Point, size: f64, point: Point) -> bool {
    (point.x - center.x).abs() <= size / 2.0 && (point.y - center.y).abs() <= size / 2.0
}

/// Resize `start` by dragging `corner` through `delta`.
///
/// Left corners move x and shrink width as delta.x grows; right corners
/// only grow width. Top corners behave the same way on the y axis. Width
/// and height are clamped to [`MIN_ENTITY_SIZE`] with the opposite edge
/// pinned, so the box never inverts.
pub fn resize_bounds(start: Bounds, corner: Corner, delta: Vec2) -> Bounds {
    let mut next = start;

    if corner.is_left() {
        next.x = start.x + delta.x;
        next.width = start.width - delta.x;
    } else {
        next.width = start.width + delta.x;
    }

    if corner.is_top() {
        next.y = start.y + delta.y;
        next.height = start.height - delta.y;
    } else {
        next.height = start.height + delta.y;
    }

    if next.width < MIN_ENTITY_SIZE {
        next.width = MIN_ENTITY_SIZE;
        if corner.is_left() {
            next.x = start.x + start.width - MIN_ENTITY_SIZE;
        }
    }
    if next.height < MIN_ENTITY_SIZE {
        next.height = MIN_ENTITY_SIZE;
        if corner.is_top() {
            next.y = start.y + start.height - MIN_ENTITY_SIZE;
        }
    }

    next
}
