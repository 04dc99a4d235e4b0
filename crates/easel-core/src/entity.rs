//! Scene entities: drawn shapes and placed images.

use crate::color::{Color, DEFAULT_FILL, DEFAULT_STROKE, DEFAULT_STROKE_WIDTH};
use crate::geometry::Bounds;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for scene entities.
pub type EntityId = Uuid;

/// Default placement for images handed in by the upload collaborator.
pub const DEFAULT_IMAGE_BOUNDS: Bounds = Bounds {
    x: 50.0,
    y: 50.0,
    width: 200.0,
    height: 200.0,
};

/// The drawable shape kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
}

/// A drawn shape.
///
/// For `Circle`, `width` and `height` both carry the bounding-box diameter;
/// the effective radius is `max(|width|, |height|) / 2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Color,
    pub stroke: Color,
    #[serde(rename = "strokeWidth")]
    pub stroke_width: f64,
}

impl Shape {
    /// Create a shape with the default palette at the given bounds.
    pub fn new(kind: ShapeKind, bounds: Bounds) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            fill: DEFAULT_FILL,
            stroke: DEFAULT_STROKE,
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }

    /// The committed bounds.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    /// Replace the committed bounds.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.x = bounds.x;
        self.y = bounds.y;
        self.width = bounds.width;
        self.height = bounds.height;
    }

    /// Effective radius for circles (half the larger bounding-box extent).
    pub fn radius(&self) -> f64 {
        self.width.abs().max(self.height.abs()) / 2.0
    }

    /// Check if a point (in canvas coordinates) hits this shape.
    pub fn hit_test(&self, point: Point) -> bool {
        match self.kind {
            ShapeKind::Rectangle => self.bounds().contains(point),
            ShapeKind::Circle => {
                let center = self.bounds().center();
                (point - center).hypot() <= self.radius()
            }
        }
    }
}

/// A placed image. `source_uri` is opaque here: data URI or remote URL,
/// resolved by the render backend, never decoded by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: EntityId,
    #[serde(rename = "url")]
    pub source_uri: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Image {
    /// Create an image at the given bounds.
    pub fn new(source_uri: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_uri: source_uri.into(),
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
        }
    }

    /// The committed bounds.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    /// Replace the committed bounds.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.x = bounds.x;
        self.y = bounds.y;
        self.width = bounds.width;
        self.height = bounds.height;
    }

    /// Check if a point (in canvas coordinates) hits this image.
    pub fn hit_test(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }
}
