//! Scene model: the canonical, render-agnostic description of the canvas.

use crate::entity::{EntityId, Image, Shape, ShapeKind};
use crate::geometry::Bounds;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// The entity model for one canvas.
///
/// Shapes and images live in separate sequences; within each, insertion
/// order is paint order, and the shape layer always paints below the image
/// layer. Selection and the active tool are runtime state, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneModel {
    /// Drawn shapes, back to front.
    pub shapes: Vec<Shape>,
    /// Placed images, back to front (always above every shape).
    pub images: Vec<Image>,
    /// Currently selected entity.
    #[serde(skip)]
    pub selected: Option<EntityId>,
    /// Currently active drawing tool.
    #[serde(skip)]
    pub active_tool: Option<ShapeKind>,
}

impl SceneModel {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape with the default palette. Returns the new id.
    pub fn add_shape(&mut self, kind: ShapeKind, bounds: Bounds) -> EntityId {
        let shape = Shape::new(kind, bounds);
        let id = shape.id;
        self.shapes.push(shape);
        id
    }

    /// Add an image. Returns the new id.
    pub fn add_image(&mut self, source_uri: impl Into<String>, bounds: Bounds) -> EntityId {
        let image = Image::new(source_uri, bounds);
        let id = image.id;
        self.images.push(image);
        id
    }

    /// Update an entity's committed bounds.
    /// Returns false when the id is stale (entity removed mid-gesture).
    pub fn update_bounds(&mut self, id: EntityId, bounds: Bounds) -> bool {
        if let Some(shape) = self.shapes.iter_mut().find(|s| s.id == id) {
            shape.set_bounds(bounds);
            return true;
        }
        if let Some(image) = self.images.iter_mut().find(|i| i.id == id) {
            image.set_bounds(bounds);
            return true;
        }
        false
    }

    /// Remove an entity. Unknown ids are a no-op. Clears the selection when
    /// it referenced the removed entity.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        let before = self.shapes.len() + self.images.len();
        self.shapes.retain(|s| s.id != id);
        self.images.retain(|i| i.id != id);
        let removed = self.shapes.len() + self.images.len() != before;
        if removed && self.selected == Some(id) {
            self.selected = None;
        }
        removed
    }

    /// Select an entity, or clear with `None`. Selecting an id that is not
    /// in the scene clears instead, keeping the selection invariant.
    pub fn select(&mut self, id: Option<EntityId>) {
        self.selected = id.filter(|&id| self.contains(id));
    }

    /// Set or clear the active drawing tool. Independent of selection.
    pub fn set_tool(&mut self, tool: Option<ShapeKind>) {
        self.active_tool = tool;
    }

    /// Check if an entity id exists in the scene.
    pub fn contains(&self, id: EntityId) -> bool {
        self.shapes.iter().any(|s| s.id == id) || self.images.iter().any(|i| i.id == id)
    }

    /// Look up a shape by id.
    pub fn shape(&self, id: EntityId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    /// Look up an image by id.
    pub fn image(&self, id: EntityId) -> Option<&Image> {
        self.images.iter().find(|i| i.id == id)
    }

    /// Committed bounds of any entity.
    pub fn entity_bounds(&self, id: EntityId) -> Option<Bounds> {
        self.shape(id)
            .map(Shape::bounds)
            .or_else(|| self.image(id).map(Image::bounds))
    }

    /// Number of entities in the scene.
    pub fn entity_count(&self) -> usize {
        self.shapes.len() + self.images.len()
    }

    /// Check if the scene has no entities.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.images.is_empty()
    }

    /// Topmost entity at a point: images front-to-back first (they are the
    /// upper layer), then shapes front-to-back.
    pub fn entity_at(&self, point: Point) -> Option<EntityId> {
        if let Some(image) = self.images.iter().rev().find(|i| i.hit_test(point)) {
            return Some(image.id);
        }
        self.shapes
            .iter()
            .rev()
            .find(|s| s.hit_test(point))
            .map(|s| s.id)
    }

    /// Replace the persisted content wholesale (scene load). Clears the
    /// selection; the active tool is left alone.
    pub fn replace_content(&mut self, shapes: Vec<Shape>, images: Vec<Image>) {
        self.shapes = shapes;
        self.images = images;
        self.selected = None;
    }

    /// Serialize the persisted portion to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize a scene from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::DEFAULT_IMAGE_BOUNDS;

    #[test]
    fn test_add_and_lookup() {
        let mut scene = SceneModel::new();
        let id = scene.add_shape(ShapeKind::Rectangle, Bounds::new(0.0, 0.0, 50.0, 50.0));

        assert!(scene.contains(id));
        assert_eq!(scene.entity_count(), 1);
        assert_eq!(
            scene.entity_bounds(id),
            Some(Bounds::new(0.0, 0.0, 50.0, 50.0))
        );
    }

    #[test]
    fn test_update_bounds_stale_id_is_noop() {
        let mut scene = SceneModel::new();
        let id = scene.add_shape(ShapeKind::Rectangle, Bounds::new(0.0, 0.0, 50.0, 50.0));
        scene.remove_entity(id);

        assert!(!scene.update_bounds(id, Bounds::new(5.0, 5.0, 10.0, 10.0)));
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut scene = SceneModel::new();
        let id = scene.add_shape(ShapeKind::Circle, Bounds::new(0.0, 0.0, 20.0, 20.0));
        scene.select(Some(id));
        assert_eq!(scene.selected, Some(id));

        scene.remove_entity(id);
        assert_eq!(scene.selected, None);
    }

    #[test]
    fn test_remove_keeps_unrelated_selection() {
        let mut scene = SceneModel::new();
        let kept = scene.add_shape(ShapeKind::Rectangle, Bounds::new(0.0, 0.0, 20.0, 20.0));
        let removed = scene.add_shape(ShapeKind::Rectangle, Bounds::new(40.0, 0.0, 20.0, 20.0));
        scene.select(Some(kept));

        scene.remove_entity(removed);
        assert_eq!(scene.selected, Some(kept));
    }

    #[test]
    fn test_select_unknown_id_clears() {
        let mut scene = SceneModel::new();
        scene.select(Some(uuid::Uuid::new_v4()));
        assert_eq!(scene.selected, None);
    }

    #[test]
    fn test_entity_at_prefers_images_over_shapes() {
        let mut scene = SceneModel::new();
        let shape = scene.add_shape(ShapeKind::Rectangle, Bounds::new(0.0, 0.0, 100.0, 100.0));
        let image = scene.add_image("a.png", Bounds::new(0.0, 0.0, 100.0, 100.0));

        // Image layer sits above the shape layer.
        assert_eq!(scene.entity_at(Point::new(50.0, 50.0)), Some(image));

        scene.remove_entity(image);
        assert_eq!(scene.entity_at(Point::new(50.0, 50.0)), Some(shape));
    }

    #[test]
    fn test_entity_at_prefers_later_siblings() {
        let mut scene = SceneModel::new();
        let _bottom = scene.add_shape(ShapeKind::Rectangle, Bounds::new(0.0, 0.0, 100.0, 100.0));
        let top = scene.add_shape(ShapeKind::Rectangle, Bounds::new(50.0, 50.0, 100.0, 100.0));

        assert_eq!(scene.entity_at(Point::new(75.0, 75.0)), Some(top));
    }

    #[test]
    fn test_selection_and_tool_not_serialized() {
        let mut scene = SceneModel::new();
        let id = scene.add_shape(ShapeKind::Rectangle, Bounds::new(0.0, 0.0, 10.0, 10.0));
        scene.add_image("b.png", DEFAULT_IMAGE_BOUNDS);
        scene.select(Some(id));
        scene.set_tool(Some(ShapeKind::Circle));

        let json = scene.to_json().unwrap();
        let loaded = SceneModel::from_json(&json).unwrap();

        assert_eq!(loaded.shapes, scene.shapes);
        assert_eq!(loaded.images, scene.images);
        assert_eq!(loaded.selected, None);
        assert_eq!(loaded.active_tool, None);
    }
}
