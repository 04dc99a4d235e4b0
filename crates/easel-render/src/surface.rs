//! Render-surface abstraction: retained drawables addressed by id.

use easel_core::color::Color;
use kurbo::Point;

/// Identifier for a retained node on a render surface.
///
/// The surface mints these on `create_node`; the reconciler and the
/// interaction engine hold them to update or destroy the drawable later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Paint layers, bottom to top. Within a layer, creation order is paint
/// order, so the committed-shape layer never paints above an image no
/// matter when either node was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    /// In-progress draw preview, under all committed content.
    Preview,
    /// Committed shapes.
    Shapes,
    /// Placed images, always above every shape.
    Images,
    /// Selection handles and the delete affordance.
    Overlay,
}

/// Fill and stroke for a painted node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub fill: Color,
    pub fill_alpha: f64,
    pub stroke: Color,
    pub stroke_width: f64,
}

/// Fill opacity for committed shapes.
pub const FILL_ALPHA: f64 = 0.8;

/// Fill opacity for the draw preview.
pub const PREVIEW_FILL_ALPHA: f64 = 0.5;

/// Corner handle fill.
pub const HANDLE_FILL: Color = Color(0xffffff);

/// Corner handle stroke.
pub const HANDLE_STROKE: Color = Color(0x4a90e2);

/// Delete affordance fill.
pub const DELETE_FILL: Color = Color(0xffcccc);

/// Delete affordance stroke, cross and label color.
pub const DELETE_STROKE: Color = Color(0xd0021b);

/// What a retained node draws. Geometry is node-local; the node position
/// supplies the origin, so moving a node never repaints it.
#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    /// Axis-aligned rectangle with its top-left at the node position.
    Rect {
        width: f64,
        height: f64,
        paint: Paint,
    },
    /// Circle of radius `max(|width|, |height|) / 2` centered at half the
    /// extent from the node position.
    Circle {
        width: f64,
        height: f64,
        paint: Paint,
    },
    /// Bitmap stretched to the extent. The URI is opaque to the reconciler;
    /// backends resolve it (and may finish loading asynchronously).
    Image {
        source_uri: String,
        width: f64,
        height: f64,
    },
    /// Fixed-size corner resize handle, centered on the node position.
    /// Painted with [`HANDLE_FILL`]/[`HANDLE_STROKE`].
    CornerHandle,
    /// Delete affordance (boxed cross with label), centered on the node
    /// position. Painted with [`DELETE_FILL`]/[`DELETE_STROKE`].
    DeleteBadge,
}

/// A retained-mode render surface.
///
/// Backends own the actual drawables; callers address them through
/// [`NodeId`]s. All operations are infallible by contract: after host
/// teardown a surface reports `is_live() == false` and every mutating
/// operation becomes a no-op, so in-flight callers land harmlessly.
pub trait RenderSurface {
    /// Whether the surface can still paint. False after host teardown.
    fn is_live(&self) -> bool;

    /// Attach a new node to a layer and return its id.
    fn create_node(&mut self, layer: Layer, visual: Visual, position: Point) -> NodeId;

    /// Replace what a node draws. Unknown ids are ignored.
    fn set_visual(&mut self, node: NodeId, visual: Visual);

    /// Move a node without repainting it. Unknown ids are ignored.
    fn set_position(&mut self, node: NodeId, position: Point);

    /// Raise a node above its layer siblings.
    fn bring_to_front(&mut self, node: NodeId);

    /// Detach and drop a node. Unknown ids are ignored.
    fn destroy_node(&mut self, node: NodeId);
}
