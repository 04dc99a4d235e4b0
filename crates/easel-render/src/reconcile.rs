//! Retained reconciliation between the scene model and a render surface.
//!
//! Every committed entity owns exactly one surface node; selection
//! affordances are keyed by owner and role and reused across passes. While
//! a pointer session is repainting nodes ahead of the model, reconciliation
//! stands down entirely.

use crate::surface::{FILL_ALPHA, Layer, NodeId, Paint, RenderSurface, Visual};
use easel_core::color::SELECTION_STROKE;
use easel_core::entity::{EntityId, Image, Shape, ShapeKind};
use easel_core::geometry::Bounds;
use easel_core::handles::{self, Corner, HandleRole};
use easel_core::scene::SceneModel;
use kurbo::Point;
use std::collections::HashMap;

/// Tolerance when comparing a live-resize extent against the committed
/// model. Within this the resize is considered landed and the cache is
/// dropped.
pub const LIVE_EPSILON: f64 = 0.1;

/// Reconciler bookkeeping for one entity's surface node.
#[derive(Debug, Clone)]
struct RenderNode {
    node: NodeId,
    /// Position last applied to the node.
    x: f64,
    y: f64,
    /// Extent painted by an in-progress resize, not yet in the model.
    live_width: Option<f64>,
    live_height: Option<f64>,
}

impl RenderNode {
    fn new(node: NodeId, x: f64, y: f64) -> Self {
        Self {
            node,
            x,
            y,
            live_width: None,
            live_height: None,
        }
    }

    /// Repaint from the committed model, unless an uncommitted resize still
    /// owns the extent. Position is not covered by the extent cache and is
    /// always reapplied.
    fn refresh<S: RenderSurface>(&mut self, committed: Bounds, visual: Visual, surface: &mut S) {
        let resize_pending = match (self.live_width, self.live_height) {
            (Some(width), Some(height)) => {
                (width - committed.width).abs() > LIVE_EPSILON
                    || (height - committed.height).abs() > LIVE_EPSILON
            }
            _ => false,
        };
        if !resize_pending {
            self.live_width = None;
            self.live_height = None;
            surface.set_visual(self.node, visual);
        }
        surface.set_position(self.node, committed.origin());
        self.x = committed.x;
        self.y = committed.y;
    }
}

/// Keeps a render surface's nodes in one-to-one correspondence with the
/// scene model.
#[derive(Debug, Default)]
pub struct Reconciler {
    nodes: HashMap<EntityId, RenderNode>,
    handles: HashMap<(EntityId, HandleRole), NodeId>,
}

impl Reconciler {
    /// Create a reconciler with no retained nodes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the surface in line with the scene.
    ///
    /// A no-op while a pointer session is active (the session already
    /// paints ahead of the model, and a pass from stale committed state
    /// would make the entity flicker) or after the surface was torn down.
    pub fn sync<S: RenderSurface>(
        &mut self,
        scene: &SceneModel,
        surface: &mut S,
        session_active: bool,
    ) {
        if session_active {
            log::debug!("Reconcile skipped: pointer session in progress");
            return;
        }
        if !surface.is_live() {
            log::debug!("Reconcile skipped: surface torn down");
            return;
        }

        let stale: Vec<EntityId> = self
            .nodes
            .keys()
            .copied()
            .filter(|id| !scene.contains(*id))
            .collect();
        for id in stale {
            if let Some(record) = self.nodes.remove(&id) {
                surface.destroy_node(record.node);
            }
            self.destroy_handles_for(id, surface);
            log::debug!("Destroyed render node for removed entity {}", id);
        }

        for shape in &scene.shapes {
            self.sync_shape(shape, scene.selected == Some(shape.id), surface);
        }
        for image in &scene.images {
            self.sync_image(image, surface);
        }

        self.sync_handles(scene, surface);
    }

    /// Reposition an entity's node and affordances during a drag. The model
    /// is untouched; the committed position catches up on pointer release.
    pub fn live_move<S: RenderSurface>(
        &mut self,
        scene: &SceneModel,
        id: EntityId,
        origin: Point,
        surface: &mut S,
    ) {
        if !surface.is_live() {
            return;
        }
        let Some(committed) = scene.entity_bounds(id) else {
            return;
        };
        let Some(record) = self.nodes.get_mut(&id) else {
            return;
        };
        surface.set_position(record.node, origin);
        record.x = origin.x;
        record.y = origin.y;
        let bounds = Bounds::new(
            origin.x,
            origin.y,
            record.live_width.unwrap_or(committed.width),
            record.live_height.unwrap_or(committed.height),
        );
        self.position_handles(id, bounds, surface);
    }

    /// Repaint an entity's node at in-progress resize bounds and record the
    /// live extent, so the next committed-state pass cannot snap the node
    /// back to the pre-gesture size.
    pub fn live_resize<S: RenderSurface>(
        &mut self,
        scene: &SceneModel,
        id: EntityId,
        bounds: Bounds,
        surface: &mut S,
    ) {
        if !surface.is_live() {
            return;
        }
        let visual = if let Some(shape) = scene.shape(id) {
            shape_visual(shape, scene.selected == Some(id), bounds.width, bounds.height)
        } else if let Some(image) = scene.image(id) {
            image_visual(image, bounds.width, bounds.height)
        } else {
            return;
        };
        let Some(record) = self.nodes.get_mut(&id) else {
            return;
        };
        surface.set_visual(record.node, visual);
        surface.set_position(record.node, bounds.origin());
        record.x = bounds.x;
        record.y = bounds.y;
        record.live_width = Some(bounds.width);
        record.live_height = Some(bounds.height);
        self.position_handles(id, bounds, surface);
    }

    /// An entity's bounds as currently painted: the committed model, except
    /// where a session has already moved or resized the node ahead of it.
    pub fn live_bounds(&self, scene: &SceneModel, id: EntityId) -> Option<Bounds> {
        let committed = scene.entity_bounds(id)?;
        let Some(record) = self.nodes.get(&id) else {
            return Some(committed);
        };
        Some(Bounds::new(
            record.x,
            record.y,
            record.live_width.unwrap_or(committed.width),
            record.live_height.unwrap_or(committed.height),
        ))
    }

    /// Surface node carrying an entity's pixels, if reconciled.
    pub fn node_for(&self, id: EntityId) -> Option<NodeId> {
        self.nodes.get(&id).map(|record| record.node)
    }

    /// Number of affordance nodes currently alive.
    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    fn sync_shape<S: RenderSurface>(&mut self, shape: &Shape, selected: bool, surface: &mut S) {
        let visual = shape_visual(shape, selected, shape.width, shape.height);
        match self.nodes.get_mut(&shape.id) {
            None => {
                let node = surface.create_node(Layer::Shapes, visual, shape.bounds().origin());
                self.nodes
                    .insert(shape.id, RenderNode::new(node, shape.x, shape.y));
                log::debug!("Created render node for shape {}", shape.id);
            }
            Some(record) => record.refresh(shape.bounds(), visual, surface),
        }
    }

    fn sync_image<S: RenderSurface>(&mut self, image: &Image, surface: &mut S) {
        let visual = image_visual(image, image.width, image.height);
        match self.nodes.get_mut(&image.id) {
            None => {
                let node = surface.create_node(Layer::Images, visual, image.bounds().origin());
                self.nodes
                    .insert(image.id, RenderNode::new(node, image.x, image.y));
                log::debug!("Created render node for image {}", image.id);
            }
            Some(record) => record.refresh(image.bounds(), visual, surface),
        }
    }

    /// Reconcile the affordance set against the selection: one node per
    /// role for the selected entity, nothing for anyone else. Existing
    /// nodes are repositioned, never recreated.
    fn sync_handles<S: RenderSurface>(&mut self, scene: &SceneModel, surface: &mut S) {
        let selected = scene.selected;
        let stale: Vec<(EntityId, HandleRole)> = self
            .handles
            .keys()
            .copied()
            .filter(|(owner, _)| Some(*owner) != selected)
            .collect();
        for key in stale {
            if let Some(node) = self.handles.remove(&key) {
                surface.destroy_node(node);
            }
        }

        let Some(owner) = selected else {
            return;
        };
        let Some(bounds) = self.live_bounds(scene, owner) else {
            return;
        };

        for corner in Corner::ALL {
            let key = (owner, HandleRole::Corner(corner));
            let position = corner.position(bounds);
            match self.handles.get(&key) {
                Some(&node) => surface.set_position(node, position),
                None => {
                    let node = surface.create_node(Layer::Overlay, Visual::CornerHandle, position);
                    self.handles.insert(key, node);
                }
            }
        }

        let key = (owner, HandleRole::Delete);
        let position = handles::delete_handle_position(bounds);
        let badge = match self.handles.get(&key) {
            Some(&node) => {
                surface.set_position(node, position);
                node
            }
            None => {
                let node = surface.create_node(Layer::Overlay, Visual::DeleteBadge, position);
                self.handles.insert(key, node);
                node
            }
        };
        // The badge paints above the corner handles.
        surface.bring_to_front(badge);
    }

    fn destroy_handles_for<S: RenderSurface>(&mut self, owner: EntityId, surface: &mut S) {
        let keys: Vec<(EntityId, HandleRole)> = self
            .handles
            .keys()
            .copied()
            .filter(|(id, _)| *id == owner)
            .collect();
        for key in keys {
            if let Some(node) = self.handles.remove(&key) {
                surface.destroy_node(node);
            }
        }
    }

    fn position_handles<S: RenderSurface>(&self, owner: EntityId, bounds: Bounds, surface: &mut S) {
        for corner in Corner::ALL {
            if let Some(&node) = self.handles.get(&(owner, HandleRole::Corner(corner))) {
                surface.set_position(node, corner.position(bounds));
            }
        }
        if let Some(&node) = self.handles.get(&(owner, HandleRole::Delete)) {
            surface.set_position(node, handles::delete_handle_position(bounds));
        }
    }
}

fn shape_visual(shape: &Shape, selected: bool, width: f64, height: f64) -> Visual {
    let stroke = if selected {
        SELECTION_STROKE
    } else {
        shape.stroke
    };
    let paint = Paint {
        fill: shape.fill,
        fill_alpha: FILL_ALPHA,
        stroke,
        stroke_width: shape.stroke_width,
    };
    match shape.kind {
        ShapeKind::Rectangle => Visual::Rect {
            width,
            height,
            paint,
        },
        ShapeKind::Circle => Visual::Circle {
            width,
            height,
            paint,
        },
    }
}

fn image_visual(image: &Image, width: f64, height: f64) -> Visual {
    Visual::Image {
        source_uri: image.source_uri.clone(),
        width,
        height,
    }
}
