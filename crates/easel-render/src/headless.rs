//! In-memory render surface.
//!
//! Records every node the reconciler manages without touching a real
//! backend. Used by tests and by headless hosts that only need the model
//! side effects.

use crate::surface::{Layer, NodeId, RenderSurface, Visual};
use kurbo::Point;
use std::collections::HashMap;

/// A drawable recorded by [`HeadlessSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessNode {
    pub layer: Layer,
    pub visual: Visual,
    pub position: Point,
}

/// Render surface that records nodes in memory.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    nodes: HashMap<NodeId, HeadlessNode>,
    /// Creation-and-raise order, across all layers.
    order: Vec<NodeId>,
    next: u64,
    torn_down: bool,
    created: usize,
    destroyed: usize,
}

impl HeadlessSurface {
    /// Create an empty, live surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate host teardown. The surface keeps its nodes for inspection
    /// but reports `is_live() == false` and drops every mutation from here
    /// on.
    pub fn tear_down(&mut self) {
        self.torn_down = true;
    }

    /// Look up a recorded node.
    pub fn node(&self, id: NodeId) -> Option<&HeadlessNode> {
        self.nodes.get(&id)
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total nodes ever created.
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Total nodes destroyed.
    pub fn destroyed_count(&self) -> usize {
        self.destroyed
    }

    /// Node ids bottom to top, as they would paint: layer first, then
    /// creation-and-raise order within the layer.
    pub fn paint_order(&self) -> Vec<NodeId> {
        let mut ids = self.order.clone();
        ids.sort_by_key(|id| self.nodes[id].layer);
        ids
    }
}

impl RenderSurface for HeadlessSurface {
    fn is_live(&self) -> bool {
        !self.torn_down
    }

    fn create_node(&mut self, layer: Layer, visual: Visual, position: Point) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        if self.torn_down {
            // A dead id: nothing is recorded, later mutations find no node.
            return id;
        }
        self.nodes.insert(
            id,
            HeadlessNode {
                layer,
                visual,
                position,
            },
        );
        self.order.push(id);
        self.created += 1;
        id
    }

    fn set_visual(&mut self, node: NodeId, visual: Visual) {
        if self.torn_down {
            return;
        }
        if let Some(record) = self.nodes.get_mut(&node) {
            record.visual = visual;
        }
    }

    fn set_position(&mut self, node: NodeId, position: Point) {
        if self.torn_down {
            return;
        }
        if let Some(record) = self.nodes.get_mut(&node) {
            record.position = position;
        }
    }

    fn bring_to_front(&mut self, node: NodeId) {
        if self.torn_down {
            return;
        }
        if self.nodes.contains_key(&node) {
            self.order.retain(|id| *id != node);
            self.order.push(node);
        }
    }

    fn destroy_node(&mut self, node: NodeId) {
        if self.torn_down {
            return;
        }
        if self.nodes.remove(&node).is_some() {
            self.order.retain(|id| *id != node);
            self.destroyed += 1;
        }
    }
}
