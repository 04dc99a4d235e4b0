//! Pointer sessions: the single-slot gesture state machine.
//!
//! A pointer-down may open at most one session; moves and the release
//! route to whichever is open, and the release always returns the slot to
//! [`Session::Idle`]. Sessions paint live geometry directly on the surface
//! and touch the model exactly once, at commit.

use easel_core::color::{DEFAULT_FILL, DEFAULT_STROKE, DEFAULT_STROKE_WIDTH};
use easel_core::entity::{EntityId, ShapeKind};
use easel_core::geometry::{self, Bounds};
use easel_core::handles::{self, Corner};
use easel_core::scene::SceneModel;
use easel_render::reconcile::Reconciler;
use easel_render::surface::{Layer, NodeId, PREVIEW_FILL_ALPHA, Paint, RenderSurface, Visual};
use kurbo::{Point, Vec2};

/// An in-progress draw gesture.
#[derive(Debug, Clone)]
pub struct DrawSession {
    /// Tool captured at gesture start; toolbar changes mid-gesture do not
    /// retarget it.
    pub tool: ShapeKind,
    /// Canvas point where the pointer went down.
    pub anchor: Point,
    /// Preview node, repainted on every move and discarded at commit.
    pub preview: NodeId,
}

impl DrawSession {
    /// Open the session, seeding a tiny preview at the anchor so it never
    /// flashes at the surface origin.
    pub fn start<R: RenderSurface>(tool: ShapeKind, anchor: Point, surface: &mut R) -> Self {
        let preview = surface.create_node(
            Layer::Preview,
            Visual::Rect {
                width: 1.0,
                height: 1.0,
                paint: preview_paint(),
            },
            anchor,
        );
        Self {
            tool,
            anchor,
            preview,
        }
    }

    /// Repaint the preview for the current pointer.
    pub fn on_move<R: RenderSurface>(&self, surface: &mut R, point: Point) {
        let (visual, origin) = self.preview_geometry(point);
        surface.set_visual(self.preview, visual);
        surface.set_position(self.preview, origin);
    }

    /// Discard the preview and commit the drawn entity. A zero-movement
    /// gesture still commits a degenerate entity at the anchor.
    pub fn on_end<R: RenderSurface>(
        self,
        scene: &mut SceneModel,
        surface: &mut R,
        point: Point,
    ) -> EntityId {
        surface.destroy_node(self.preview);
        scene.add_shape(self.tool, self.committed_bounds(point))
    }

    /// Bounds the gesture commits for the given release pointer.
    pub fn committed_bounds(&self, point: Point) -> Bounds {
        match self.tool {
            ShapeKind::Rectangle => Bounds::from_corners(self.anchor, point),
            ShapeKind::Circle => {
                Bounds::circle_from_anchor(self.anchor, geometry::drag_radius(self.anchor, point))
            }
        }
    }

    fn preview_geometry(&self, point: Point) -> (Visual, Point) {
        let paint = preview_paint();
        match self.tool {
            ShapeKind::Rectangle => {
                let bounds = Bounds::from_corners(self.anchor, point);
                (
                    Visual::Rect {
                        width: bounds.width,
                        height: bounds.height,
                        paint,
                    },
                    bounds.origin(),
                )
            }
            ShapeKind::Circle => {
                // Painted centered on the anchor while drawing; the
                // committed entity keeps its origin at the anchor instead.
                let radius = geometry::drag_radius(self.anchor, point);
                (
                    Visual::Circle {
                        width: radius * 2.0,
                        height: radius * 2.0,
                        paint,
                    },
                    Point::new(self.anchor.x - radius, self.anchor.y - radius),
                )
            }
        }
    }
}

fn preview_paint() -> Paint {
    Paint {
        fill: DEFAULT_FILL,
        fill_alpha: PREVIEW_FILL_ALPHA,
        stroke: DEFAULT_STROKE,
        stroke_width: DEFAULT_STROKE_WIDTH,
    }
}

/// An in-progress move gesture.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub entity: EntityId,
    /// Pointer-to-origin offset captured at start; the origin tracks
    /// `pointer - offset` for the rest of the gesture.
    pub grab_offset: Vec2,
    /// Origin as last painted. The release commits this, so a release far
    /// outside the surface cannot teleport the entity.
    pub live_origin: Point,
    /// Whether the pointer moved at all since the gesture opened.
    pub moved: bool,
}

impl DragSession {
    /// Open the session from the entity's live origin.
    pub fn start(entity: EntityId, origin: Point, pointer: Point) -> Self {
        Self {
            entity,
            grab_offset: pointer - origin,
            live_origin: origin,
            moved: false,
        }
    }

    /// Paint the entity and its affordances at the pointer-tracked origin.
    pub fn on_move<R: RenderSurface>(
        &mut self,
        scene: &SceneModel,
        reconciler: &mut Reconciler,
        surface: &mut R,
        point: Point,
    ) {
        self.moved = true;
        self.live_origin = point - self.grab_offset;
        reconciler.live_move(scene, self.entity, self.live_origin, surface);
    }

    /// Commit the last painted origin. A stale id (the entity was removed
    /// mid-gesture) is a no-op. Returns whether the model changed.
    pub fn on_end(self, scene: &mut SceneModel) -> bool {
        let Some(committed) = scene.entity_bounds(self.entity) else {
            log::debug!("Drag commit dropped, entity {} is gone", self.entity);
            return false;
        };
        scene.update_bounds(
            self.entity,
            Bounds::new(
                self.live_origin.x,
                self.live_origin.y,
                committed.width,
                committed.height,
            ),
        )
    }
}

/// An in-progress resize gesture.
#[derive(Debug, Clone)]
pub struct ResizeSession {
    pub entity: EntityId,
    /// Corner handle driving the gesture.
    pub corner: Corner,
    /// Pointer position at gesture start.
    pub anchor: Point,
    /// Live bounds at gesture start. Live, not committed, so resizes chain
    /// correctly after an earlier uncommitted one.
    pub start_bounds: Bounds,
    /// Bounds as last painted, committed on release.
    pub live_bounds: Bounds,
}

impl ResizeSession {
    /// Open the session from the entity's live bounds.
    pub fn start(entity: EntityId, corner: Corner, pointer: Point, live: Bounds) -> Self {
        Self {
            entity,
            corner,
            anchor: pointer,
            start_bounds: live,
            live_bounds: live,
        }
    }

    /// Derive clamped bounds for the pointer delta and paint them.
    pub fn on_move<R: RenderSurface>(
        &mut self,
        scene: &SceneModel,
        reconciler: &mut Reconciler,
        surface: &mut R,
        point: Point,
    ) {
        self.live_bounds =
            handles::resize_bounds(self.start_bounds, self.corner, point - self.anchor);
        reconciler.live_resize(scene, self.entity, self.live_bounds, surface);
    }

    /// Commit the last painted bounds. A stale id is a no-op. Returns
    /// whether the model changed.
    pub fn on_end(self, scene: &mut SceneModel) -> bool {
        let committed = scene.update_bounds(self.entity, self.live_bounds);
        if !committed {
            log::debug!("Resize commit dropped, entity {} is gone", self.entity);
        }
        committed
    }
}

/// The single pointer-session slot.
#[derive(Debug, Clone, Default)]
pub enum Session {
    /// No gesture owns the pointer.
    #[default]
    Idle,
    /// A shape is being drawn onto empty canvas.
    Drawing(DrawSession),
    /// An entity is being moved.
    Dragging(DragSession),
    /// The selected entity is being resized by a corner handle.
    Resizing(ResizeSession),
}

impl Session {
    /// Whether a gesture currently owns the pointer.
    pub fn is_active(&self) -> bool {
        !matches!(self, Session::Idle)
    }
}
