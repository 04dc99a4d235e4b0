//! Editor facade: scene model, reconciler, render surface, session slot
//! and debounced persistence wired together behind pointer entry points.

use crate::session::{DragSession, DrawSession, ResizeSession, Session};
use easel_core::entity::{DEFAULT_IMAGE_BOUNDS, EntityId, ShapeKind};
use easel_core::handles::{self, HandleRole};
use easel_core::scene::SceneModel;
use easel_core::storage::{PersistenceBridge, SceneStore};
use easel_render::reconcile::Reconciler;
use easel_render::surface::RenderSurface;
use kurbo::Point;
use std::sync::Arc;

/// A canvas editor bound to one render surface and one store subject.
///
/// Hosts feed pointer events in surface coordinates and pump
/// [`maybe_save`](Editor::maybe_save) from their own tick; selection,
/// gesture sessions, reconciliation and the save debounce all live here.
/// Pointer handlers are synchronous and never block.
pub struct Editor<R: RenderSurface, S: SceneStore> {
    scene: SceneModel,
    reconciler: Reconciler,
    surface: R,
    session: Session,
    bridge: PersistenceBridge<S>,
}

impl<R: RenderSurface, S: SceneStore> Editor<R, S> {
    /// Create an editor with an empty scene.
    pub fn new(surface: R, store: Arc<S>, subject: impl Into<String>) -> Self {
        Self {
            scene: SceneModel::new(),
            reconciler: Reconciler::new(),
            surface,
            session: Session::Idle,
            bridge: PersistenceBridge::new(store, subject),
        }
    }

    /// The scene model.
    pub fn scene(&self) -> &SceneModel {
        &self.scene
    }

    /// The render surface.
    pub fn surface(&self) -> &R {
        &self.surface
    }

    /// Mutable access to the render surface, for host-side drawing.
    pub fn surface_mut(&mut self) -> &mut R {
        &mut self.surface
    }

    /// The persistence bridge.
    pub fn bridge(&self) -> &PersistenceBridge<S> {
        &self.bridge
    }

    /// Mutable access to the persistence bridge, e.g. to tune the debounce.
    pub fn bridge_mut(&mut self) -> &mut PersistenceBridge<S> {
        &mut self.bridge
    }

    /// Whether a gesture currently owns the pointer.
    pub fn session_active(&self) -> bool {
        self.session.is_active()
    }

    /// Set or clear the active drawing tool. Not persisted, never saves.
    pub fn set_tool(&mut self, tool: Option<ShapeKind>) {
        self.scene.set_tool(tool);
    }

    /// Select an entity programmatically, or clear with `None`. Not
    /// persisted, never saves.
    pub fn select(&mut self, id: Option<EntityId>) {
        self.scene.select(id);
        self.reconcile();
    }

    /// Place an image at the default upload bounds. The URI is opaque: a
    /// data URI or remote URL the render backend resolves on its own.
    pub fn add_image(&mut self, source_uri: impl Into<String>) -> EntityId {
        let id = self.scene.add_image(source_uri, DEFAULT_IMAGE_BOUNDS);
        log::debug!("Image {} added", id);
        self.bridge.mark_dirty();
        self.reconcile();
        id
    }

    /// Remove the selected entity, if any.
    pub fn delete_selected(&mut self) -> bool {
        match self.scene.selected {
            Some(id) => self.remove_entity(id),
            None => false,
        }
    }

    /// Handle a pointer-down. Claims are checked top-of-paint-order first:
    /// the selected entity's affordances, then entities (images before
    /// shapes, front to back), then empty canvas.
    pub fn pointer_down(&mut self, point: Point) {
        if self.session.is_active() {
            return;
        }
        if !self.surface.is_live() {
            return;
        }

        if let Some(selected) = self.scene.selected {
            if let Some(bounds) = self.reconciler.live_bounds(&self.scene, selected) {
                match handles::handle_at(bounds, point) {
                    Some(HandleRole::Corner(corner)) => {
                        log::debug!("Resize session started for {}", selected);
                        self.session = Session::Resizing(ResizeSession::start(
                            selected, corner, point, bounds,
                        ));
                        return;
                    }
                    Some(HandleRole::Delete) => {
                        self.remove_entity(selected);
                        return;
                    }
                    None => {}
                }
            }
        }

        if let Some(id) = self.scene.entity_at(point) {
            // Select and reconcile before the drag opens, so the entity's
            // affordances appear at pointer-down rather than at release.
            self.scene.select(Some(id));
            self.reconcile();
            if let Some(bounds) = self.reconciler.live_bounds(&self.scene, id) {
                log::debug!("Drag session started for {}", id);
                self.session = Session::Dragging(DragSession::start(id, bounds.origin(), point));
            }
            return;
        }

        // Empty canvas: clear any selection, then begin drawing in this
        // same event if a tool is armed.
        if self.scene.selected.is_some() {
            self.scene.select(None);
            self.reconcile();
        }
        if let Some(tool) = self.scene.active_tool {
            log::debug!("Draw session started with {:?} tool", tool);
            self.session = Session::Drawing(DrawSession::start(tool, point, &mut self.surface));
        }
    }

    /// Handle a pointer-move. Routes to the open session; idle moves are
    /// ignored. Never blocks.
    pub fn pointer_move(&mut self, point: Point) {
        match &mut self.session {
            Session::Idle => {}
            Session::Drawing(draw) => draw.on_move(&mut self.surface, point),
            Session::Dragging(drag) => {
                drag.on_move(&self.scene, &mut self.reconciler, &mut self.surface, point)
            }
            Session::Resizing(resize) => {
                resize.on_move(&self.scene, &mut self.reconciler, &mut self.surface, point)
            }
        }
    }

    /// Handle a pointer-up: commit the open session and return the slot to
    /// idle. Drag and resize commits use the last painted geometry; the
    /// draw commit uses the release pointer.
    pub fn pointer_up(&mut self, point: Point) {
        match std::mem::take(&mut self.session) {
            Session::Idle => {}
            Session::Drawing(draw) => {
                let id = draw.on_end(&mut self.scene, &mut self.surface, point);
                log::debug!("Draw committed entity {}", id);
                self.bridge.mark_dirty();
                self.reconcile();
            }
            Session::Dragging(drag) => {
                if drag.on_end(&mut self.scene) {
                    self.bridge.mark_dirty();
                }
                self.reconcile();
            }
            Session::Resizing(resize) => {
                if resize.on_end(&mut self.scene) {
                    self.bridge.mark_dirty();
                }
                self.reconcile();
            }
        }
    }

    /// Handle the pointer leaving the surface: identical to a release.
    /// This is the only gesture end besides pointer-up; there is no
    /// abort-without-commit path.
    pub fn pointer_leave(&mut self, point: Point) {
        self.pointer_up(point);
    }

    /// Bring the surface in line with the model. Safe to call at any time:
    /// a pass during an active session, or after the surface was torn
    /// down, is a no-op.
    pub fn reconcile(&mut self) {
        self.reconciler
            .sync(&self.scene, &mut self.surface, self.session.is_active());
    }

    /// Replace the scene with the subject's stored content. A missing blob
    /// is an empty scene; a failed load is logged and the current scene
    /// kept, so the editor stays interactive without persistence.
    pub async fn load(&mut self) {
        match self.bridge.load().await {
            Ok(loaded) => {
                log::info!(
                    "Scene loaded for {} ({} entities)",
                    self.bridge.subject(),
                    loaded.entity_count()
                );
                self.scene.replace_content(loaded.shapes, loaded.images);
                self.reconcile();
            }
            Err(e) => {
                log::error!("Scene load failed for {}: {}", self.bridge.subject(), e);
            }
        }
    }

    /// Pump the debounced save. Hosts call this from their tick; a failed
    /// save is logged and abandoned for that cycle, never retried.
    pub async fn maybe_save(&mut self) -> bool {
        match self.bridge.maybe_save(&self.scene).await {
            Ok(saved) => {
                if saved {
                    log::debug!("Scene saved for {}", self.bridge.subject());
                }
                saved
            }
            Err(e) => {
                log::error!("Scene save failed for {}: {}", self.bridge.subject(), e);
                false
            }
        }
    }

    /// Save immediately, bypassing the debounce. For host shutdown.
    pub async fn save_now(&mut self) -> bool {
        match self.bridge.save(&self.scene).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Scene save failed for {}: {}", self.bridge.subject(), e);
                false
            }
        }
    }

    fn remove_entity(&mut self, id: EntityId) -> bool {
        if !self.scene.remove_entity(id) {
            return false;
        }
        log::debug!("Entity {} deleted", id);
        self.bridge.mark_dirty();
        self.reconcile();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::geometry::Bounds;
    use easel_core::storage::{BoxFuture, MemoryStore, StoreError, StoreResult};
    use easel_render::headless::HeadlessSurface;
    use easel_render::surface::{Layer, NodeId};
    use std::time::Duration;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

        fn dummy_raw_waker() -> RawWaker {
            fn no_op(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                dummy_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(result) => return result,
                Poll::Pending => {}
            }
        }
    }

    /// Store whose saves always fail, for the abandon-on-error path.
    struct FailingStore;

    impl SceneStore for FailingStore {
        fn save(&self, _subject: &str, _blob: &str) -> BoxFuture<'_, StoreResult<()>> {
            Box::pin(async { Err(StoreError::Io("store unreachable".to_string())) })
        }

        fn load(&self, _subject: &str) -> BoxFuture<'_, StoreResult<Option<String>>> {
            Box::pin(async { Ok(None) })
        }
    }

    fn editor() -> Editor<HeadlessSurface, MemoryStore> {
        Editor::new(HeadlessSurface::new(), Arc::new(MemoryStore::new()), "user-1")
    }

    /// Draw a rectangle through the pointer path and disarm the tool.
    fn draw_rect(
        editor: &mut Editor<HeadlessSurface, MemoryStore>,
        from: Point,
        to: Point,
    ) -> EntityId {
        editor.set_tool(Some(ShapeKind::Rectangle));
        editor.pointer_down(from);
        editor.pointer_move(to);
        editor.pointer_up(to);
        editor.set_tool(None);
        editor.scene().shapes.last().unwrap().id
    }

    fn nodes_in(surface: &HeadlessSurface, layer: Layer) -> Vec<NodeId> {
        surface
            .paint_order()
            .into_iter()
            .filter(|id| surface.node(*id).unwrap().layer == layer)
            .collect()
    }

    #[test]
    fn test_draw_rectangle_gesture() {
        let mut editor = editor();
        editor.set_tool(Some(ShapeKind::Rectangle));

        editor.pointer_down(Point::new(10.0, 10.0));
        assert!(editor.session_active());
        // The preview paints below all committed content.
        assert_eq!(nodes_in(editor.surface(), Layer::Preview).len(), 1);

        editor.pointer_move(Point::new(70.0, 50.0));
        editor.pointer_up(Point::new(70.0, 50.0));

        assert!(!editor.session_active());
        assert_eq!(editor.scene().shapes.len(), 1);
        assert_eq!(
            editor.scene().shapes[0].bounds(),
            Bounds::new(10.0, 10.0, 60.0, 40.0)
        );
        // Preview gone, committed node in its place.
        assert!(nodes_in(editor.surface(), Layer::Preview).is_empty());
        assert_eq!(nodes_in(editor.surface(), Layer::Shapes).len(), 1);
        assert!(editor.bridge().is_dirty());
    }

    #[test]
    fn test_draw_circle_by_drag_distance() {
        let mut editor = editor();
        editor.set_tool(Some(ShapeKind::Circle));

        editor.pointer_down(Point::new(0.0, 0.0));
        editor.pointer_move(Point::new(1.0, 1.0));
        editor.pointer_up(Point::new(3.0, 4.0));

        let shape = &editor.scene().shapes[0];
        assert_eq!(shape.kind, ShapeKind::Circle);
        assert_eq!(shape.bounds(), Bounds::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_click_without_drag_commits_degenerate_shape() {
        let mut editor = editor();
        editor.set_tool(Some(ShapeKind::Rectangle));

        editor.pointer_down(Point::new(5.0, 5.0));
        editor.pointer_up(Point::new(5.0, 5.0));

        assert_eq!(
            editor.scene().shapes[0].bounds(),
            Bounds::new(5.0, 5.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_drag_commit_exactness() {
        let mut editor = editor();
        let id = draw_rect(&mut editor, Point::new(20.0, 20.0), Point::new(120.0, 120.0));

        editor.pointer_down(Point::new(100.0, 100.0));
        assert_eq!(editor.scene().selected, Some(id));
        editor.pointer_move(Point::new(130.0, 115.0));
        editor.pointer_up(Point::new(130.0, 115.0));

        assert_eq!(
            editor.scene().entity_bounds(id),
            Some(Bounds::new(50.0, 35.0, 100.0, 100.0))
        );
        assert_eq!(editor.scene().selected, Some(id));
    }

    #[test]
    fn test_down_on_entity_shows_handles_immediately() {
        let mut editor = editor();
        draw_rect(&mut editor, Point::new(0.0, 0.0), Point::new(40.0, 40.0));

        editor.pointer_down(Point::new(20.0, 20.0));

        // Four corners plus the delete affordance, before any move or
        // release.
        assert!(editor.session_active());
        assert_eq!(nodes_in(editor.surface(), Layer::Overlay).len(), 5);
    }

    #[test]
    fn test_resize_clamp_via_pointer_path() {
        let mut editor = editor();
        let id = draw_rect(&mut editor, Point::new(0.0, 0.0), Point::new(40.0, 40.0));
        editor.pointer_down(Point::new(20.0, 20.0));
        editor.pointer_up(Point::new(20.0, 20.0));
        assert_eq!(editor.scene().selected, Some(id));

        // Drag the top-left handle right past the minimum width.
        editor.pointer_down(Point::new(0.0, 0.0));
        editor.pointer_move(Point::new(50.0, 0.0));
        editor.pointer_up(Point::new(50.0, 0.0));

        assert_eq!(
            editor.scene().entity_bounds(id),
            Some(Bounds::new(30.0, 0.0, 10.0, 40.0))
        );
    }

    #[test]
    fn test_selection_exclusivity() {
        let mut editor = editor();
        let a = draw_rect(&mut editor, Point::new(0.0, 0.0), Point::new(40.0, 40.0));
        let b = draw_rect(&mut editor, Point::new(100.0, 0.0), Point::new(140.0, 40.0));

        editor.pointer_down(Point::new(20.0, 20.0));
        editor.pointer_up(Point::new(20.0, 20.0));
        assert_eq!(editor.scene().selected, Some(a));

        editor.pointer_down(Point::new(120.0, 20.0));
        editor.pointer_up(Point::new(120.0, 20.0));
        assert_eq!(editor.scene().selected, Some(b));

        // Empty canvas always clears, and with no tool armed nothing
        // starts.
        editor.pointer_down(Point::new(300.0, 300.0));
        assert_eq!(editor.scene().selected, None);
        assert!(!editor.session_active());
        editor.pointer_up(Point::new(300.0, 300.0));
        assert_eq!(editor.scene().selected, None);
    }

    #[test]
    fn test_empty_down_clears_selection_then_draws() {
        let mut editor = editor();
        draw_rect(&mut editor, Point::new(0.0, 0.0), Point::new(40.0, 40.0));
        editor.set_tool(Some(ShapeKind::Rectangle));

        // Entity hit beats the armed tool: clicking the shape selects it.
        editor.pointer_down(Point::new(20.0, 20.0));
        editor.pointer_up(Point::new(20.0, 20.0));
        assert!(editor.scene().selected.is_some());

        // Empty down clears the selection and opens the draw in the same
        // event.
        editor.pointer_down(Point::new(200.0, 200.0));
        assert_eq!(editor.scene().selected, None);
        assert!(editor.session_active());

        editor.pointer_move(Point::new(240.0, 230.0));
        editor.pointer_up(Point::new(240.0, 230.0));

        assert_eq!(editor.scene().shapes.len(), 2);
        assert_eq!(
            editor.scene().shapes[1].bounds(),
            Bounds::new(200.0, 200.0, 40.0, 30.0)
        );
        assert_eq!(editor.scene().selected, None);
    }

    #[test]
    fn test_delete_affordance_tears_everything_down() {
        let mut editor = editor();
        draw_rect(&mut editor, Point::new(0.0, 0.0), Point::new(40.0, 40.0));
        editor.pointer_down(Point::new(20.0, 20.0));
        editor.pointer_up(Point::new(20.0, 20.0));
        block_on(editor.save_now());

        // The affordance anchors right of the top-right corner.
        editor.pointer_down(Point::new(58.0, -9.0));

        assert!(editor.scene().is_empty());
        assert_eq!(editor.scene().selected, None);
        assert_eq!(editor.surface().node_count(), 0);
        assert!(!editor.session_active());
        assert!(editor.bridge().is_dirty());
    }

    #[test]
    fn test_delete_selected_api() {
        let mut editor = editor();
        let id = editor.add_image("data:image/png;base64,abc");
        editor.select(Some(id));

        assert!(editor.delete_selected());
        assert!(editor.scene().is_empty());
        assert_eq!(editor.surface().node_count(), 0);
        assert!(!editor.delete_selected());
    }

    #[test]
    fn test_mid_gesture_delete_makes_commit_a_noop() {
        let mut editor = editor();
        draw_rect(&mut editor, Point::new(0.0, 0.0), Point::new(40.0, 40.0));

        editor.pointer_down(Point::new(20.0, 20.0));
        editor.pointer_move(Point::new(30.0, 30.0));
        assert!(editor.delete_selected());
        assert!(editor.scene().is_empty());

        // The release finds the entity gone and drops the commit.
        editor.pointer_up(Point::new(30.0, 30.0));
        assert!(editor.scene().is_empty());
        assert_eq!(editor.surface().node_count(), 0);
    }

    #[test]
    fn test_reconcile_stands_down_mid_session() {
        let mut editor = editor();
        draw_rect(&mut editor, Point::new(20.0, 20.0), Point::new(120.0, 120.0));

        editor.pointer_down(Point::new(100.0, 100.0));
        editor.pointer_move(Point::new(130.0, 115.0));

        // A host-driven pass must not snap the node back to (20,20).
        editor.reconcile();
        let node = nodes_in(editor.surface(), Layer::Shapes)[0];
        assert_eq!(
            editor.surface().node(node).unwrap().position,
            Point::new(50.0, 35.0)
        );

        editor.pointer_up(Point::new(130.0, 115.0));
        assert_eq!(
            editor.scene().shapes[0].bounds(),
            Bounds::new(50.0, 35.0, 100.0, 100.0)
        );
    }

    #[test]
    fn test_pointer_leave_commits_like_release() {
        let mut editor = editor();
        let id = draw_rect(&mut editor, Point::new(20.0, 20.0), Point::new(120.0, 120.0));

        editor.pointer_down(Point::new(100.0, 100.0));
        editor.pointer_move(Point::new(130.0, 115.0));
        // Leaving far outside the surface still commits the last painted
        // origin, not the exit point.
        editor.pointer_leave(Point::new(130.0, 115.0));

        assert!(!editor.session_active());
        assert_eq!(
            editor.scene().entity_bounds(id),
            Some(Bounds::new(50.0, 35.0, 100.0, 100.0))
        );
    }

    #[test]
    fn test_single_session_slot() {
        let mut editor = editor();
        editor.set_tool(Some(ShapeKind::Rectangle));

        editor.pointer_down(Point::new(10.0, 10.0));
        let nodes = editor.surface().node_count();

        // A second down while a gesture is open is ignored outright.
        editor.pointer_down(Point::new(10.0, 10.0));
        assert_eq!(editor.surface().node_count(), nodes);
        assert!(matches!(editor.session, Session::Drawing(_)));
    }

    #[test]
    fn test_add_image_default_placement() {
        let mut editor = editor();
        let id = editor.add_image("data:image/png;base64,abc");

        assert_eq!(
            editor.scene().entity_bounds(id),
            Some(Bounds::new(50.0, 50.0, 200.0, 200.0))
        );
        assert_eq!(nodes_in(editor.surface(), Layer::Images).len(), 1);
        assert!(editor.bridge().is_dirty());
    }

    #[test]
    fn test_round_trip_via_shared_store() {
        let store = Arc::new(MemoryStore::new());
        let mut first = Editor::new(HeadlessSurface::new(), store.clone(), "doc-7");
        draw_rect(&mut first, Point::new(5.0, 5.0), Point::new(55.0, 45.0));
        first.add_image("https://example.com/a.png");
        first.bridge_mut().set_interval(Duration::ZERO);
        assert!(block_on(first.maybe_save()));

        let mut second = Editor::new(HeadlessSurface::new(), store, "doc-7");
        block_on(second.load());

        assert_eq!(second.scene().shapes, first.scene().shapes);
        assert_eq!(second.scene().images, first.scene().images);
        assert_eq!(second.scene().selected, None);
        assert_eq!(
            second.surface().node_count(),
            second.scene().entity_count()
        );
    }

    #[test]
    fn test_load_without_prior_state_is_empty() {
        let mut editor = editor();
        block_on(editor.load());

        assert!(editor.scene().is_empty());
        assert_eq!(editor.surface().node_count(), 0);
    }

    #[test]
    fn test_failed_save_is_abandoned() {
        let mut editor = Editor::new(HeadlessSurface::new(), Arc::new(FailingStore), "user-1");
        editor.set_tool(Some(ShapeKind::Rectangle));
        editor.pointer_down(Point::new(0.0, 0.0));
        editor.pointer_up(Point::new(10.0, 10.0));
        editor.bridge_mut().set_interval(Duration::ZERO);

        assert!(editor.bridge().is_dirty());
        assert!(!block_on(editor.maybe_save()));
        // The cycle is spent; no retry is armed.
        assert!(!editor.bridge().is_dirty());
    }

    #[test]
    fn test_save_waits_for_quiescence() {
        let mut editor = editor();
        draw_rect(&mut editor, Point::new(0.0, 0.0), Point::new(10.0, 10.0));

        // Default window is one second; the mutation is not yet due.
        assert!(editor.bridge().is_dirty());
        assert!(!block_on(editor.maybe_save()));
        assert!(editor.bridge().is_dirty());
    }

    #[test]
    fn test_selection_and_tool_changes_never_save() {
        let mut editor = editor();
        let id = draw_rect(&mut editor, Point::new(0.0, 0.0), Point::new(40.0, 40.0));
        assert!(block_on(editor.save_now()));
        assert!(!editor.bridge().is_dirty());

        editor.select(Some(id));
        editor.set_tool(Some(ShapeKind::Circle));
        editor.select(None);

        assert!(!editor.bridge().is_dirty());
    }
}
