//! Debounced persistence between the scene model and an external store.
//!
//! Mutations re-arm a trailing timer; only the save after the scene has
//! been quiet for the full interval is sent, which bounds write volume
//! during continuous gestures without losing the final state.

use crate::scene::SceneModel;
use crate::storage::{SceneStore, StoreError, StoreResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Trailing debounce window applied to saves.
pub const SAVE_DEBOUNCE: Duration = Duration::from_secs(1);

/// Debounced bridge to a scene store.
///
/// Hosts pump [`maybe_save`](PersistenceBridge::maybe_save) from their own
/// tick; nothing here spawns tasks or blocks.
pub struct PersistenceBridge<S: SceneStore> {
    /// Store backend.
    store: Arc<S>,
    /// External subject id the scene is keyed by.
    subject: String,
    /// Debounce window.
    interval: Duration,
    /// When the scene last changed; `None` means clean.
    dirty_at: Option<Instant>,
}

impl<S: SceneStore> PersistenceBridge<S> {
    /// Create a bridge for the given store and subject.
    pub fn new(store: Arc<S>, subject: impl Into<String>) -> Self {
        Self {
            store,
            subject: subject.into(),
            interval: SAVE_DEBOUNCE,
            dirty_at: None,
        }
    }

    /// Set the debounce window. A pending mutation is measured against the
    /// new window at the next pump.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Get the debounce window.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The subject id this bridge saves under.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Record a model mutation: (re)arms the trailing debounce timer.
    pub fn mark_dirty(&mut self) {
        self.dirty_at = Some(Instant::now());
    }

    /// Whether a mutation is waiting to be flushed.
    pub fn is_dirty(&self) -> bool {
        self.dirty_at.is_some()
    }

    /// Whether the debounce window has elapsed since the last mutation.
    pub fn save_due(&self) -> bool {
        match self.dirty_at {
            Some(at) => at.elapsed() >= self.interval,
            None => false,
        }
    }

    /// Save if a mutation is pending and its debounce window has elapsed.
    /// Returns true if a save was sent.
    pub async fn maybe_save(&mut self, scene: &SceneModel) -> StoreResult<bool> {
        if !self.save_due() {
            return Ok(false);
        }

        // One attempt per debounce cycle: a failed save is abandoned, not
        // retried on the next pump.
        self.dirty_at = None;
        self.save(scene).await?;
        Ok(true)
    }

    /// Save immediately, clearing any pending debounce.
    pub async fn save(&mut self, scene: &SceneModel) -> StoreResult<()> {
        let blob = scene
            .to_json()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store.save(&self.subject, &blob).await?;
        self.dirty_at = None;
        Ok(())
    }

    /// Load the subject's scene. No prior blob resolves to an empty scene.
    pub async fn load(&mut self) -> StoreResult<SceneModel> {
        let scene = match self.store.load(&self.subject).await? {
            Some(blob) => SceneModel::from_json(&blob)
                .map_err(|e| StoreError::Serialization(e.to_string()))?,
            None => SceneModel::new(),
        };
        self.dirty_at = None;
        Ok(scene)
    }

    /// Get a reference to the store backend.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ShapeKind;
    use crate::geometry::Bounds;
    use crate::storage::{BoxFuture, MemoryStore};

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

    #[test]
    fn test_clean_bridge_does_not_save() {
        let store = Arc::new(MemoryStore::new());
        let mut bridge = PersistenceBridge::new(store, "user-1");
        bridge.set_interval(Duration::ZERO);

        let scene = SceneModel::new();
        assert!(!bridge.is_dirty());
        assert!(!block_on(bridge.maybe_save(&scene)).unwrap());
    }

    #[test]
    fn test_debounce_holds_until_deadline() {
        let store = Arc::new(MemoryStore::new());
        let mut bridge = PersistenceBridge::new(store, "user-1");

        // Default window is one second; a fresh mutation is not yet due.
        bridge.mark_dirty();
        assert!(bridge.is_dirty());
        assert!(!bridge.save_due());

        let scene = SceneModel::new();
        assert!(!block_on(bridge.maybe_save(&scene)).unwrap());
        assert!(bridge.is_dirty());
    }

    #[test]
    fn test_interval_change_applies_to_pending_mutation() {
        let store = Arc::new(MemoryStore::new());
        let mut bridge = PersistenceBridge::new(store, "user-1");

        let mut scene = SceneModel::new();
        scene.add_shape(ShapeKind::Rectangle, Bounds::new(0.0, 0.0, 10.0, 10.0));
        bridge.mark_dirty();
        assert!(!bridge.save_due());

        // Tightening the window while a mutation is pending makes it due
        // at the next pump; the window is read at check time, not stamped
        // at mutation time.
        bridge.set_interval(Duration::ZERO);
        assert!(bridge.save_due());
        assert!(block_on(bridge.maybe_save(&scene)).unwrap());
        assert!(!bridge.is_dirty());
    }

    #[test]
    fn test_trailing_save_after_quiescence() {
        let store = Arc::new(MemoryStore::new());
        let mut bridge = PersistenceBridge::new(store, "user-1");
        bridge.set_interval(Duration::ZERO);

        let mut scene = SceneModel::new();
        scene.add_shape(ShapeKind::Rectangle, Bounds::new(0.0, 0.0, 10.0, 10.0));
        bridge.mark_dirty();

        assert!(block_on(bridge.maybe_save(&scene)).unwrap());
        // Flushed: the next pump sends nothing.
        assert!(!bridge.is_dirty());
        assert!(!block_on(bridge.maybe_save(&scene)).unwrap());
    }

    #[test]
    fn test_round_trip_preserves_fields_and_order() {
        let store = Arc::new(MemoryStore::new());
        let mut bridge = PersistenceBridge::new(store, "user-1");

        let mut scene = SceneModel::new();
        scene.add_shape(ShapeKind::Rectangle, Bounds::new(1.0, 2.0, 30.0, 40.0));
        scene.add_shape(ShapeKind::Circle, Bounds::new(5.0, 5.0, 20.0, 20.0));
        scene.add_image("data:image/png;base64,abc", Bounds::new(50.0, 50.0, 200.0, 200.0));

        block_on(bridge.save(&scene)).unwrap();
        let loaded = block_on(bridge.load()).unwrap();

        assert_eq!(loaded.shapes, scene.shapes);
        assert_eq!(loaded.images, scene.images);
    }

    #[test]
    fn test_load_without_prior_state_is_empty() {
        let store = Arc::new(MemoryStore::new());
        let mut bridge = PersistenceBridge::new(store, "nobody");

        let loaded = block_on(bridge.load()).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_failed_save_is_abandoned_not_retried() {
        let mut bridge = PersistenceBridge::new(Arc::new(FailingStore), "user-1");
        bridge.set_interval(Duration::ZERO);

        let scene = SceneModel::new();
        bridge.mark_dirty();

        assert!(block_on(bridge.maybe_save(&scene)).is_err());
        // The cycle is spent; nothing is re-armed for the next pump.
        assert!(!bridge.is_dirty());
        assert!(!block_on(bridge.maybe_save(&scene)).unwrap());
    }
}
