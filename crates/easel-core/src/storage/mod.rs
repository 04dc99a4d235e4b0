//! Scene persistence: the external store seam and its backends.

pub mod bridge;
#[cfg(not(target_arch = "wasm32"))]
pub mod fs;
pub mod memory;

pub use bridge::{PersistenceBridge, SAVE_DEBOUNCE};
#[cfg(not(target_arch = "wasm32"))]
pub use fs::FsStore;
pub use memory::MemoryStore;

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors from a scene store backend.
///
/// A subject with no prior state is `Ok(None)` on load, not an error;
/// `NotFound` is for host lookups that require the blob to exist.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Scene not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Store error: {0}")]
    Other(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future for async operations, keeping backends runtime-agnostic.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A store holding one opaque scene blob per subject.
///
/// Saves are idempotent overwrites. `load` returns `None` when the subject
/// has no prior state; the bridge maps that to an empty scene rather than
/// an error.
pub trait SceneStore: Send + Sync {
    /// Persist `blob` as the latest scene for `subject`.
    fn save(&self, subject: &str, blob: &str) -> BoxFuture<'_, StoreResult<()>>;

    /// Fetch the latest blob for `subject`, or `None`.
    fn load(&self, subject: &str) -> BoxFuture<'_, StoreResult<Option<String>>>;
}
