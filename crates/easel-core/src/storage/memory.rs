//! In-memory store implementation.

use super::{BoxFuture, SceneStore, StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory store for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SceneStore for MemoryStore {
    fn save(&self, subject: &str, blob: &str) -> BoxFuture<'_, StoreResult<()>> {
        let subject = subject.to_string();
        let blob = blob.to_string();
        Box::pin(async move {
            let mut blobs = self
                .blobs
                .write()
                .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))?;
            blobs.insert(subject, blob);
            Ok(())
        })
    }

    fn load(&self, subject: &str) -> BoxFuture<'_, StoreResult<Option<String>>> {
        let subject = subject.to_string();
        Box::pin(async move {
            let blobs = self
                .blobs
                .read()
                .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))?;
            Ok(blobs.get(&subject).cloned())
        })
    }
}
