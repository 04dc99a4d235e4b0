//! Filesystem-backed store for native platforms.

use super::{BoxFuture, SceneStore, StoreError, StoreResult};
use std::fs;
use std::path::PathBuf;

/// Filesystem store: one JSON blob per subject under a base directory.
pub struct FsStore {
    /// Base directory for scene blobs.
    base_path: PathBuf,
}

impl FsStore {
    /// Create a store rooted at the given directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StoreResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StoreError::Io(format!("Failed to create store directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create a store in the default location.
    ///
    /// On Unix: `~/.easel/scenes/`
    /// On Windows: `%APPDATA%\easel\scenes\`
    pub fn default_location() -> StoreResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StoreError::Io("Could not determine home directory".to_string()))?;

        let path = base.join("easel").join("scenes");
        Self::new(path)
    }

    /// Get the file path for a subject id.
    fn blob_path(&self, subject: &str) -> PathBuf {
        // Sanitize the subject to be safe for filenames
        let safe: String = subject
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_path.join(format!("{}.json", safe))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

impl SceneStore for FsStore {
    fn save(&self, subject: &str, blob: &str) -> BoxFuture<'_, StoreResult<()>> {
        let path = self.blob_path(subject);
        let blob = blob.to_string();

        Box::pin(async move {
            fs::write(&path, blob)
                .map_err(|e| StoreError::Io(format!("Failed to write {}: {}", path.display(), e)))
        })
    }

    fn load(&self, subject: &str) -> BoxFuture<'_, StoreResult<Option<String>>> {
        let path = self.blob_path(subject);

        Box::pin(async move {
            if !path.exists() {
                return Ok(None);
            }

            let blob = fs::read_to_string(&path)
                .map_err(|e| StoreError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
            Ok(Some(blob))
        })
    }
}
