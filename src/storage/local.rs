//! Local filesystem seen-set storage.
//!
//! The backing file is a single JSON array of identifier strings. Every
//! save is a full rewrite: the set stays small (hundreds to low thousands
//! of entries) and writes happen at most once per scrape cycle.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::SeenStore;

/// JSON-file seen-set storage backend.
#[derive(Clone)]
pub struct JsonSeenStore {
    path: PathBuf,
}

impl JsonSeenStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw identifier list, strictly.
    ///
    /// Unlike [`SeenStore::load`], a missing or corrupt file is an error
    /// here. Used by the offline `clean` command, where silently treating
    /// the file as empty would discard the data it is meant to repair.
    pub async fn load_raw(&self) -> Result<Vec<String>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::validation(format!(
                    "seen file not found: {}",
                    self.path.display()
                )));
            }
            Err(e) => return Err(AppError::Io(e)),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SeenStore for JsonSeenStore {
    async fn load(&self) -> Result<HashSet<String>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(HashSet::new());
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        match serde_json::from_slice::<Vec<String>>(&bytes) {
            Ok(ids) => Ok(ids.into_iter().collect()),
            Err(e) => {
                log::warn!(
                    "Seen file {} is corrupt ({e}); starting from an empty set",
                    self.path.display()
                );
                Ok(HashSet::new())
            }
        }
    }

    async fn save(&self, seen: &HashSet<String>) -> Result<()> {
        // Sorted output keeps the file diff-friendly across rewrites.
        let mut ids: Vec<&String> = seen.iter().collect();
        ids.sort();

        let bytes = serde_json::to_vec_pretty(&ids)?;
        self.write_bytes(&bytes).await
    }
}
