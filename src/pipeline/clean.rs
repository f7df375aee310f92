// src/pipeline/clean.rs

//! Offline repair of the persisted seen set.
//!
//! Historical runs let query strings leak into stored identifiers, leaving
//! the same listing recorded under several keys. This one-shot command
//! normalizes every stored identifier to its query-free form, drops the
//! resulting duplicates, and rewrites the file. It is never invoked by the
//! detection pipeline, which normalizes at extraction time.

use std::collections::HashSet;

use crate::error::Result;
use crate::storage::{JsonSeenStore, SeenStore};
use crate::utils::url::strip_query;

/// Summary of a clean run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanOutcome {
    /// Entries in the file before cleaning
    pub before: usize,
    /// Entries after normalization and deduplication
    pub after: usize,
}

impl CleanOutcome {
    /// Number of entries removed.
    pub fn removed(&self) -> usize {
        self.before - self.after
    }
}

/// Normalize and deduplicate the seen file in place.
pub async fn run_clean(store: &JsonSeenStore) -> Result<CleanOutcome> {
    let raw = store.load_raw().await?;
    let before = raw.len();

    let cleaned: HashSet<String> = raw
        .iter()
        .map(|id| strip_query(id).to_string())
        .filter(|id| !id.is_empty())
        .collect();
    let after = cleaned.len();

    store.save(&cleaned).await?;

    log::info!("Seen file cleaned: {before} entries -> {after}");
    Ok(CleanOutcome { before, after })
}
