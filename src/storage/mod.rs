//! Storage abstractions for the seen-listing set.
//!
//! The seen set is a persisted record of every listing identifier that was
//! successfully announced. It grows monotonically; identifiers are only
//! ever removed by the offline `clean` maintenance command.

pub mod local;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use local::JsonSeenStore;

/// Trait for seen-set storage backends.
#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Load the persisted seen set.
    ///
    /// An absent or unparsable backing file loads as an empty set;
    /// corruption is non-fatal and self-heals on the next save.
    async fn load(&self) -> Result<HashSet<String>>;

    /// Persist the full seen set, overwriting prior contents.
    async fn save(&self, seen: &HashSet<String>) -> Result<()>;
}
