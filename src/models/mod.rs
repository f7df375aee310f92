// src/models/mod.rs

//! Domain models for the watcher application.

mod config;
mod listing;

// Re-export all public types
pub use config::{Config, DiscordConfig, StorageConfig, WatcherConfig};
pub use listing::Listing;
