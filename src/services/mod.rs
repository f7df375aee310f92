//! Service layer for the watcher application.
//!
//! This module contains the business logic for:
//! - Anchor extraction from page snapshots (`LinkExtractor`)
//! - Whole-word keyword matching (`KeywordMatcher`)
//! - Page snapshot acquisition (`PageFetcher` / `HttpFetcher`)
//! - Alert delivery (`Notifier` / `DiscordNotifier`)

mod extractor;
mod fetcher;
mod matcher;
mod notifier;

pub use extractor::LinkExtractor;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use matcher::KeywordMatcher;
pub use notifier::{DiscordNotifier, Notifier};
