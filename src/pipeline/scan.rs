// src/pipeline/scan.rs

//! The detection pipeline.
//!
//! One cycle fetches a rendered snapshot of the listings page, extracts
//! candidate listings, drops the already-seen ones, matches the rest
//! against the configured keywords, announces every match, and persists
//! the seen set iff at least one identifier was added.
//!
//! Identifiers enter the seen set only after a successful delivery, so
//! "seen" always implies "previously announced" and failed deliveries are
//! retried on the next cycle.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;

use crate::error::Result;
use crate::models::Config;
use crate::services::{KeywordMatcher, LinkExtractor, Notifier, PageFetcher};
use crate::storage::SeenStore;

/// Summary of one scrape cycle.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Candidate listings extracted from the page (duplicates included)
    pub candidates: usize,
    /// Candidates skipped because their identifier was already seen
    pub already_seen: usize,
    /// New candidates that matched a keyword
    pub matched: usize,
    /// Alerts successfully delivered
    pub notified: usize,
    /// Alerts that failed to deliver (retried next cycle)
    pub delivery_failures: usize,
    /// Whether the seen set was written this cycle
    pub persisted: bool,
}

/// The detection pipeline and its exclusively-owned seen set.
///
/// Cycles run strictly one at a time: `run` awaits each cycle to completion
/// before the interval schedules the next, so no locking is needed around
/// the seen set.
pub struct Watcher {
    config: Arc<Config>,
    extractor: LinkExtractor,
    matcher: KeywordMatcher,
    fetcher: Arc<dyn PageFetcher>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn SeenStore>,
    seen: HashSet<String>,
}

impl Watcher {
    /// Build the pipeline and load the persisted seen set.
    pub async fn new(
        config: Arc<Config>,
        fetcher: Arc<dyn PageFetcher>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn SeenStore>,
    ) -> Result<Self> {
        let extractor = LinkExtractor::new(config.watcher.origin.clone());
        let matcher = KeywordMatcher::new(&config.watcher.keywords)?;
        let seen = store.load().await?;

        log::info!(
            "Watcher ready: {} keywords, {} listings already seen",
            matcher.len(),
            seen.len()
        );

        Ok(Self {
            config,
            extractor,
            matcher,
            fetcher,
            notifier,
            store,
            seen,
        })
    }

    /// Number of identifiers currently in the in-memory seen set.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Run a single detection cycle.
    ///
    /// Fetch failures abort the cycle with an error; delivery failures are
    /// per-candidate and never stop sibling candidates.
    pub async fn scan_once(&mut self) -> Result<ScanOutcome> {
        let started_at = Utc::now();
        let page_url = &self.config.watcher.page_url;
        log::info!("Scanning {page_url}");

        let html = self.fetcher.fetch_rendered(page_url).await?;
        let candidates = self.extractor.extract(&html);

        let mut outcome = ScanOutcome {
            candidates: candidates.len(),
            ..ScanOutcome::default()
        };

        let mut newly_added = 0usize;

        for listing in &candidates {
            if self.seen.contains(&listing.machine_name) {
                outcome.already_seen += 1;
                continue;
            }

            let Some(keyword) = self.matcher.find_match(&listing.searchable_text()) else {
                continue;
            };
            outcome.matched += 1;

            log::info!(
                "Match on '{keyword}': {} ({})",
                listing.title,
                listing.machine_name
            );

            match self.notifier.notify(listing).await {
                Ok(()) => {
                    self.seen.insert(listing.machine_name.clone());
                    newly_added += 1;
                    outcome.notified += 1;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    outcome.delivery_failures += 1;
                    log::warn!("Delivery failed, will retry next cycle: {e}");
                }
            }
        }

        if newly_added > 0 {
            self.store.save(&self.seen).await?;
            outcome.persisted = true;
        }

        let elapsed = Utc::now() - started_at;
        log::info!(
            "Cycle done in {}s: {} candidates, {} already seen, {} matched, {} notified, {} failed{}",
            elapsed.num_seconds(),
            outcome.candidates,
            outcome.already_seen,
            outcome.matched,
            outcome.notified,
            outcome.delivery_failures,
            if outcome.persisted { ", seen set saved" } else { "" }
        );

        Ok(outcome)
    }

    /// Run the pipeline on its configured interval, forever.
    ///
    /// A failed cycle is logged and the next one proceeds on schedule; only
    /// fatal errors (configuration, authentication) propagate out.
    pub async fn run(&mut self) -> Result<()> {
        let period = Duration::from_secs(self.config.watcher.interval_hours * 3600);
        let mut interval = tokio::time::interval(period);
        // A long cycle must delay the next tick, not stack ticks behind it.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match self.scan_once().await {
                Ok(_) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => log::error!("Scan cycle aborted: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::AppError;
    use crate::models::{DiscordConfig, Listing, StorageConfig, WatcherConfig};

    struct MockFetcher {
        html: String,
    }

    #[async_trait]
    impl PageFetcher for MockFetcher {
        async fn fetch_rendered(&self, _url: &str) -> Result<String> {
            Ok(self.html.clone())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl PageFetcher for FailingFetcher {
        async fn fetch_rendered(&self, url: &str) -> Result<String> {
            Err(AppError::fetch(url, "browser launch failed"))
        }
    }

    #[derive(Default)]
    struct MockNotifier {
        sent: Mutex<Vec<String>>,
        fail_for: HashSet<String>,
    }

    #[async_trait]
    impl Notifier for MockNotifier {
        async fn notify(&self, listing: &Listing) -> Result<()> {
            if self.fail_for.contains(&listing.machine_name) {
                return Err(AppError::delivery(&listing.machine_name, "send failed"));
            }
            self.sent.lock().unwrap().push(listing.machine_name.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockStore {
        initial: HashSet<String>,
        saves: Mutex<Vec<HashSet<String>>>,
    }

    #[async_trait]
    impl SeenStore for MockStore {
        async fn load(&self) -> Result<HashSet<String>> {
            Ok(self.initial.clone())
        }

        async fn save(&self, seen: &HashSet<String>) -> Result<()> {
            self.saves.lock().unwrap().push(seen.clone());
            Ok(())
        }
    }

    fn test_config(keywords: &[&str]) -> Arc<Config> {
        Arc::new(Config {
            discord: DiscordConfig {
                token: "test-token".to_string(),
                channel_id: 1,
            },
            watcher: WatcherConfig {
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                ..WatcherConfig::default()
            },
            storage: StorageConfig::default(),
        })
    }

    const SCENARIO_PAGE: &str = r#"
        <html><body>
            <a href="/bundles">Bundles</a>
            <a href="/bundles/rust-programming">Rust Programming</a>
            <a href="/bundles/dragon-saga">Dragon Saga</a>
            <a href="/software/great-c++-tools">Great C++ Tools</a>
        </body></html>
    "#;

    async fn watcher_for(
        html: &str,
        keywords: &[&str],
        notifier: Arc<MockNotifier>,
        store: Arc<MockStore>,
    ) -> Watcher {
        let fetcher = Arc::new(MockFetcher {
            html: html.to_string(),
        });
        Watcher::new(test_config(keywords), fetcher, notifier, store)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let notifier = Arc::new(MockNotifier::default());
        let store = Arc::new(MockStore::default());
        let mut watcher = watcher_for(
            SCENARIO_PAGE,
            &["rust", "c++"],
            Arc::clone(&notifier),
            Arc::clone(&store),
        )
        .await;

        let outcome = watcher.scan_once().await.unwrap();

        assert_eq!(outcome.matched, 2);
        assert_eq!(outcome.notified, 2);
        assert!(outcome.persisted);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(
            *sent,
            vec!["rust-programming".to_string(), "great-c++-tools".to_string()]
        );

        let saves = store.saves.lock().unwrap();
        assert_eq!(saves.len(), 1);
        let persisted = &saves[0];
        assert_eq!(persisted.len(), 2);
        assert!(persisted.contains("rust-programming"));
        assert!(persisted.contains("great-c++-tools"));
        assert!(!persisted.contains("dragon-saga"));
    }

    #[tokio::test]
    async fn test_idempotence_second_scan_is_silent() {
        let notifier = Arc::new(MockNotifier::default());
        let store = Arc::new(MockStore::default());
        let mut watcher = watcher_for(
            SCENARIO_PAGE,
            &["rust", "c++"],
            Arc::clone(&notifier),
            Arc::clone(&store),
        )
        .await;

        watcher.scan_once().await.unwrap();
        let second = watcher.scan_once().await.unwrap();

        assert_eq!(second.notified, 0);
        assert_eq!(second.matched, 0);
        assert!(!second.persisted);
        assert_eq!(notifier.sent.lock().unwrap().len(), 2);
        // Only the first cycle wrote
        assert_eq!(store.saves.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_write_avoidance_on_no_match_cycle() {
        let notifier = Arc::new(MockNotifier::default());
        let store = Arc::new(MockStore::default());
        let mut watcher = watcher_for(
            SCENARIO_PAGE,
            &["haskell"],
            Arc::clone(&notifier),
            Arc::clone(&store),
        )
        .await;

        let outcome = watcher.scan_once().await.unwrap();

        assert_eq!(outcome.matched, 0);
        assert!(!outcome.persisted);
        assert_eq!(store.saves.lock().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_failed_delivery_is_not_persisted() {
        let notifier = Arc::new(MockNotifier {
            sent: Mutex::new(Vec::new()),
            fail_for: HashSet::from(["rust-programming".to_string()]),
        });
        let store = Arc::new(MockStore::default());
        let mut watcher = watcher_for(
            SCENARIO_PAGE,
            &["rust", "c++"],
            Arc::clone(&notifier),
            Arc::clone(&store),
        )
        .await;

        let outcome = watcher.scan_once().await.unwrap();

        // The sibling candidate still went out and was persisted.
        assert_eq!(outcome.delivery_failures, 1);
        assert_eq!(outcome.notified, 1);
        assert!(outcome.persisted);

        let saves = store.saves.lock().unwrap();
        assert_eq!(saves.len(), 1);
        assert!(!saves[0].contains("rust-programming"));
        assert!(saves[0].contains("great-c++-tools"));
    }

    #[tokio::test]
    async fn test_failed_delivery_retried_next_cycle() {
        let notifier = Arc::new(MockNotifier {
            sent: Mutex::new(Vec::new()),
            fail_for: HashSet::from(["rust-programming".to_string()]),
        });
        let store = Arc::new(MockStore::default());
        let mut watcher = watcher_for(
            SCENARIO_PAGE,
            &["rust"],
            Arc::clone(&notifier),
            Arc::clone(&store),
        )
        .await;

        let first = watcher.scan_once().await.unwrap();
        assert_eq!(first.delivery_failures, 1);

        let second = watcher.scan_once().await.unwrap();
        assert_eq!(second.matched, 1);
        assert_eq!(second.delivery_failures, 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_cycle_without_persisting() {
        let notifier = Arc::new(MockNotifier::default());
        let store = Arc::new(MockStore::default());
        let mut watcher = Watcher::new(
            test_config(&["rust"]),
            Arc::new(FailingFetcher),
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            Arc::clone(&store) as Arc<dyn SeenStore>,
        )
        .await
        .unwrap();

        let err = watcher.scan_once().await.unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(store.saves.lock().unwrap().len(), 0);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_preloaded_seen_set_suppresses_alerts() {
        let notifier = Arc::new(MockNotifier::default());
        let store = Arc::new(MockStore {
            initial: HashSet::from(["rust-programming".to_string()]),
            saves: Mutex::new(Vec::new()),
        });
        let mut watcher = watcher_for(
            SCENARIO_PAGE,
            &["rust"],
            Arc::clone(&notifier),
            Arc::clone(&store),
        )
        .await;

        let outcome = watcher.scan_once().await.unwrap();

        assert_eq!(outcome.already_seen, 1);
        assert_eq!(outcome.notified, 0);
        assert!(!outcome.persisted);
    }

    #[tokio::test]
    async fn test_duplicate_anchors_dedup_to_one_alert() {
        let html = r#"
            <a href="/bundles/rust-programming"><img src="thumb.png"></a>
            <a href="/bundles/rust-programming">Rust Programming</a>
        "#;
        let notifier = Arc::new(MockNotifier::default());
        let store = Arc::new(MockStore::default());
        let mut watcher =
            watcher_for(html, &["rust"], Arc::clone(&notifier), Arc::clone(&store)).await;

        let outcome = watcher.scan_once().await.unwrap();

        assert_eq!(outcome.candidates, 2);
        assert_eq!(outcome.notified, 1);
        assert_eq!(outcome.already_seen, 1);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_substring_keyword_does_not_fire() {
        let html = r#"<a href="/bundles/dragon-saga">Dragon Saga Bundle</a>"#;
        let notifier = Arc::new(MockNotifier::default());
        let store = Arc::new(MockStore::default());
        let mut watcher =
            watcher_for(html, &["go"], Arc::clone(&notifier), Arc::clone(&store)).await;

        let outcome = watcher.scan_once().await.unwrap();
        assert_eq!(outcome.matched, 0);
    }
}
