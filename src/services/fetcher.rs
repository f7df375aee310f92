// src/services/fetcher.rs

//! Page snapshot acquisition.

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::WatcherConfig;
use crate::utils::http;

/// Collaborator contract for acquiring a rendered page snapshot.
///
/// Implementations guarantee that the returned HTML reflects the settled
/// page state (for backends that execute scripts, after rendering has
/// finished) and that any underlying resource is released before
/// returning, on success and failure alike.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page at `url` and return its HTML.
    async fn fetch_rendered(&self, url: &str) -> Result<String>;
}

/// HTTP-based fetcher.
///
/// The client is owned by the fetcher, so connection resources follow
/// normal drop semantics on every exit path.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher with the configured user agent and timeout.
    pub fn new(config: &WatcherConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_rendered(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::fetch(url, e))?;

        let response = response
            .error_for_status()
            .map_err(|e| AppError::fetch(url, e))?;

        response.text().await.map_err(|e| AppError::fetch(url, e))
    }
}
