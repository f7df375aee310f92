// src/services/notifier.rs

//! Alert delivery to Discord.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{DiscordConfig, Listing};

/// Discord REST API base.
const API_BASE: &str = "https://discord.com/api/v10";

/// Discord caps embed titles at 256 characters; keep room for the prefix.
const TITLE_BUDGET: usize = 200;

/// Collaborator contract for announcing a matched listing.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce a single listing. Errors are per-candidate: the pipeline
    /// logs them and continues with sibling candidates.
    async fn notify(&self, listing: &Listing) -> Result<()>;
}

/// Notifier posting rich embeds to a Discord channel via the REST API.
pub struct DiscordNotifier {
    client: reqwest::Client,
    token: String,
    channel_id: u64,
}

impl DiscordNotifier {
    /// Create a notifier for the configured channel.
    pub fn new(config: &DiscordConfig) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            token: config.token.clone(),
            channel_id: config.channel_id,
        })
    }

    /// Verify the bot token against the API.
    ///
    /// Called once at startup so a bad credential fails the process with a
    /// clear message instead of failing every delivery.
    pub async fn validate_token(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{API_BASE}/users/@me"))
            .header("Authorization", format!("Bot {}", self.token))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Err(AppError::auth("invalid Discord bot token")),
            status => Err(AppError::auth(format!(
                "token validation failed with status {status}"
            ))),
        }
    }

    /// Truncate a title to the embed budget, marking the cut with an ellipsis.
    fn truncate_title(title: &str) -> String {
        if title.chars().count() <= TITLE_BUDGET {
            return title.to_string();
        }
        let cut: String = title.chars().take(TITLE_BUDGET).collect();
        format!("{cut}...")
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, listing: &Listing) -> Result<()> {
        let body = json!({
            "embeds": [{
                "title": format!("New bundle: {}", Self::truncate_title(&listing.title)),
                "url": listing.url,
                "description": "A new bundle matching your keywords was found!",
                "color": 0x00FF00,
                "thumbnail": { "url": "https://www.humblebundle.com/favicon.ico" },
                "footer": { "text": format!("ID: {}", listing.machine_name) },
            }]
        });

        let response = self
            .client
            .post(format!(
                "{API_BASE}/channels/{}/messages",
                self.channel_id
            ))
            .header("Authorization", format!("Bot {}", self.token))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::delivery(&listing.machine_name, e))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Err(AppError::auth("invalid Discord bot token")),
            StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Err(AppError::delivery(
                &listing.machine_name,
                format!("cannot resolve channel {}", self.channel_id),
            )),
            status => Err(AppError::delivery(
                &listing.machine_name,
                format!("send failed with status {status}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_title_untouched() {
        assert_eq!(
            DiscordNotifier::truncate_title("Rust Programming"),
            "Rust Programming"
        );
    }

    #[test]
    fn test_title_at_budget_untouched() {
        let title = "a".repeat(TITLE_BUDGET);
        assert_eq!(DiscordNotifier::truncate_title(&title), title);
    }

    #[test]
    fn test_long_title_truncated_with_ellipsis() {
        let title = "a".repeat(TITLE_BUDGET + 50);
        let truncated = DiscordNotifier::truncate_title(&title);
        assert_eq!(truncated.chars().count(), TITLE_BUDGET + 3);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_truncation_is_char_safe() {
        let title = "ü".repeat(TITLE_BUDGET + 1);
        let truncated = DiscordNotifier::truncate_title(&title);
        assert_eq!(truncated.chars().count(), TITLE_BUDGET + 3);
    }
}
