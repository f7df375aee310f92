// src/error.rs

//! Unified error handling for the watcher application.

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid chat credential (fatal at startup)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Page snapshot could not be acquired (aborts the current cycle)
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Notification could not be delivered (per-candidate, recoverable)
    #[error("Delivery error for {context}: {message}")]
    Delivery { context: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create a fetch error with the URL as context.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a delivery error with context.
    pub fn delivery(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Delivery {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error must abort the process rather than the cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Auth(_))
    }
}
