// src/services/matcher.rs

//! Whole-word keyword matching.
//!
//! A keyword only matches where the matched span is not immediately
//! adjacent to another lowercase letter. This keeps short keywords like
//! "go" from firing inside "dragon". Digits, punctuation, and whitespace
//! are all valid boundaries.

use regex::Regex;

use crate::error::{AppError, Result};

/// Compiled keyword set for whole-word matching.
pub struct KeywordMatcher {
    keywords: Vec<(String, Regex)>,
}

impl KeywordMatcher {
    /// Compile the configured keywords into whole-word patterns.
    ///
    /// Keywords are lowercased; characters like `+` and `#` are escaped so
    /// they match literally.
    pub fn new(keywords: &[String]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(keywords.len());

        for keyword in keywords {
            let keyword = keyword.trim().to_lowercase();
            let pattern = format!("(?:^|[^a-z]){}(?:[^a-z]|$)", regex::escape(&keyword));
            let regex = Regex::new(&pattern).map_err(|e| {
                AppError::validation(format!("keyword '{keyword}' cannot be compiled: {e}"))
            })?;
            compiled.push((keyword, regex));
        }

        Ok(Self { keywords: compiled })
    }

    /// Return the first configured keyword that matches, if any.
    pub fn find_match(&self, text: &str) -> Option<&str> {
        let text = text.to_lowercase();
        self.keywords
            .iter()
            .find(|(_, regex)| regex.is_match(&text))
            .map(|(keyword, _)| keyword.as_str())
    }

    /// Whether any configured keyword matches the text.
    pub fn is_match(&self, text: &str) -> bool {
        self.find_match(text).is_some()
    }

    /// Number of compiled keywords.
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Whether the keyword set is empty.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}
