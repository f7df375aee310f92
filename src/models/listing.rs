//! Listing candidate data structure.

use serde::{Deserialize, Serialize};

/// A candidate listing extracted from the marketplace page.
///
/// Candidates are ephemeral: they are rebuilt from scratch on every scrape
/// cycle. The `machine_name` is the dedup key and must stay stable across
/// repeated fetches of the same listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Listing {
    /// Canonical, query-string-free slug from the listing URL path
    pub machine_name: String,

    /// Human-readable title (anchor text, aria-label, or the slug itself)
    pub title: String,

    /// Fully-qualified link to the listing page
    pub url: String,
}

impl Listing {
    /// Text the keyword matcher runs against: title plus slug, lowercased,
    /// so keywords can hit either the visible title or the URL slug.
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {}",
            self.title.to_lowercase(),
            self.machine_name.to_lowercase()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_searchable_text_covers_title_and_slug() {
        let listing = Listing {
            machine_name: "rust-programming".to_string(),
            title: "Rust Programming".to_string(),
            url: "https://www.humblebundle.com/bundles/rust-programming".to_string(),
        };
        assert_eq!(
            listing.searchable_text(),
            "rust programming rust-programming"
        );
    }
}
