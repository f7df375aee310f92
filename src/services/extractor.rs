// src/services/extractor.rs

//! Link extraction from rendered listing pages.
//!
//! Scans every anchor on the page and keeps those pointing at actual
//! listing detail pages, producing candidate `Listing` records for the
//! detection pipeline.

use scraper::{Html, Selector};

use crate::models::Listing;
use crate::utils::url::{absolutize, machine_name};

/// Path substrings an href must contain to count as a listing link.
const CATEGORY_PREFIXES: [&str; 3] = ["/bundles/", "/software/", "/books/"];

/// Bare category index pages. These are navigation, not listings.
const NAV_PATHS: [&str; 4] = ["/bundles", "/books", "/software", "/games"];

/// Resolved names shorter than this are noise (icons, "..." links).
const MIN_TITLE_CHARS: usize = 3;

/// Extracts listing candidates from rendered page HTML.
pub struct LinkExtractor {
    origin: String,
    anchor_selector: Selector,
}

impl LinkExtractor {
    /// Create an extractor producing URLs under the given site origin.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            anchor_selector: Selector::parse("a[href]").expect("static selector"),
        }
    }

    /// Extract all candidate listings from a page snapshot.
    ///
    /// The same listing may appear more than once (thumbnail anchor plus
    /// title anchor); no deduplication happens here. Malformed HTML is
    /// parsed best-effort and simply yields fewer (or zero) candidates.
    pub fn extract(&self, html: &str) -> Vec<Listing> {
        let document = Html::parse_document(html);
        let mut listings = Vec::new();

        for anchor in document.select(&self.anchor_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };

            if !CATEGORY_PREFIXES.iter().any(|p| href.contains(p)) {
                continue;
            }

            // Whole-href comparison: "/bundles" is the index page,
            // "/bundles/some-bundle" is a listing.
            if NAV_PATHS.contains(&href) {
                continue;
            }

            let Some(machine_name) = machine_name(href) else {
                continue;
            };

            let title = Self::resolve_title(&anchor, &machine_name);
            if title.chars().count() < MIN_TITLE_CHARS {
                continue;
            }

            listings.push(Listing {
                url: absolutize(&self.origin, href),
                machine_name,
                title,
            });
        }

        listings
    }

    /// Visible text, falling back to aria-label, falling back to the slug.
    fn resolve_title(anchor: &scraper::ElementRef, machine_name: &str) -> String {
        let text: String = anchor.text().collect::<String>().trim().to_string();
        if !text.is_empty() {
            return text;
        }

        if let Some(label) = anchor.value().attr("aria-label") {
            let label = label.trim();
            if !label.is_empty() {
                return label.to_string();
            }
        }

        machine_name.to_string()
    }
}
