// src/utils/url.rs

//! URL manipulation utilities.

/// Strip the query string and fragment from an href.
pub fn strip_query(href: &str) -> &str {
    let end = href.find(['?', '#']).unwrap_or(href.len());
    &href[..end]
}

/// Derive the canonical machine name from a listing href.
///
/// The machine name is the final `/`-delimited path segment, with any query
/// string or fragment stripped first. Query parameters are volatile tracking
/// noise and must never leak into the dedup key.
///
/// # Examples
/// ```
/// use bundlewatch::utils::url::machine_name;
///
/// assert_eq!(
///     machine_name("/bundles/rust-programming?hmb_source=nav"),
///     Some("rust-programming".to_string())
/// );
/// ```
pub fn machine_name(href: &str) -> Option<String> {
    let path = strip_query(href).trim_end_matches('/');
    let segment = path.rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    Some(segment.to_string())
}

/// Build an absolute listing URL from the site origin and an href.
pub fn absolutize(origin: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    format!("{}{}", origin.trim_end_matches('/'), href)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_name_plain_path() {
        assert_eq!(
            machine_name("/bundles/rust-programming"),
            Some("rust-programming".to_string())
        );
    }

    #[test]
    fn test_machine_name_strips_query() {
        assert_eq!(
            machine_name("/bundles/rust-programming?hmb_source=navbar&hmb_medium=tile"),
            Some("rust-programming".to_string())
        );
    }

    #[test]
    fn test_machine_name_strips_fragment() {
        assert_eq!(
            machine_name("/software/great-c++-tools#details"),
            Some("great-c++-tools".to_string())
        );
    }

    #[test]
    fn test_machine_name_trailing_slash() {
        assert_eq!(
            machine_name("/bundles/dragon-saga/"),
            Some("dragon-saga".to_string())
        );
    }

    #[test]
    fn test_machine_name_empty() {
        assert_eq!(machine_name(""), None);
        assert_eq!(machine_name("/"), None);
    }

    #[test]
    fn test_absolutize_relative() {
        assert_eq!(
            absolutize("https://www.humblebundle.com", "/bundles/rust-programming"),
            "https://www.humblebundle.com/bundles/rust-programming"
        );
    }

    #[test]
    fn test_absolutize_trailing_origin_slash() {
        assert_eq!(
            absolutize("https://www.humblebundle.com/", "/bundles/x"),
            "https://www.humblebundle.com/bundles/x"
        );
    }

    #[test]
    fn test_absolutize_already_absolute() {
        assert_eq!(
            absolutize("https://www.humblebundle.com", "https://other.com/x"),
            "https://other.com/x"
        );
    }
}
