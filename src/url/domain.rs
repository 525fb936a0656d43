use crate::url::matcher::matches_domain;
use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use linkmap::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true when a normalized URL string lives on the target domain
///
/// Unparsable input (including the empty normalization sentinel) is never
/// internal.
pub fn is_internal(normalized: &str, domain_pattern: &str) -> bool {
    Url::parse(normalized)
        .ok()
        .and_then(|url| extract_domain(&url))
        .map(|host| matches_domain(domain_pattern, &host))
        .unwrap_or(false)
}
