/// Checks whether a host belongs to the profile's target domain
///
/// The profile domain is either a bare host (`example.com`), matched
/// exactly, or a wildcard (`*.example.com`), which also accepts the bare host
/// and any subdomain. A leading `www.` on the profile domain is ignored, since
/// normalized URLs never carry one.
///
/// # Examples
///
/// ```
/// use linkmap::url::matches_domain;
///
/// assert!(matches_domain("example.com", "example.com"));
/// assert!(matches_domain("www.example.com", "example.com"));
/// assert!(!matches_domain("example.com", "blog.example.com"));
/// assert!(matches_domain("*.example.com", "blog.example.com"));
/// ```
pub fn matches_domain(pattern: &str, host: &str) -> bool {
    let pattern = pattern.trim().to_lowercase();
    let host = host.to_lowercase();

    if let Some(base) = pattern.strip_prefix("*.") {
        let base = base.strip_prefix("www.").unwrap_or(base);
        host == base || host.ends_with(&format!(".{}", base))
    } else {
        let exact = pattern.strip_prefix("www.").unwrap_or(&pattern);
        host == exact
    }
}
