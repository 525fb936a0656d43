use url::Url;

/// Normalizes a URL into the comparable key used throughout a crawl
///
/// # Normalization Steps
///
/// 1. Resolve the reference against `base` (absolute references pass through)
/// 2. Reject anything that is not HTTP(S) or has no host
/// 3. Enforce HTTPS: Convert http:// to https://
/// 4. Lowercase the host and remove the www. prefix
/// 5. Normalize path:
///    - Remove dot segments (. and ..) and duplicate separators
///    - Remove trailing slash (except for root /)
///    - Empty path becomes /
/// 6. Remove fragment (everything after #)
/// 7. Drop every query parameter not listed in `keep_params`, sort the rest
///
/// Unusable input yields an empty string rather than an error; callers
/// treat `""` as "reject silently".
///
/// # Examples
///
/// ```
/// use linkmap::url::normalize_url;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/").unwrap();
/// assert_eq!(
///     normalize_url("http://WWW.EXAMPLE.COM/page/", &base, &[]),
///     "https://example.com/page"
/// );
/// assert_eq!(normalize_url("mailto:someone@example.com", &base, &[]), "");
/// ```
pub fn normalize_url(raw: &str, base: &Url, keep_params: &[String]) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    let Ok(mut url) = base.join(raw) else {
        return String::new();
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return String::new();
    }

    if url.scheme() == "http" && url.set_scheme("https").is_err() {
        return String::new();
    }

    let Some(host) = url.host_str() else {
        return String::new();
    };
    let mut normalized_host = host.to_lowercase();
    if let Some(stripped) = normalized_host.strip_prefix("www.") {
        normalized_host = stripped.to_string();
    }
    if normalized_host.is_empty() || url.set_host(Some(&normalized_host)).is_err() {
        return String::new();
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let kept = filter_and_sort_query_params(&url, keep_params);
        url.set_query(None);
        if !kept.is_empty() {
            url.query_pairs_mut().extend_pairs(kept.iter());
        }
    }

    url.to_string()
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut normalized_segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            // Skip empty segments (from multiple slashes) and current directory markers
            "" | "." => continue,
            ".." => {
                normalized_segments.pop();
            }
            _ => normalized_segments.push(segment),
        }
    }

    if normalized_segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", normalized_segments.join("/"))
}

/// Keeps only whitelisted query parameters, sorted by key
fn filter_and_sort_query_params(url: &Url, keep_params: &[String]) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| keep_params.iter().any(|k| k == key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort();
    params
}
