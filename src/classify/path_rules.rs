use crate::config::{CompiledProfile, DefaultPolicy};
use url::Url;

/// Decides whether a normalized URL is crawl-worthy content
///
/// Rules are matched against the URL path, with `?query` appended when the
/// normalized URL kept one:
///
/// 1. Any allow pattern matches → content
/// 2. Any deny pattern matches → not content
/// 3. Otherwise the profile's explicit default policy decides
///
/// Unparsable input is never content.
pub fn is_content(normalized: &str, profile: &CompiledProfile) -> bool {
    let Some(target) = rule_target(normalized) else {
        return false;
    };

    if profile.allow.iter().any(|re| re.is_match(&target)) {
        return true;
    }

    if profile.deny.iter().any(|re| re.is_match(&target)) {
        return false;
    }

    profile.default_policy == DefaultPolicy::Allow
}

/// The string path rules are evaluated against: path plus optional query
pub(crate) fn rule_target(normalized: &str) -> Option<String> {
    let url = Url::parse(normalized).ok()?;
    Some(match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    })
}
