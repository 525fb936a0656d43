//! HTML parser for extracting links and titles
//!
//! This module handles parsing fetched documents to extract:
//! - Candidate links from the page's main content region, with anchor text
//! - Script-driven navigation targets (`onclick="location.href='...'"`)
//! - The cleaned page title
//!
//! Links are resolved to absolute URLs but not filtered by domain or content
//! policy; the coordinator does that.

use crate::config::CompiledProfile;
use crate::graph::MAX_ANCHOR_CHARS;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// Anchor text used when a link carries no text, title or image alt
pub const NO_TEXT_PLACEHOLDER: &str = "(no text)";

/// A candidate outbound link found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    /// Absolute URL, not yet normalized
    pub url: String,
    /// Anchor text, at most [`MAX_ANCHOR_CHARS`] characters
    pub anchor_text: String,
}

/// Extracts candidate links from the main content region of a document
///
/// # Link Extraction Rules
///
/// 1. The region is the first element matching a profile content selector
///    (tried in order), falling back to `<body>`, then the whole document
/// 2. Elements inside the region matching the profile's exclude selectors
///    are detached from a working copy, so they never contribute links
/// 3. `<a href>` links are collected, skipping:
///    - fragment-only hrefs
///    - `javascript:`, `mailto:`, `tel:` and `data:` hrefs
///    - anchors with a `download` attribute
/// 4. Elements with an `onclick` handler assigning a literal URL to
///    `location.href` (optionally `window.`-qualified) are collected too
///
/// **Note:** `rel="nofollow"` links are still collected; they are internal
/// links all the same.
///
/// # Example
///
/// ```no_run
/// use linkmap::config::{CompiledProfile, SiteProfile};
/// use linkmap::crawler::extract_links;
/// use scraper::Html;
/// use url::Url;
///
/// let profile = CompiledProfile::compile(&SiteProfile::blog_defaults("example.com")).unwrap();
/// let html = Html::parse_document(r#"<body><a href="/post">Post</a></body>"#);
/// let current = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(&html, &current, &profile);
/// assert_eq!(links[0].url, "https://example.com/post");
/// ```
pub fn extract_links(
    document: &Html,
    current_url: &Url,
    profile: &CompiledProfile,
) -> Vec<ExtractedLink> {
    let mut working = document.clone();
    let region_id = content_region(&working, &profile.content_selectors).id();

    let excluded: Vec<_> = working
        .tree
        .get(region_id)
        .and_then(ElementRef::wrap)
        .map(|region| {
            profile
                .exclude_selectors
                .iter()
                .flat_map(|selector| region.select(selector).map(|e| e.id()))
                .collect()
        })
        .unwrap_or_default();
    for id in excluded {
        if let Some(mut node) = working.tree.get_mut(id) {
            node.detach();
        }
    }

    let Some(region) = working.tree.get(region_id).and_then(ElementRef::wrap) else {
        return Vec::new();
    };

    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in region.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            let Some(href) = element.value().attr("href") else {
                continue;
            };

            if let Some(url) = resolve_link(href, current_url) {
                links.push(ExtractedLink {
                    url,
                    anchor_text: anchor_text(&element),
                });
            }
        }
    }

    if let (Ok(onclick_selector), Some(pattern)) = (Selector::parse("[onclick]"), onclick_pattern())
    {
        for element in region.select(&onclick_selector) {
            let Some(script) = element.value().attr("onclick") else {
                continue;
            };

            let Some(target) = pattern.captures(script).and_then(|c| c.get(1)) else {
                continue;
            };

            if let Some(url) = resolve_link(target.as_str(), current_url) {
                links.push(ExtractedLink {
                    url,
                    anchor_text: anchor_text(&element),
                });
            }
        }
    }

    links
}

/// Extracts the cleaned page title
///
/// Uses `<title>`, falling back to the first `<h1>`. Returns `None` when
/// neither yields any text after the profile's title cleanup.
pub fn extract_title(document: &Html, profile: &CompiledProfile) -> Option<String> {
    ["title", "h1"].iter().find_map(|tag| {
        let selector = Selector::parse(tag).ok()?;
        let raw: String = document.select(&selector).next()?.text().collect();
        let cleaned = profile.clean_title(&raw);
        (!cleaned.is_empty()).then_some(cleaned)
    })
}

/// Picks the element links are collected from
fn content_region<'a>(document: &'a Html, content_selectors: &[Selector]) -> ElementRef<'a> {
    content_selectors
        .iter()
        .find_map(|selector| document.select(selector).next())
        .or_else(|| {
            Selector::parse("body")
                .ok()
                .and_then(|body| document.select(&body).next())
        })
        .unwrap_or_else(|| document.root_element())
}

/// Visible text, then `title`, then `img[alt]`, then the placeholder
fn anchor_text(element: &ElementRef) -> String {
    let visible = collapse_whitespace(&element.text().collect::<String>());

    let text = if !visible.is_empty() {
        visible
    } else if let Some(title) = element
        .value()
        .attr("title")
        .map(collapse_whitespace)
        .filter(|t| !t.is_empty())
    {
        title
    } else if let Some(alt) = image_alt(element) {
        alt
    } else {
        NO_TEXT_PLACEHOLDER.to_string()
    };

    text.chars().take(MAX_ANCHOR_CHARS).collect()
}

fn image_alt(element: &ElementRef) -> Option<String> {
    let selector = Selector::parse("img[alt]").ok()?;
    element
        .select(&selector)
        .filter_map(|img| img.value().attr("alt"))
        .map(collapse_whitespace)
        .find(|alt| !alt.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `location.href = '<url>'`, optionally `window.`-qualified
fn onclick_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"(?:window\.)?location\.href\s*=\s*['"]([^'"]+)['"]"#).ok())
        .as_ref()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only references
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, current_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    match current_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
