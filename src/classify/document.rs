use crate::classify::path_rules::rule_target;
use crate::config::CompiledProfile;
use scraper::{Html, Selector};
use std::fmt;

/// Why a fetched page was kept out of the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclusionReason {
    /// `<meta name="robots" content="noindex">` or equivalent
    NoIndex,
    /// Interstitial redirect page detected by its wording
    CushionPage,
    /// A profile URL pattern fired (e.g. media attachment pages)
    ProfileRule,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NoIndex => "noindex",
            Self::CushionPage => "cushion page",
            Self::ProfileRule => "profile exclusion rule",
        };
        f.write_str(label)
    }
}

/// Decides whether a fetched document must be discarded
///
/// Checks, in order: robots `noindex`, cushion-page phrases in the title or
/// body text, and the profile's URL exclusion patterns.
pub fn is_excluded_document(
    document: &Html,
    url: &str,
    profile: &CompiledProfile,
) -> Option<ExclusionReason> {
    if has_noindex(document) {
        return Some(ExclusionReason::NoIndex);
    }

    if !profile.cushion_phrases.is_empty() && is_cushion_page(document, &profile.cushion_phrases) {
        return Some(ExclusionReason::CushionPage);
    }

    if let Some(target) = rule_target(url) {
        if profile
            .exclude_url_patterns
            .iter()
            .any(|re| re.is_match(&target))
        {
            return Some(ExclusionReason::ProfileRule);
        }
    }

    None
}

fn has_noindex(document: &Html) -> bool {
    let Ok(selector) = Selector::parse("meta[name][content]") else {
        return false;
    };

    document.select(&selector).any(|meta| {
        let name = meta.value().attr("name").unwrap_or("").to_ascii_lowercase();
        let content = meta
            .value()
            .attr("content")
            .unwrap_or("")
            .to_ascii_lowercase();
        (name == "robots" || name == "googlebot") && content.contains("noindex")
    })
}

fn is_cushion_page(document: &Html, phrases: &[String]) -> bool {
    let mut text = String::new();

    if let Ok(title) = Selector::parse("title") {
        for element in document.select(&title) {
            text.extend(element.text());
            text.push(' ');
        }
    }

    if let Ok(body) = Selector::parse("body") {
        for element in document.select(&body) {
            text.extend(element.text());
        }
    }

    let text = text.to_lowercase();
    phrases.iter().any(|phrase| text.contains(phrase.as_str()))
}
