//! Compiled form of a site profile
//!
//! Regexes and CSS selectors are compiled once, before the crawl loop
//! starts, so that a bad pattern is a configuration error rather than a
//! per-page failure.

use crate::config::types::{DefaultPolicy, SiteProfile};
use crate::config::validation::validate;
use crate::ConfigError;
use regex::Regex;
use scraper::Selector;

/// A validated site profile with its patterns compiled
#[derive(Debug, Clone)]
pub struct CompiledProfile {
    /// The profile this was compiled from
    pub source: SiteProfile,

    pub content_selectors: Vec<Selector>,
    pub exclude_selectors: Vec<Selector>,
    pub title_cleanup: Vec<Regex>,
    pub allow: Vec<Regex>,
    pub deny: Vec<Regex>,
    pub default_policy: DefaultPolicy,
    /// Lowercased cushion phrases
    pub cushion_phrases: Vec<String>,
    pub exclude_url_patterns: Vec<Regex>,
}

impl CompiledProfile {
    /// Validates a profile and compiles every pattern it carries
    ///
    /// # Returns
    ///
    /// * `Ok(CompiledProfile)` - Ready to drive a crawl
    /// * `Err(ConfigError)` - The profile is invalid; no crawl may start
    pub fn compile(profile: &SiteProfile) -> Result<Self, ConfigError> {
        validate(profile)?;

        Ok(Self {
            source: profile.clone(),
            content_selectors: compile_selectors(&profile.extract.content_selectors)?,
            exclude_selectors: compile_selectors(&profile.extract.exclude_selectors)?,
            title_cleanup: compile_regexes(&profile.extract.title_cleanup)?,
            allow: compile_regexes(&profile.classify.allow)?,
            deny: compile_regexes(&profile.classify.deny)?,
            default_policy: profile.classify.default_policy,
            cushion_phrases: profile
                .classify
                .cushion_phrases
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            exclude_url_patterns: compile_regexes(&profile.classify.exclude_url_patterns)?,
        })
    }

    /// The target domain pattern
    pub fn domain(&self) -> &str {
        &self.source.site.domain
    }

    /// Query parameters preserved by normalization
    pub fn keep_query_params(&self) -> &[String] {
        &self.source.site.keep_query_params
    }

    /// Strips site-name suffixes and other noise from a raw document title
    pub fn clean_title(&self, raw: &str) -> String {
        let mut title = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        for pattern in &self.title_cleanup {
            title = pattern.replace_all(&title, "").into_owned();
        }
        title.trim().to_string()
    }
}

fn compile_regexes(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|e| ConfigError::InvalidRegex {
                pattern: pattern.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}

fn compile_selectors(selectors: &[String]) -> Result<Vec<Selector>, ConfigError> {
    selectors
        .iter()
        .map(|s| Selector::parse(s).map_err(|_| ConfigError::InvalidSelector(s.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> SiteProfile {
        SiteProfile::blog_defaults("example.com")
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let mut p = profile();
        p.classify.deny.push("([unclosed".to_string());
        let err = CompiledProfile::compile(&p).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegex { .. }));
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let mut p = profile();
        p.extract.content_selectors = vec!["div[".to_string()];
        let err = CompiledProfile::compile(&p).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSelector(_)));
    }

    #[test]
    fn test_clean_title_strips_site_suffix() {
        let compiled = CompiledProfile::compile(&profile()).unwrap();
        assert_eq!(compiled.clean_title("Best Coffee Grinders | My Blog"), "Best Coffee Grinders");
        assert_eq!(compiled.clean_title("Brewing Guide - My Blog"), "Brewing Guide");
        assert_eq!(compiled.clean_title("Real-time  tips"), "Real-time tips");
    }

    #[test]
    fn test_cushion_phrases_lowercased() {
        let mut p = profile();
        p.classify.cushion_phrases = vec!["  Leaving SITE ".to_string(), "".to_string()];
        let compiled = CompiledProfile::compile(&p).unwrap();
        assert_eq!(compiled.cushion_phrases, vec!["leaving site".to_string()]);
    }
}
