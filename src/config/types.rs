use serde::Deserialize;

/// Site profile: the per-site crawl policy, supplied as data
///
/// A profile is read once at crawl start and never mutated. New sites are
/// added by writing a profile, not by changing the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteProfile {
    pub site: SiteConfig,

    #[serde(default)]
    pub extract: ExtractConfig,

    #[serde(default)]
    pub classify: ClassifyConfig,

    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

impl SiteProfile {
    /// The URL a crawl starts from: `base-url`, or the domain's https root
    pub fn start_url(&self) -> String {
        match &self.site.base_url {
            Some(base_url) => base_url.clone(),
            None => format!("https://{}/", self.site.domain.trim_start_matches("*.")),
        }
    }
}

/// Target site identification
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Domain pattern (e.g., "example.com" or "*.example.com")
    pub domain: String,

    /// Homepage the crawl starts from; may be overridden per run
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    /// Query parameters that carry content identity (e.g. "p" for `?p=123`)
    #[serde(rename = "keep-query-params", default)]
    pub keep_query_params: Vec<String>,

    /// Sitemap locations relative to the site origin
    #[serde(rename = "sitemap-paths", default = "default_sitemap_paths")]
    pub sitemap_paths: Vec<String>,

    /// Also follow `Sitemap:` lines found in /robots.txt
    #[serde(rename = "sitemap-from-robots", default)]
    pub sitemap_from_robots: bool,
}

/// Link extraction rules
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractConfig {
    /// CSS selectors for the main content region, tried in order
    #[serde(rename = "content-selectors", default)]
    pub content_selectors: Vec<String>,

    /// CSS selectors removed from the content region before link collection
    #[serde(rename = "exclude-selectors", default)]
    pub exclude_selectors: Vec<String>,

    /// Regexes stripped from page titles (site-name suffixes and the like)
    #[serde(rename = "title-cleanup", default)]
    pub title_cleanup: Vec<String>,
}

/// Content classification rules
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassifyConfig {
    /// Path regexes that mark a URL as content (checked first)
    #[serde(default)]
    pub allow: Vec<String>,

    /// Path regexes that mark a URL as non-content
    #[serde(default)]
    pub deny: Vec<String>,

    /// Verdict when neither list matches
    #[serde(rename = "default-policy", default)]
    pub default_policy: DefaultPolicy,

    /// Phrases identifying interstitial redirect ("cushion") pages
    #[serde(rename = "cushion-phrases", default)]
    pub cushion_phrases: Vec<String>,

    /// Path regexes that exclude a fetched page from the graph
    #[serde(rename = "exclude-url-patterns", default)]
    pub exclude_url_patterns: Vec<String>,
}

/// Verdict for URLs matched by neither the allow nor the deny list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultPolicy {
    #[default]
    Allow,
    Deny,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Hard cap on the number of pages recorded in one run
    #[serde(rename = "page-limit", default = "default_page_limit")]
    pub page_limit: usize,

    /// Politeness delay between fetches (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
            delay_ms: default_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "Linkmap".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

fn default_sitemap_paths() -> Vec<String> {
    vec!["/sitemap.xml".to_string()]
}

fn default_page_limit() -> usize {
    500
}

fn default_delay_ms() -> u64 {
    100
}

fn default_timeout_secs() -> u64 {
    15
}
