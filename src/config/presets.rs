//! Built-in profile for typical blog/CMS sites
//!
//! These tables describe the common shape of a blog: posts at single-segment
//! slugs, category archives with pagination, and the usual administrative
//! and utility paths that carry no content. Allow rules win over deny rules,
//! so plain slugs are left to the default policy; a catch-all slug rule
//! would shadow single-segment deny rules such as `/contact` or `/go-*`.

use crate::config::types::{
    ClassifyConfig, CrawlerConfig, DefaultPolicy, ExtractConfig, SiteConfig, SiteProfile,
    UserAgentConfig,
};

const CONTENT_SELECTORS: &[&str] = &[
    "article .entry-content",
    ".entry-content",
    ".post-content",
    "article",
    "main",
    "#content",
];

const EXCLUDE_SELECTORS: &[&str] = &[
    "nav",
    "header",
    "footer",
    "aside",
    ".sidebar",
    "#sidebar",
    ".widget",
    ".breadcrumb",
    ".breadcrumbs",
    ".share",
    ".sns-share",
    ".social-share",
    ".related-posts",
    ".related",
    ".post-navigation",
    ".author-box",
    "#comments",
];

const ALLOW: &[&str] = &[
    r"^/$",
    r"^/category/[^/?]+$",
    r"^/category/[^/?]+/page/\d+$",
];

const DENY: &[&str] = &[
    r"^/wp-admin",
    r"^/wp-login",
    r"^/wp-json",
    r"^/wp-content/",
    r"^/wp-includes/",
    r"/feed$",
    r"/feed/",
    r"^/tag/",
    r"^/author/",
    r"^/\d{4}/\d{2}(/\d{2})?$",
    r"(?i)/(contact|privacy|privacy-policy|terms|sitemap)(/|$)",
    r"(?i)\.(jpe?g|png|gif|webp|svg|pdf|zip|css|js|xml|txt|mp4|mp3)$",
    r"[?&](utm_[a-z]+|fbclid|gclid|replytocom|share)=",
    r"(?i)/(cushion|redirect|out)(/|$)",
    r"^/go-",
    r"/page/\d+$",
];

const TITLE_CLEANUP: &[&str] = &[r"\s*[|｜]\s*[^|｜]+$", r"\s+[\-–—]\s+[^\-–—]+$"];

const CUSHION_PHRASES: &[&str] = &[
    "you are being redirected",
    "you are now leaving",
    "you are leaving this site",
    "redirecting to",
    "リダイレクトしています",
];

const EXCLUDE_URL_PATTERNS: &[&str] = &[r"-\d+x\d+$", r"/attachment/"];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl SiteProfile {
    /// Returns a profile for a conventional blog hosted at `domain`
    ///
    /// # Example
    ///
    /// ```
    /// use linkmap::config::SiteProfile;
    ///
    /// let profile = SiteProfile::blog_defaults("example.com");
    /// assert_eq!(profile.site.base_url.as_deref(), Some("https://example.com/"));
    /// ```
    pub fn blog_defaults(domain: &str) -> Self {
        let host = domain.trim_start_matches("*.");
        Self {
            site: SiteConfig {
                domain: domain.to_string(),
                base_url: Some(format!("https://{}/", host)),
                keep_query_params: vec!["p".to_string(), "page_id".to_string()],
                sitemap_paths: vec!["/sitemap.xml".to_string(), "/sitemap_index.xml".to_string()],
                sitemap_from_robots: true,
            },
            extract: ExtractConfig {
                content_selectors: owned(CONTENT_SELECTORS),
                exclude_selectors: owned(EXCLUDE_SELECTORS),
                title_cleanup: owned(TITLE_CLEANUP),
            },
            classify: ClassifyConfig {
                allow: owned(ALLOW),
                deny: owned(DENY),
                default_policy: DefaultPolicy::Allow,
                cushion_phrases: owned(CUSHION_PHRASES),
                exclude_url_patterns: owned(EXCLUDE_URL_PATTERNS),
            },
            crawler: CrawlerConfig::default(),
            user_agent: UserAgentConfig::default(),
        }
    }
}
