//! Link graph data model and rank ordering
//!
//! A crawl run produces a [`CrawlResult`]: the pages it recorded and the
//! deduplicated edges between them. [`LinkGraph`] turns that into a
//! rank-ordered view (most linked-to page first) used by every exporter.

mod builder;

pub use builder::{
    apply_redirects, finalize_inbound_counts, inbound_counts, LinkGraph, RankedPage,
};

/// Maximum anchor text length kept on an edge (characters)
pub const MAX_ANCHOR_CHARS: usize = 100;

/// A content page recorded during a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Normalized URL; unique within a run
    pub url: String,

    /// Document title with site-name noise stripped
    pub title: String,

    /// Targets of this page's edges, in discovery order
    pub outbound_links: Vec<String>,

    /// Distinct internal sources linking here; set by [`finalize_inbound_counts`]
    pub inbound_count: usize,
}

impl Page {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            outbound_links: Vec::new(),
            inbound_count: 0,
        }
    }
}

/// A directed internal link between two pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub source: String,
    pub target: String,
    /// Anchor text, at most [`MAX_ANCHOR_CHARS`] characters
    pub anchor_text: String,
    /// Title of the source page when the link was extracted
    pub source_title: String,
}

/// How a crawl run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlOutcome {
    /// Frontier exhausted or page limit reached
    Completed,
    /// Stopped by an external cancellation request
    Aborted,
}

impl CrawlOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }
}

/// Per-run counters, returned with the result instead of kept globally
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Seed URLs the frontier started with
    pub seeds: usize,
    /// Successful HTTP fetches
    pub fetched: usize,
    /// Fetches that failed (network, status, content type)
    pub failed: usize,
    /// Fetched documents excluded by classification
    pub excluded: usize,
    /// Extracted links dropped by domain or content policy
    pub links_rejected: usize,
    /// Extracted links collapsed onto an existing edge
    pub duplicate_links: usize,
    /// Wall-clock duration of the crawl loop
    pub elapsed_ms: u128,
}

/// Everything a crawl run produced
///
/// A result is always internally consistent, including after cancellation:
/// every edge's source is a recorded page and no `(source, target)` pair
/// repeats.
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Normalized URL the crawl started from
    pub base_url: String,
    /// Pages in the order they were recorded
    pub pages: Vec<Page>,
    /// Edges in the order they were registered
    pub edges: Vec<Link>,
    pub outcome: CrawlOutcome,
    pub stats: CrawlStats,
}

impl CrawlResult {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            pages: Vec::new(),
            edges: Vec::new(),
            outcome: CrawlOutcome::Completed,
            stats: CrawlStats::default(),
        }
    }

    /// Looks up a recorded page by normalized URL
    pub fn page(&self, url: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.url == url)
    }
}
