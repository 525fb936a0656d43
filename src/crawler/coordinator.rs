//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop for one run, including:
//! - Seeding the frontier from the base URL and sitemaps
//! - Coordinating fetching, classification and link extraction
//! - Edge registration with per-pair deduplication
//! - Politeness delay and cooperative cancellation
//! - Finalizing inbound counts on the result

use crate::classify::{is_content, is_excluded_document};
use crate::config::{validate_base_url, CompiledProfile, SiteProfile};
use crate::crawler::cancel::CancellationFlag;
use crate::crawler::fetcher::{FetchResult, Fetcher, HttpFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{extract_links, extract_title};
use crate::crawler::seeds::generate_seeds;
use crate::crawler::status::{StatusSink, TracingSink};
use crate::graph::{
    apply_redirects, finalize_inbound_counts, CrawlOutcome, CrawlResult, Link, Page,
};
use crate::state::CrawlState;
use crate::url::{is_internal, normalize_url};
use crate::{ConfigError, LinkmapError};
use scraper::Html;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use url::Url;

/// Pages between two progress status messages
const PROGRESS_INTERVAL: usize = 10;

/// Main crawler coordinator structure
///
/// A coordinator drives exactly one run. Everything the run accumulates
/// (frontier, visited set, pages, edges, HTTP client) is owned here and
/// returned or dropped when the run ends.
pub struct Coordinator<F: Fetcher = HttpFetcher> {
    profile: CompiledProfile,
    base_url: Url,
    page_limit: usize,
    fetcher: F,
    status: Box<dyn StatusSink + Send + Sync>,
    cancel: CancellationFlag,
    state: CrawlState,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Arguments
    ///
    /// * `base_url` - Where the crawl starts; must be on the profile domain
    /// * `profile` - The site profile; compiled and validated here
    /// * `page_limit` - Hard cap on recorded pages (at least 1)
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(LinkmapError)` - Invalid profile, base URL or limit, or the HTTP
    ///   client could not be built
    pub fn new(base_url: &str, profile: &SiteProfile, page_limit: usize) -> Result<Self, LinkmapError> {
        let fetcher = HttpFetcher::new(profile)?;
        Self::with_fetcher(base_url, profile, page_limit, fetcher)
    }
}

impl<F: Fetcher> Coordinator<F> {
    /// Creates a coordinator around any [`Fetcher`]
    pub fn with_fetcher(
        base_url: &str,
        profile: &SiteProfile,
        page_limit: usize,
        fetcher: F,
    ) -> Result<Self, LinkmapError> {
        let profile = CompiledProfile::compile(profile)?;
        let base_url = validate_base_url(base_url, profile.domain())?;

        if page_limit == 0 {
            return Err(ConfigError::Validation("page limit must be at least 1".to_string()).into());
        }

        Ok(Self {
            profile,
            base_url,
            page_limit,
            fetcher,
            status: Box::new(TracingSink),
            cancel: CancellationFlag::new(),
            state: CrawlState::Idle,
        })
    }

    /// Replaces the status sink (default: [`TracingSink`])
    pub fn with_status<S>(mut self, sink: S) -> Self
    where
        S: StatusSink + Send + Sync + 'static,
    {
        self.status = Box::new(sink);
        self
    }

    /// Uses an externally owned cancellation flag
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// A handle that cancels this run when triggered
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Current lifecycle state
    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// The fetcher driving this run
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Runs the crawl loop to completion or cancellation
    ///
    /// This is the core crawling logic that:
    /// 1. Generates seeds and fills the frontier
    /// 2. Pops URLs in FIFO order until the frontier is empty or the page
    ///    limit is reached
    /// 3. Fetches, classifies and extracts links from each page
    /// 4. Registers edges and enqueues newly discovered content URLs
    ///
    /// A run can only be started once; a second call fails with
    /// `InvalidTransition`.
    pub async fn run(&mut self) -> Result<CrawlResult, LinkmapError> {
        self.transition_to(CrawlState::Running)?;
        let start_time = Instant::now();

        let base = normalize_url(
            self.base_url.as_str(),
            &self.base_url,
            self.profile.keep_query_params(),
        );
        let mut result = CrawlResult::new(base.clone());

        self.status.status(&format!(
            "Starting crawl of {} (limit {} pages)",
            base, self.page_limit
        ));

        let outcome = if self.cancel.is_cancelled() {
            CrawlOutcome::Aborted
        } else {
            let seeds = generate_seeds(
                &self.fetcher,
                &self.base_url,
                &self.profile,
                self.status.as_ref(),
            )
            .await;
            result.stats.seeds = seeds.len();
            self.status
                .status(&format!("Seeded frontier with {} URLs", seeds.len()));

            let mut frontier = Frontier::from_seeds(seeds);
            let mut redirects = HashMap::new();
            let outcome = self.crawl_loop(&mut frontier, &mut result, &mut redirects).await;
            result.stats.duplicate_links += apply_redirects(&mut result, &redirects);
            outcome
        };

        finalize_inbound_counts(&mut result);
        result.outcome = outcome;
        result.stats.elapsed_ms = start_time.elapsed().as_millis();

        self.transition_to(CrawlState::from(outcome))?;

        self.status.status(&format!(
            "Crawl {}: {} pages, {} links, {} failed, {} excluded in {:?}",
            outcome.as_str(),
            result.pages.len(),
            result.edges.len(),
            result.stats.failed,
            result.stats.excluded,
            start_time.elapsed()
        ));

        Ok(result)
    }

    async fn crawl_loop(
        &self,
        frontier: &mut Frontier,
        result: &mut CrawlResult,
        redirects: &mut HashMap<String, String>,
    ) -> CrawlOutcome {
        let delay = Duration::from_millis(self.profile.source.crawler.delay_ms);
        let mut edge_pairs: HashSet<(String, String)> = HashSet::new();
        let mut last_progress = 0;

        while !frontier.is_empty() && result.pages.len() < self.page_limit {
            if self.cancel.is_cancelled() {
                self.status.status(&format!(
                    "Crawl cancelled with {} pages recorded",
                    result.pages.len()
                ));
                return CrawlOutcome::Aborted;
            }

            let Some(url) = frontier.pop() else {
                break;
            };

            // Enqueued from several sources before its first fetch
            if frontier.is_visited(&url) {
                continue;
            }
            frontier.mark_visited(&url);

            tracing::debug!("Processing URL: {}", url);
            let fetch_result = self.fetcher.fetch(&url).await;
            self.process_response(&url, fetch_result, frontier, result, &mut edge_pairs, redirects);

            let recorded = result.pages.len();
            if recorded >= last_progress + PROGRESS_INTERVAL {
                last_progress = recorded - recorded % PROGRESS_INTERVAL;
                self.status.status(&format!(
                    "Progress: {}/{} pages, {} queued, {} failed",
                    recorded,
                    self.page_limit,
                    frontier.len(),
                    result.stats.failed
                ));
            }

            if !delay.is_zero() && !frontier.is_empty() && recorded < self.page_limit {
                tokio::time::sleep(delay).await;
            }
        }

        if result.pages.len() >= self.page_limit {
            self.status
                .status(&format!("Page limit of {} reached", self.page_limit));
        }

        CrawlOutcome::Completed
    }

    /// Handles one fetch outcome
    ///
    /// Failures and exclusions only touch the counters; the URL is already
    /// marked visited so it is never retried. A redirect to another content
    /// URL is recorded in `redirects` so edges can be retargeted at the end.
    fn process_response(
        &self,
        url: &str,
        fetch_result: FetchResult,
        frontier: &mut Frontier,
        result: &mut CrawlResult,
        edge_pairs: &mut HashSet<(String, String)>,
        redirects: &mut HashMap<String, String>,
    ) {
        let is_html = fetch_result.is_html();
        let (final_url, content_type, body) = match fetch_result {
            FetchResult::Success {
                final_url,
                content_type,
                body,
                ..
            } => (final_url, content_type, body),
            failure => {
                result.stats.failed += 1;
                self.status.status(&format!(
                    "Failed {}: {}",
                    url,
                    failure.failure_reason().unwrap_or_default()
                ));
                return;
            }
        };
        result.stats.fetched += 1;

        if !is_html {
            result.stats.failed += 1;
            self.status
                .status(&format!("Skipped {}: not HTML ({})", url, content_type));
            return;
        }

        let keep = self.profile.keep_query_params();
        let page_url = match self.resolve_final_url(url, &final_url) {
            Some(page_url) => page_url,
            None => {
                result.stats.failed += 1;
                self.status
                    .status(&format!("Skipped {}: redirected to {}", url, final_url));
                return;
            }
        };
        if page_url != url {
            redirects.insert(url.to_string(), page_url.clone());
            if frontier.is_visited(&page_url) {
                tracing::debug!("{} redirects to already visited {}", url, page_url);
                return;
            }
            frontier.mark_visited(&page_url);
        }

        let document = Html::parse_document(&body);

        if let Some(reason) = is_excluded_document(&document, &page_url, &self.profile) {
            result.stats.excluded += 1;
            self.status
                .status(&format!("Excluded {}: {}", page_url, reason));
            return;
        }

        let title = extract_title(&document, &self.profile).unwrap_or_else(|| page_url.clone());
        let document_url = Url::parse(&final_url)
            .or_else(|_| Url::parse(&page_url))
            .unwrap_or_else(|_| self.base_url.clone());

        let mut page = Page::new(page_url.clone(), title.clone());

        for candidate in extract_links(&document, &document_url, &self.profile) {
            let target = normalize_url(&candidate.url, &self.base_url, keep);
            if target.is_empty()
                || !is_internal(&target, self.profile.domain())
                || !is_content(&target, &self.profile)
                || target == page_url
            {
                result.stats.links_rejected += 1;
                continue;
            }

            if !edge_pairs.insert((page_url.clone(), target.clone())) {
                result.stats.duplicate_links += 1;
                continue;
            }

            page.outbound_links.push(target.clone());
            result.edges.push(Link {
                source: page_url.clone(),
                target: target.clone(),
                anchor_text: candidate.anchor_text,
                source_title: title.clone(),
            });
            frontier.push(target);
        }

        self.status.status(&format!(
            "Crawled {} ({} links)",
            page_url,
            page.outbound_links.len()
        ));
        result.pages.push(page);
    }

    /// Normalizes the post-redirect URL; `None` when it left the site or is
    /// not content
    fn resolve_final_url(&self, requested: &str, final_url: &str) -> Option<String> {
        if final_url.is_empty() {
            return Some(requested.to_string());
        }
        let normalized = normalize_url(final_url, &self.base_url, self.profile.keep_query_params());
        if normalized == requested {
            return Some(normalized);
        }
        if normalized.is_empty()
            || !is_internal(&normalized, self.profile.domain())
            || !is_content(&normalized, &self.profile)
        {
            return None;
        }
        Some(normalized)
    }

    fn transition_to(&mut self, next: CrawlState) -> Result<(), LinkmapError> {
        if !self.state.can_transition_to(next) {
            return Err(LinkmapError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!("Crawl state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }
}

/// Crawls a site over HTTP and returns the finished result
///
/// # Example
///
/// ```no_run
/// use linkmap::config::SiteProfile;
///
/// # async fn example() -> linkmap::Result<()> {
/// let profile = SiteProfile::blog_defaults("example.com");
/// let result = linkmap::run_crawl("https://example.com/", &profile, 100).await?;
/// println!("{} pages", result.pages.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    base_url: &str,
    profile: &SiteProfile,
    page_limit: usize,
) -> Result<CrawlResult, LinkmapError> {
    Coordinator::new(base_url, profile, page_limit)?.run().await
}
