//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`Fetcher`] trait
//! - Seed discovery from sitemaps
//! - HTML parsing and link extraction
//! - The FIFO frontier and visited set
//! - Overall crawl coordination, status reporting and cancellation

mod cancel;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod seeds;
mod status;

#[cfg(test)]
pub(crate) mod testing;

pub use cancel::CancellationFlag;
pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, fetch_url, FetchResult, Fetcher, HttpFetcher};
pub use frontier::Frontier;
pub use parser::{extract_links, extract_title, ExtractedLink, NO_TEXT_PLACEHOLDER};
pub use seeds::{generate_seeds, parse_sitemap, Sitemap, SitemapError, MAX_SITEMAP_DEPTH};
pub use status::{StatusSink, TracingSink};
