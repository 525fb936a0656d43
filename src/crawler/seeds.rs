//! Seed discovery from the base URL and XML sitemaps
//!
//! Seeds are the base URL followed by every content URL listed in the site's
//! sitemaps. Sitemap indexes are followed recursively, bounded by
//! [`MAX_SITEMAP_DEPTH`]. Any sitemap failure is reported as a warning and
//! seeding degrades to whatever was found, at minimum the base URL.

use crate::classify::is_content;
use crate::config::CompiledProfile;
use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::crawler::status::StatusSink;
use crate::url::{is_internal, normalize_url};
use quick_xml::events::Event;
use quick_xml::Reader;
use robotstxt::{parse_robotstxt, RobotsParseHandler};
use std::collections::{HashSet, VecDeque};
use thiserror::Error;
use url::Url;

/// Maximum sitemap-index nesting followed below a root sitemap
pub const MAX_SITEMAP_DEPTH: usize = 10;

/// Why a sitemap document could not be used
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Document is neither a <urlset> nor a <sitemapindex>")]
    NotASitemap,
}

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sitemap {
    /// `<sitemapindex>`: locations of child sitemaps
    Index(Vec<String>),
    /// `<urlset>`: page locations
    UrlSet(Vec<String>),
}

/// Builds the ordered, deduplicated seed list for a crawl
///
/// The normalized base URL always comes first. Sitemap sources are the
/// profile's `sitemap-paths` joined to the base URL, plus any `Sitemap:`
/// lines from `/robots.txt` when `sitemap-from-robots` is set. Listed URLs
/// are kept only if they are not sitemap files themselves, live on the
/// profile domain and pass the content rules.
pub async fn generate_seeds<F: Fetcher>(
    fetcher: &F,
    base_url: &Url,
    profile: &CompiledProfile,
    status: &dyn StatusSink,
) -> Vec<String> {
    let keep = profile.keep_query_params();
    let mut seeds = Vec::new();
    let mut seen = HashSet::new();

    let base = normalize_url(base_url.as_str(), base_url, keep);
    if !base.is_empty() {
        seen.insert(base.clone());
        seeds.push(base);
    }

    let mut sources: Vec<String> = profile
        .source
        .site
        .sitemap_paths
        .iter()
        .filter_map(|path| base_url.join(path).ok())
        .map(|url| url.to_string())
        .collect();

    if profile.source.site.sitemap_from_robots {
        for url in robots_sitemaps(fetcher, base_url).await {
            if !sources.contains(&url) {
                sources.push(url);
            }
        }
    }

    let had_sources = !sources.is_empty();
    let listed = collect_sitemap_urls(fetcher, sources, status).await;
    let listed_count = listed.len();

    for raw in listed {
        if is_sitemap_file(&raw) {
            continue;
        }
        let url = normalize_url(&raw, base_url, keep);
        if url.is_empty() || !is_internal(&url, profile.domain()) || !is_content(&url, profile) {
            continue;
        }
        if seen.insert(url.clone()) {
            seeds.push(url);
        }
    }

    if listed_count == 0 && had_sources {
        status.status("Warning: no sitemap URLs found; seeding from the base URL only");
    } else {
        tracing::debug!(
            "Sitemaps listed {} URLs, {} kept as seeds",
            listed_count,
            seeds.len().saturating_sub(1)
        );
    }

    seeds
}

/// Walks sitemap sources breadth-first and returns every listed page URL
async fn collect_sitemap_urls<F: Fetcher>(
    fetcher: &F,
    sources: Vec<String>,
    status: &dyn StatusSink,
) -> Vec<String> {
    let mut queue: VecDeque<(String, usize)> = sources.into_iter().map(|url| (url, 0)).collect();
    let mut visited: HashSet<String> = HashSet::new();
    let mut pages = Vec::new();

    while let Some((sitemap_url, depth)) = queue.pop_front() {
        if !visited.insert(sitemap_url.clone()) {
            continue;
        }

        let body = match fetcher.fetch(&sitemap_url).await {
            FetchResult::Success { body, .. } => body,
            failure => {
                status.status(&format!(
                    "Warning: sitemap {} unavailable ({})",
                    sitemap_url,
                    failure.failure_reason().unwrap_or_default()
                ));
                continue;
            }
        };

        match parse_sitemap(&body) {
            Ok(Sitemap::UrlSet(locs)) => {
                tracing::debug!("Sitemap {} lists {} URLs", sitemap_url, locs.len());
                pages.extend(locs);
            }
            Ok(Sitemap::Index(children)) => {
                if depth >= MAX_SITEMAP_DEPTH {
                    status.status(&format!(
                        "Warning: sitemap index {} nested deeper than {} levels; not followed",
                        sitemap_url, MAX_SITEMAP_DEPTH
                    ));
                    continue;
                }
                let parent = Url::parse(&sitemap_url).ok();
                for child in children {
                    let resolved = match &parent {
                        Some(p) => p.join(&child).map(|u| u.to_string()).unwrap_or(child),
                        None => child,
                    };
                    if !visited.contains(&resolved) {
                        queue.push_back((resolved, depth + 1));
                    }
                }
            }
            Err(e) => {
                status.status(&format!("Warning: sitemap {} ignored: {}", sitemap_url, e));
            }
        }
    }

    pages
}

/// Parses a sitemap or sitemap index document
///
/// Only `<loc>` elements are read; namespaces are ignored by matching local
/// names.
pub fn parse_sitemap(xml: &str) -> Result<Sitemap, SitemapError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut in_loc = false;
    let mut locs: Vec<String> = Vec::new();
    let mut saw_urlset = false;
    let mut saw_sitemapindex = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"urlset" => saw_urlset = true,
                b"sitemapindex" => saw_sitemapindex = true,
                b"loc" => in_loc = true,
                _ => {}
            },
            Event::End(e) => {
                if e.local_name().as_ref() == b"loc" {
                    in_loc = false;
                }
            }
            Event::Text(t) if in_loc => {
                let text = t.unescape()?.trim().to_string();
                if !text.is_empty() {
                    locs.push(text);
                }
            }
            Event::CData(c) if in_loc => {
                let text = String::from_utf8_lossy(&c.into_inner()).trim().to_string();
                if !text.is_empty() {
                    locs.push(text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if saw_sitemapindex {
        Ok(Sitemap::Index(locs))
    } else if saw_urlset {
        Ok(Sitemap::UrlSet(locs))
    } else {
        Err(SitemapError::NotASitemap)
    }
}

/// Reads `Sitemap:` lines from the site's robots.txt
///
/// A missing robots.txt is normal and not reported.
async fn robots_sitemaps<F: Fetcher>(fetcher: &F, base_url: &Url) -> Vec<String> {
    let Ok(robots_url) = base_url.join("/robots.txt") else {
        return Vec::new();
    };

    match fetcher.fetch(robots_url.as_str()).await {
        FetchResult::Success { body, .. } => parse_robots_sitemaps(&body, base_url),
        failure => {
            tracing::debug!(
                "No robots.txt at {} ({})",
                robots_url,
                failure.failure_reason().unwrap_or_default()
            );
            Vec::new()
        }
    }
}

/// Collects `Sitemap:` values; every other robots.txt directive is ignored
#[derive(Debug, Default)]
struct SitemapCollector {
    sitemaps: Vec<String>,
}

impl RobotsParseHandler for SitemapCollector {
    fn handle_robots_start(&mut self) {}

    fn handle_robots_end(&mut self) {}

    fn handle_user_agent(&mut self, _line_num: u32, _user_agent: &str) {}

    fn handle_allow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_disallow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_sitemap(&mut self, _line_num: u32, value: &str) {
        self.sitemaps.push(value.to_string());
    }

    fn handle_unknown_action(&mut self, _line_num: u32, _action: &str, _value: &str) {}
}

fn parse_robots_sitemaps(robots: &str, base_url: &Url) -> Vec<String> {
    let mut collector = SitemapCollector::default();
    parse_robotstxt(robots, &mut collector);

    collector
        .sitemaps
        .iter()
        .filter_map(|value| base_url.join(value.trim()).ok())
        .map(|url| url.to_string())
        .collect()
}

/// True for `.xml` and `.xml.gz` paths
fn is_sitemap_file(url: &str) -> bool {
    let path = Url::parse(url)
        .map(|u| u.path().to_ascii_lowercase())
        .unwrap_or_else(|_| url.to_ascii_lowercase());
    path.ends_with(".xml") || path.ends_with(".xml.gz")
}
