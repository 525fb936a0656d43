//! Integration tests for the crawler
//!
//! Site scenarios run against an in-memory fetcher, since the engine only
//! ever crawls https URLs. The HTTP fetcher itself is exercised against
//! wiremock servers.

use linkmap::config::{load_profile_with_hash, SiteProfile};
use linkmap::crawler::{
    parse_sitemap, CancellationFlag, FetchResult, Fetcher, HttpFetcher, Sitemap,
};
use linkmap::output::{export_csv, write_csv};
use linkmap::storage::{SqliteStorage, Storage};
use linkmap::{Coordinator, CrawlOutcome, CrawlResult, CrawlState};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOME: &str = "https://example.com/";

/// Serves a fixed set of HTML pages; anything else fails like a dead host
#[derive(Default)]
struct SiteFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl SiteFetcher {
    fn new() -> Self {
        Self::default()
    }

    fn page(mut self, url: &str, title: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), document(title, "", body));
        self
    }

    fn raw(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }

    fn fetch_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }
}

impl Fetcher for SiteFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        self.requests.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(body) => FetchResult::Success {
                final_url: url.to_string(),
                status_code: 200,
                content_type: "text/html; charset=utf-8".to_string(),
                body: body.clone(),
            },
            None => FetchResult::NetworkError {
                error: "Connection failed: connection refused".to_string(),
            },
        }
    }
}

/// Generates an endless chain of posts, each linking to the next
struct ChainFetcher;

impl Fetcher for ChainFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        let next = match url.rsplit_once("/post-") {
            Some((_, n)) => n.parse::<u64>().map(|n| n + 1).unwrap_or(1),
            None => 1,
        };
        FetchResult::Success {
            final_url: url.to_string(),
            status_code: 200,
            content_type: "text/html".to_string(),
            body: document(
                url,
                "",
                &format!(r#"<a href="/post-{}">Next</a>"#, next),
            ),
        }
    }
}

fn document(title: &str, head: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title>{}</head><body><article>{}</article></body></html>",
        title, head, body
    )
}

fn test_profile() -> SiteProfile {
    let mut profile = SiteProfile::blog_defaults("example.com");
    profile.site.sitemap_paths = Vec::new();
    profile.site.sitemap_from_robots = false;
    profile.crawler.delay_ms = 0;
    profile
}

async fn crawl<F: Fetcher>(fetcher: F, profile: &SiteProfile, limit: usize) -> CrawlResult {
    Coordinator::with_fetcher(HOME, profile, limit, fetcher)
        .unwrap()
        .with_status(|_: &str| {})
        .run()
        .await
        .unwrap()
}

fn three_page_site() -> SiteFetcher {
    SiteFetcher::new()
        .page(
            HOME,
            "A",
            r#"<a href="/b">to B</a> <a href="/c">to C</a>"#,
        )
        .page("https://example.com/b", "B", r#"<a href="/c">to C</a>"#)
        .page("https://example.com/c", "C", "no links here")
}

fn edge_pairs(result: &CrawlResult) -> Vec<(&str, &str)> {
    result
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect()
}

#[tokio::test]
async fn test_three_page_site_graph() {
    let result = crawl(three_page_site(), &test_profile(), 100).await;

    let urls: HashSet<&str> = result.pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(
        urls,
        HashSet::from([HOME, "https://example.com/b", "https://example.com/c"])
    );
    assert_eq!(
        edge_pairs(&result),
        vec![
            (HOME, "https://example.com/b"),
            (HOME, "https://example.com/c"),
            ("https://example.com/b", "https://example.com/c"),
        ]
    );
    assert_eq!(result.page(HOME).unwrap().inbound_count, 0);
    assert_eq!(result.page("https://example.com/b").unwrap().inbound_count, 1);
    assert_eq!(result.page("https://example.com/c").unwrap().inbound_count, 2);
    assert_eq!(result.outcome, CrawlOutcome::Completed);
}

#[tokio::test]
async fn test_three_page_site_report() {
    let result = crawl(three_page_site(), &test_profile(), 100).await;
    let csv = export_csv(&result).unwrap();

    assert_eq!(
        csv.lines().collect::<Vec<_>>(),
        vec![
            "rank,target_title,target_url,source_title,source_url,anchor_text",
            "1,C,https://example.com/c,A,https://example.com/,to C",
            "1,C,https://example.com/c,B,https://example.com/b,to C",
            "2,B,https://example.com/b,A,https://example.com/,to B",
            "3,A,https://example.com/,,,",
        ]
    );
}

#[tokio::test]
async fn test_report_is_byte_identical_across_exports_and_runs() {
    let first = crawl(three_page_site(), &test_profile(), 100).await;
    let second = crawl(three_page_site(), &test_profile(), 100).await;

    let csv = export_csv(&first).unwrap();
    assert_eq!(csv, export_csv(&first).unwrap());
    assert_eq!(csv, export_csv(&second).unwrap());
}

#[tokio::test]
async fn test_edges_unique_and_inbound_counts_consistent() {
    let fetcher = SiteFetcher::new()
        .page(
            HOME,
            "Home",
            r#"<a href="/x">X</a><a href="/x/">X again</a><a href="/y">Y</a><a href="/">Home</a>"#,
        )
        .page(
            "https://example.com/x",
            "X",
            r#"<a href="/y">Y</a><a href="https://www.example.com/y?utm_source=z">Y tracked</a><a href="/">Home</a>"#,
        )
        .page(
            "https://example.com/y",
            "Y",
            r#"<a href="/x#comments">X</a><a href="/y">Self</a>"#,
        );

    let result = crawl(fetcher, &test_profile(), 100).await;

    let mut seen = HashSet::new();
    for edge in &result.edges {
        assert!(
            seen.insert((edge.source.clone(), edge.target.clone())),
            "duplicate edge {} -> {}",
            edge.source,
            edge.target
        );
    }

    for page in &result.pages {
        let expected = result.edges.iter().filter(|e| e.target == page.url).count();
        assert_eq!(page.inbound_count, expected, "inbound count of {}", page.url);
    }
    assert!(result.stats.duplicate_links >= 1);
}

#[tokio::test]
async fn test_noindex_page_recorded_nowhere_and_fetched_once() {
    let fetcher = SiteFetcher::new()
        .page(
            HOME,
            "Home",
            r#"<a href="/hidden">Hidden</a><a href="/visible">Visible</a>"#,
        )
        .raw(
            "https://example.com/hidden",
            document(
                "Hidden",
                r#"<meta name="robots" content="noindex, follow">"#,
                r#"<a href="/secret">Secret</a>"#,
            ),
        )
        .page(
            "https://example.com/visible",
            "Visible",
            r#"<a href="/hidden">Hidden again</a>"#,
        );

    let result = crawl(fetcher, &test_profile(), 100).await;

    assert!(result.page("https://example.com/hidden").is_none());
    assert!(result
        .edges
        .iter()
        .all(|e| e.source != "https://example.com/hidden"));
    assert_eq!(result.stats.excluded, 1);
    assert_eq!(result.pages.len(), 2);
}

#[tokio::test]
async fn test_noindex_url_is_never_requeued() {
    let fetcher = SiteFetcher::new()
        .page(
            HOME,
            "Home",
            r#"<a href="/hidden">Hidden</a><a href="/visible">Visible</a>"#,
        )
        .raw(
            "https://example.com/hidden",
            document("Hidden", r#"<meta name="robots" content="noindex">"#, ""),
        )
        .page(
            "https://example.com/visible",
            "Visible",
            r#"<a href="/hidden">Hidden again</a>"#,
        );

    let mut coordinator = Coordinator::with_fetcher(HOME, &test_profile(), 100, fetcher)
        .unwrap()
        .with_status(|_: &str| {});
    coordinator.run().await.unwrap();

    assert_eq!(coordinator.fetcher().fetch_count("https://example.com/hidden"), 1);
}

#[tokio::test]
async fn test_fragment_and_script_anchors_skipped_onclick_followed() {
    let fetcher = SiteFetcher::new()
        .page(
            HOME,
            "Home",
            r##"<a href="#section">Jump</a>
                <a href="javascript:void(0)">Menu</a>
                <button onclick="location.href='/x'">Go to X</button>"##,
        )
        .page("https://example.com/x", "X", "");

    let result = crawl(fetcher, &test_profile(), 100).await;

    assert_eq!(edge_pairs(&result), vec![(HOME, "https://example.com/x")]);
    assert_eq!(result.edges[0].anchor_text, "Go to X");
    assert!(result.page("https://example.com/x").is_some());
}

#[tokio::test]
async fn test_sitemap_failure_falls_back_to_homepage_seed() {
    let mut profile = test_profile();
    profile.site.sitemap_paths = vec!["/sitemap.xml".to_string()];

    let messages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&messages);

    let mut coordinator = Coordinator::with_fetcher(HOME, &profile, 100, three_page_site())
        .unwrap()
        .with_status(move |msg: &str| sink.lock().unwrap().push(msg.to_string()));
    let result = coordinator.run().await.unwrap();

    assert_eq!(result.outcome, CrawlOutcome::Completed);
    assert_eq!(result.stats.seeds, 1);
    assert_eq!(result.pages.len(), 3);
    assert_eq!(
        coordinator.fetcher().fetch_count("https://example.com/sitemap.xml"),
        1
    );
    assert!(messages
        .lock()
        .unwrap()
        .iter()
        .any(|m| m.starts_with("Warning:")));
}

#[tokio::test]
async fn test_sitemap_urls_seed_unlinked_pages() {
    let mut profile = test_profile();
    profile.site.sitemap_paths = vec!["/sitemap.xml".to_string()];

    let sitemap = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/orphan</loc></url>
  <url><loc>https://example.com/tag/rust</loc></url>
</urlset>"#;
    let fetcher = three_page_site()
        .raw("https://example.com/sitemap.xml", sitemap.to_string())
        .page("https://example.com/orphan", "Orphan", "");

    let result = crawl(fetcher, &profile, 100).await;

    assert_eq!(result.stats.seeds, 2);
    let orphan = result.page("https://example.com/orphan").unwrap();
    assert_eq!(orphan.inbound_count, 0);
    assert!(result.page("https://example.com/tag/rust").is_none());
}

#[tokio::test]
async fn test_endless_site_stops_at_page_limit() {
    let result = crawl(ChainFetcher, &test_profile(), 25).await;

    assert_eq!(result.outcome, CrawlOutcome::Completed);
    assert_eq!(result.pages.len(), 25);
    assert_eq!(result.edges.len(), 25);
}

#[tokio::test]
async fn test_cancellation_keeps_partial_graph() {
    let cancel = CancellationFlag::new();
    let trigger = cancel.clone();

    let mut coordinator = Coordinator::with_fetcher(HOME, &test_profile(), 1000, ChainFetcher)
        .unwrap()
        .with_cancellation(cancel)
        .with_status(move |msg: &str| {
            if msg.starts_with("Crawled https://example.com/post-3") {
                trigger.cancel();
            }
        });

    let result = coordinator.run().await.unwrap();

    assert_eq!(result.outcome, CrawlOutcome::Aborted);
    assert_eq!(coordinator.state(), CrawlState::Aborted);
    assert_eq!(result.pages.len(), 4);
    assert!(export_csv(&result).unwrap().lines().count() > 1);
}

#[tokio::test]
async fn test_result_survives_storage_and_file_export() {
    let dir = tempfile::tempdir().unwrap();
    let result = crawl(three_page_site(), &test_profile(), 100).await;

    let mut storage = SqliteStorage::new(&dir.path().join("runs.db")).unwrap();
    let run_id = storage.save_result(&result, "hash").unwrap();
    let loaded = storage.load_result(run_id).unwrap();

    let csv_path = dir.path().join("report.csv");
    write_csv(&loaded, &csv_path).unwrap();
    assert_eq!(
        std::fs::read_to_string(&csv_path).unwrap(),
        export_csv(&result).unwrap()
    );
}

#[test]
fn test_bundled_profile_loads() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("profiles/example.toml");
    let (profile, hash) = load_profile_with_hash(&path).unwrap();

    assert_eq!(profile.site.domain, "example.com");
    assert_eq!(profile.start_url(), "https://example.com/");
    assert_eq!(hash.len(), 64);
    assert!(linkmap::CompiledProfile::compile(&profile).is_ok());
}

#[tokio::test]
async fn test_http_fetcher_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/post"))
        .and(header("user-agent", "AuditBot/2.1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><title>Post</title></html>", "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let mut profile = test_profile();
    profile.user_agent.crawler_name = "AuditBot".to_string();
    profile.user_agent.crawler_version = "2.1".to_string();
    profile.user_agent.contact_url = None;

    let fetcher = HttpFetcher::new(&profile).unwrap();
    let result = fetcher.fetch(&format!("{}/post", mock_server.uri())).await;

    assert!(result.is_html());
    match result {
        FetchResult::Success {
            status_code,
            content_type,
            body,
            ..
        } => {
            assert_eq!(status_code, 200);
            assert_eq!(content_type, "text/html; charset=utf-8");
            assert!(body.contains("Post"));
        }
        other => panic!("Expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_fetcher_reports_status_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&test_profile()).unwrap();
    let result = fetcher.fetch(&format!("{}/missing", mock_server.uri())).await;

    assert!(matches!(result, FetchResult::HttpError { status_code: 404 }));
    assert_eq!(result.failure_reason().as_deref(), Some("HTTP 404"));
}

#[tokio::test]
async fn test_http_fetcher_follows_redirects() {
    let mock_server = MockServer::start().await;
    let final_url = format!("{}/new-home", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/old-home"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", final_url.as_str()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new-home"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&test_profile()).unwrap();
    let result = fetcher.fetch(&format!("{}/old-home", mock_server.uri())).await;

    match result {
        FetchResult::Success {
            final_url: landed, ..
        } => assert_eq!(landed, final_url),
        other => panic!("Expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_fetcher_passes_xml_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                r#"<?xml version="1.0"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/a</loc></url>
  <url><loc>https://example.com/b</loc></url>
</urlset>"#,
                "application/xml",
            ),
        )
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&test_profile()).unwrap();
    let result = fetcher
        .fetch(&format!("{}/sitemap.xml", mock_server.uri()))
        .await;

    assert!(!result.is_html());
    let FetchResult::Success {
        content_type, body, ..
    } = result
    else {
        panic!("Expected success");
    };
    assert_eq!(content_type, "application/xml");
    match parse_sitemap(&body).unwrap() {
        Sitemap::UrlSet(urls) => assert_eq!(
            urls,
            vec!["https://example.com/a", "https://example.com/b"]
        ),
        other => panic!("Expected urlset, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_fetcher_unreachable_host() {
    let fetcher = HttpFetcher::new(&test_profile()).unwrap();
    let result = fetcher.fetch("http://127.0.0.1:1/").await;

    assert!(matches!(result, FetchResult::NetworkError { .. }));
}
