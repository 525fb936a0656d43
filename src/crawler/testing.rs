//! In-memory fetcher for unit tests

use crate::crawler::fetcher::{FetchResult, Fetcher};
use std::collections::HashMap;
use std::sync::Mutex;

/// Wraps body markup in a minimal HTML document
pub fn html(body: &str) -> String {
    format!("<html><head><title>Test</title></head><body>{}</body></html>", body)
}

/// Serves canned responses by exact URL; anything else is a 404
#[derive(Default)]
pub struct StaticFetcher {
    responses: HashMap<String, FetchResult>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, body: &str) -> Self {
        self.text(url, "text/html; charset=utf-8", body)
    }

    pub fn text(mut self, url: &str, content_type: &str, body: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            FetchResult::Success {
                final_url: url.to_string(),
                status_code: 200,
                content_type: content_type.to_string(),
                body: body.to_string(),
            },
        );
        self
    }

    pub fn redirect(mut self, url: &str, final_url: &str, body: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            FetchResult::Success {
                final_url: final_url.to_string(),
                status_code: 200,
                content_type: "text/html".to_string(),
                body: body.to_string(),
            },
        );
        self
    }

    pub fn status(mut self, url: &str, status_code: u16) -> Self {
        self.responses
            .insert(url.to_string(), FetchResult::HttpError { status_code });
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .unwrap_or(FetchResult::HttpError { status_code: 404 })
    }
}
