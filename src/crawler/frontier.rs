//! Frontier and visited-set bookkeeping for one crawl run
//!
//! This module handles:
//! - FIFO ordering of URLs to fetch (approximate breadth-first traversal)
//! - At-most-once admission: a URL already queued or visited is never
//!   enqueued again
//! - The visited set, covering failed and excluded fetches as well

use std::collections::{HashSet, VecDeque};

/// Frontier owns the queue of pending URLs and the set of visited URLs
///
/// Both are keyed by normalized URL strings.
#[derive(Debug, Default)]
pub struct Frontier {
    /// Pending URLs, head is fetched next
    queue: VecDeque<String>,

    /// Membership mirror of `queue`
    queued: HashSet<String>,

    /// URLs fetched (successfully or not) in this run
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier from seed URLs, dropping duplicates and empty
    /// strings while keeping first-seen order
    pub fn from_seeds<I>(seeds: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut frontier = Self::new();
        for seed in seeds {
            frontier.push(seed);
        }
        frontier
    }

    /// Appends a URL to the tail unless it is empty, queued or visited
    ///
    /// # Returns
    ///
    /// `true` if the URL was enqueued
    pub fn push(&mut self, url: String) -> bool {
        if url.is_empty() || self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Pops the head of the queue
    pub fn pop(&mut self) -> Option<String> {
        let url = self.queue.pop_front()?;
        self.queued.remove(&url);
        Some(url)
    }

    /// Records a URL as visited so it is never fetched again
    pub fn mark_visited(&mut self, url: &str) {
        self.visited.insert(url.to_string());
    }

    /// Returns true if the URL was already visited
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Number of pending URLs
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of visited URLs
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
