//! State module for tracking crawl progress
//!
//! `CrawlState` is the lifecycle of a single crawl run. Each run owns its
//! state exclusively; nothing here is shared between runs.

mod crawl_state;

pub use crawl_state::CrawlState;
