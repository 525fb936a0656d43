//! Linkmap: an internal-link auditor for a single website
//!
//! This crate crawls one site, builds the directed graph of its internal
//! hyperlinks, ranks pages by inbound-link count and exports the result as a
//! backlink report.

pub mod classify;
pub mod config;
pub mod crawler;
pub mod graph;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Linkmap operations
#[derive(Debug, Error)]
pub enum LinkmapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },
}

/// Configuration-specific errors
///
/// Any of these prevents a crawl run from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read profile file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in profile: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid regular expression '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("Invalid CSS selector '{0}'")]
    InvalidSelector(String),
}

/// Result type alias for Linkmap operations
pub type Result<T> = std::result::Result<T, LinkmapError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{CompiledProfile, SiteProfile};
pub use crawler::{run_crawl, Coordinator};
pub use graph::{CrawlOutcome, CrawlResult, Link, LinkGraph, Page};
pub use output::export_csv;
pub use state::CrawlState;
pub use url::normalize_url;
