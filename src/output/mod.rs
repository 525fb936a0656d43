//! Output module for exporting crawl results
//!
//! This module handles:
//! - The rank-ordered backlink CSV report
//! - Markdown summaries of a crawl run

mod csv;
mod markdown;

pub use self::csv::{export_csv, write_csv, CSV_HEADER};
pub use markdown::{format_markdown_summary, generate_markdown_summary};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
