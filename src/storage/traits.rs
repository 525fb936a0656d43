//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::graph::CrawlResult;
use crate::storage::RunRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Run {run_id} has unexpected status '{status}'")]
    InvalidStatus { run_id: i64, status: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Runs are written once, after the crawl has finished, and read back as
/// complete results.
pub trait Storage {
    /// Saves a finished crawl result as a new run
    ///
    /// # Arguments
    ///
    /// * `result` - The crawl result to persist
    /// * `config_hash` - Hash of the site profile the run used
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn save_result(&mut self, result: &CrawlResult, config_hash: &str) -> StorageResult<i64>;

    /// Loads a saved run back into a crawl result
    fn load_result(&self, run_id: i64) -> StorageResult<CrawlResult>;

    /// Gets a run's metadata by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recently saved run, if any
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Lists all saved runs, newest first
    fn list_runs(&self) -> StorageResult<Vec<RunRecord>>;
}
