//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::graph::{CrawlOutcome, CrawlResult, CrawlStats, Link, Page};
use crate::state::CrawlState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::RunRecord;
use chrono::{Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, base_url, config_hash, status,
    (SELECT COUNT(*) FROM pages WHERE pages.run_id = runs.id),
    (SELECT COUNT(*) FROM links WHERE links.run_id = runs.id)";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn load_stats(&self, run_id: i64) -> StorageResult<CrawlStats> {
        let stats = self.conn.query_row(
            "SELECT seeds, fetched, failed, excluded, links_rejected, duplicate_links, elapsed_ms
             FROM runs WHERE id = ?1",
            params![run_id],
            |row| {
                Ok(CrawlStats {
                    seeds: row.get::<_, i64>(0)? as usize,
                    fetched: row.get::<_, i64>(1)? as usize,
                    failed: row.get::<_, i64>(2)? as usize,
                    excluded: row.get::<_, i64>(3)? as usize,
                    links_rejected: row.get::<_, i64>(4)? as usize,
                    duplicate_links: row.get::<_, i64>(5)? as usize,
                    elapsed_ms: row.get::<_, i64>(6)? as u128,
                })
            },
        )?;
        Ok(stats)
    }
}

fn run_from_row(row: &Row) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        base_url: row.get(3)?,
        config_hash: row.get(4)?,
        status: CrawlState::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(CrawlState::Aborted),
        page_count: row.get::<_, i64>(6)? as u64,
        link_count: row.get::<_, i64>(7)? as u64,
    })
}

fn as_db_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl Storage for SqliteStorage {
    fn save_result(&mut self, result: &CrawlResult, config_hash: &str) -> StorageResult<i64> {
        let status = CrawlState::from(result.outcome);
        let stats = &result.stats;
        let elapsed_ms = i64::try_from(stats.elapsed_ms).unwrap_or(i64::MAX);
        let finished = Utc::now();
        let started = finished - Duration::milliseconds(elapsed_ms);

        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO runs (started_at, finished_at, base_url, config_hash, status,
                seeds, fetched, failed, excluded, links_rejected, duplicate_links, elapsed_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                started.to_rfc3339(),
                finished.to_rfc3339(),
                result.base_url,
                config_hash,
                status.to_db_string(),
                as_db_int(stats.seeds),
                as_db_int(stats.fetched),
                as_db_int(stats.failed),
                as_db_int(stats.excluded),
                as_db_int(stats.links_rejected),
                as_db_int(stats.duplicate_links),
                elapsed_ms,
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        {
            let mut insert_page = tx.prepare(
                "INSERT INTO pages (run_id, position, url, title, inbound_count)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (position, page) in result.pages.iter().enumerate() {
                insert_page.execute(params![
                    run_id,
                    as_db_int(position),
                    page.url,
                    page.title,
                    as_db_int(page.inbound_count),
                ])?;
            }

            let mut insert_link = tx.prepare(
                "INSERT INTO links (run_id, position, source_url, target_url, anchor_text, source_title)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (position, link) in result.edges.iter().enumerate() {
                insert_link.execute(params![
                    run_id,
                    as_db_int(position),
                    link.source,
                    link.target,
                    link.anchor_text,
                    link.source_title,
                ])?;
            }
        }

        tx.commit()?;

        tracing::debug!(
            "Saved run {} ({} pages, {} links)",
            run_id,
            result.pages.len(),
            result.edges.len()
        );

        Ok(run_id)
    }

    fn load_result(&self, run_id: i64) -> StorageResult<CrawlResult> {
        let run = self.get_run(run_id)?;
        let outcome = match run.status {
            CrawlState::Completed => CrawlOutcome::Completed,
            CrawlState::Aborted => CrawlOutcome::Aborted,
            other => {
                return Err(StorageError::InvalidStatus {
                    run_id,
                    status: other.to_string(),
                })
            }
        };

        let mut result = CrawlResult::new(run.base_url);
        result.outcome = outcome;
        result.stats = self.load_stats(run_id)?;

        let mut stmt = self.conn.prepare(
            "SELECT url, title, inbound_count FROM pages WHERE run_id = ?1 ORDER BY position",
        )?;
        result.pages = stmt
            .query_map(params![run_id], |row| {
                let mut page = Page::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?);
                page.inbound_count = row.get::<_, i64>(2)? as usize;
                Ok(page)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT source_url, target_url, anchor_text, source_title
             FROM links WHERE run_id = ?1 ORDER BY position",
        )?;
        result.edges = stmt
            .query_map(params![run_id], |row| {
                Ok(Link {
                    source: row.get(0)?,
                    target: row.get(1)?,
                    anchor_text: row.get(2)?,
                    source_title: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let index: HashMap<String, usize> = result
            .pages
            .iter()
            .enumerate()
            .map(|(i, page)| (page.url.clone(), i))
            .collect();
        for link in &result.edges {
            if let Some(&i) = index.get(&link.source) {
                result.pages[i].outbound_links.push(link.target.clone());
            }
        }

        Ok(result)
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?;

        run.ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn list_runs(&self) -> StorageResult<Vec<RunRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM runs ORDER BY id DESC", RUN_COLUMNS))?;
        let runs = stmt
            .query_map([], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }
}
