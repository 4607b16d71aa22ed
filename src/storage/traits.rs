//! Storage traits and error types
//!
//! This module defines the trait interfaces for storage backends and
//! associated error types.

use crate::storage::{ProcessedUrlRecord, RunRecord, RunStatus, RunSummary};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("Storage lock poisoned")]
    Lock,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// The persisted set of already-processed article URLs
///
/// Keys are URL strings. Re-inserting a URL refreshes its timestamp instead
/// of creating a second record.
pub trait UrlStore: Send {
    /// Returns true if the URL has been processed before
    fn contains(&self, url: &str) -> StorageResult<bool>;

    /// Records a URL as processed at `scraped_at` (upsert)
    fn insert_or_update(&mut self, url: &str, scraped_at: DateTime<Utc>) -> StorageResult<()>;

    /// Returns every processed URL
    fn list_all(&self) -> StorageResult<HashSet<String>>;

    /// Gets the record for a URL
    fn get_record(&self, url: &str) -> StorageResult<Option<ProcessedUrlRecord>>;

    /// Counts processed URLs
    fn count(&self) -> StorageResult<u64>;

    /// Gets the most recent `scraped_at` timestamp
    fn latest_scraped_at(&self) -> StorageResult<Option<DateTime<Utc>>>;
}

/// Ledger of pipeline runs
pub trait RunLog {
    /// Creates a new run and returns its ID
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Records the outcome of a run with a finish timestamp
    fn finish_run(
        &mut self,
        run_id: i64,
        summary: &RunSummary,
        status: RunStatus,
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent runs, newest first
    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>>;
}
