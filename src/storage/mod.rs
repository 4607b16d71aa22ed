//! Storage module for persisting crawl data
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - The processed-URL set used to compute each crawl's delta
//! - Run tracking for statistics

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{RunLog, StorageError, StorageResult, UrlStore};

use crate::DigestError;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// A URL store shared between the crawl coordinator and article fetches
///
/// The lock is never held across an await point.
pub type SharedStore = Arc<Mutex<dyn UrlStore>>;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(DigestError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, DigestError> {
    Ok(SqliteStorage::new(path)?)
}

/// Opens an existing database read-only, or returns None if there is none yet
pub fn open_storage_read_only(path: &Path) -> Result<Option<SqliteStorage>, DigestError> {
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(SqliteStorage::open_read_only(path)?))
}

/// Locks a shared store, mapping a poisoned lock to [`StorageError::Lock`]
pub fn lock_store(
    store: &SharedStore,
) -> StorageResult<MutexGuard<'_, dyn UrlStore + 'static>> {
    store.lock().map_err(|_| StorageError::Lock)
}

/// A processed article URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedUrlRecord {
    pub url: String,
    pub scraped_at: DateTime<Utc>,
}

/// Counters describing what a run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Candidate URLs discovered across all listing pages
    pub candidates: u64,

    /// Candidates not present in the store
    pub delta: u64,

    /// Whether the work-list was a fallback sample
    pub used_fallback: bool,

    /// Articles scraped successfully
    pub articles: u64,
}

/// Represents a pipeline run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub summary: RunSummary,
}

/// Status of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    NothingToDo,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::NothingToDo => "nothing_to_do",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "nothing_to_do" => Some(Self::NothingToDo),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
