//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the storage traits.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RunLog, StorageError, StorageResult, UrlStore};
use crate::storage::{ProcessedUrlRecord, RunRecord, RunStatus, RunSummary};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;

const RUN_COLUMNS: &str =
    "id, started_at, finished_at, config_hash, status, candidates, delta, used_fallback, articles";

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
    pub fn new(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Opens an existing database without write access
    ///
    /// Nothing is created: a missing file is an error and the schema is not
    /// touched. Any write through this handle fails.
    pub fn open_read_only(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn parse_timestamp(value: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StorageError::InvalidTimestamp(value.to_string()))
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Failed),
        summary: RunSummary {
            candidates: row.get::<_, i64>(5)? as u64,
            delta: row.get::<_, i64>(6)? as u64,
            used_fallback: row.get::<_, i64>(7)? != 0,
            articles: row.get::<_, i64>(8)? as u64,
        },
    })
}

impl UrlStore for SqliteStorage {
    fn contains(&self, url: &str) -> StorageResult<bool> {
        let exists: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM processed_urls WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(exists.is_some())
    }

    fn insert_or_update(&mut self, url: &str, scraped_at: DateTime<Utc>) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO processed_urls (url, scraped_at) VALUES (?1, ?2)
             ON CONFLICT(url) DO UPDATE SET scraped_at = excluded.scraped_at",
            params![url, scraped_at.to_rfc3339()],
        )?;
        Ok(())
    }

    fn list_all(&self) -> StorageResult<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT url FROM processed_urls")?;
        let urls = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(urls)
    }

    fn get_record(&self, url: &str) -> StorageResult<Option<ProcessedUrlRecord>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT url, scraped_at FROM processed_urls WHERE url = ?1",
                params![url],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((url, scraped_at)) => Ok(Some(ProcessedUrlRecord {
                url,
                scraped_at: parse_timestamp(&scraped_at)?,
            })),
            None => Ok(None),
        }
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM processed_urls", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn latest_scraped_at(&self) -> StorageResult<Option<DateTime<Utc>>> {
        let latest: Option<String> = self.conn.query_row(
            "SELECT MAX(scraped_at) FROM processed_urls",
            [],
            |row| row.get(0),
        )?;

        latest.as_deref().map(parse_timestamp).transpose()
    }
}

impl RunLog for SqliteStorage {
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        summary: &RunSummary,
        status: RunStatus,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, candidates = ?3, delta = ?4,
             used_fallback = ?5, articles = ?6 WHERE id = ?7",
            params![
                status.to_db_string(),
                now,
                summary.candidates as i64,
                summary.delta as i64,
                summary.used_fallback as i64,
                summary.articles as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT ?1", RUN_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let runs = stmt
            .query_map(params![limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }
}
