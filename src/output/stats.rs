//! Statistics from the digest database
//!
//! This module provides functionality for extracting and displaying
//! store and run statistics for `--stats`.

use crate::output::traits::OutputResult;
use crate::storage::{RunLog, RunRecord, UrlStore};
use chrono::{DateTime, Utc};

/// Number of runs shown by [`print_statistics`]
pub const RECENT_RUNS: usize = 10;

/// Store and run statistics
#[derive(Debug, Clone)]
pub struct DigestStatistics {
    /// Number of URLs recorded as processed
    pub processed_urls: u64,

    /// Time of the most recent successful scrape
    pub latest_scraped_at: Option<DateTime<Utc>>,

    /// Most recent runs, newest first
    pub recent_runs: Vec<RunRecord>,
}

impl DigestStatistics {
    /// Share of recent runs that fell back to a sample
    pub fn fallback_rate(&self) -> f64 {
        if self.recent_runs.is_empty() {
            return 0.0;
        }
        let fallbacks = self
            .recent_runs
            .iter()
            .filter(|run| run.summary.used_fallback)
            .count();
        (fallbacks as f64 / self.recent_runs.len() as f64) * 100.0
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - A store that holds both processed URLs and the run ledger
/// * `run_limit` - How many recent runs to load
///
/// # Returns
///
/// * `Ok(DigestStatistics)` - Successfully loaded statistics
/// * `Err(OutputError)` - Failed to query statistics
pub fn load_statistics<S>(storage: &S, run_limit: usize) -> OutputResult<DigestStatistics>
where
    S: UrlStore + RunLog,
{
    Ok(DigestStatistics {
        processed_urls: storage.count()?,
        latest_scraped_at: storage.latest_scraped_at()?,
        recent_runs: storage.recent_runs(run_limit)?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &DigestStatistics) {
    println!("=== Digest Statistics ===\n");

    println!("Store:");
    println!("  Processed URLs: {}", stats.processed_urls);
    match stats.latest_scraped_at {
        Some(at) => println!("  Last scraped: {}", at.to_rfc3339()),
        None => println!("  Last scraped: never"),
    }
    println!();

    if stats.recent_runs.is_empty() {
        println!("No runs recorded.");
        return;
    }

    println!("Recent Runs ({}):", stats.recent_runs.len());
    for run in &stats.recent_runs {
        println!(
            "  #{} {} [{}] candidates={} delta={} fallback={} articles={}",
            run.id,
            run.started_at,
            run.status.to_db_string(),
            run.summary.candidates,
            run.summary.delta,
            if run.summary.used_fallback { "yes" } else { "no" },
            run.summary.articles
        );
    }
    println!();

    println!("Fallback Rate: {:.1}% of recent runs", stats.fallback_rate());
}
