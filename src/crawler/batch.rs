//! Batch processing of a work-list
//!
//! Articles are fetched with bounded concurrency but collected in input
//! order. A failed article is logged and skipped; the batch itself never
//! fails.

use crate::article::ArticleRecord;
use crate::crawler::article::ArticleFetcher;
use futures::stream::{self, StreamExt};

/// Outcome of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Successfully scraped articles, in work-list order
    pub articles: Vec<ArticleRecord>,

    /// Primary-language titles of `articles`, in the same order
    pub titles: Vec<String>,

    /// URLs that could not be scraped
    pub failed: Vec<String>,
}

impl BatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

/// Drives the article fetcher over a work-list
pub struct BatchProcessor {
    fetcher: ArticleFetcher,
    concurrency: usize,
}

impl BatchProcessor {
    pub fn new(fetcher: ArticleFetcher) -> Self {
        Self {
            fetcher,
            concurrency: 1,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Processes the work-list and returns the records and their titles
    ///
    /// An empty work-list yields two empty sequences.
    pub async fn process(&self, urls: &[String]) -> (Vec<ArticleRecord>, Vec<String>) {
        let outcome = self.run(urls).await;
        (outcome.articles, outcome.titles)
    }

    /// Like [`process`](Self::process), also reporting the failed URLs
    pub async fn run(&self, urls: &[String]) -> BatchOutcome {
        let total = urls.len();

        let results: Vec<_> = stream::iter(urls.iter().enumerate())
            .map(|(index, url)| async move {
                tracing::info!(url = %url, position = index + 1, total, "Processing article");
                (url, self.fetcher.fetch(url).await)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut outcome = BatchOutcome::default();
        for (url, result) in results {
            match result {
                Ok(record) => {
                    outcome.titles.push(record.title_primary().to_string());
                    outcome.articles.push(record);
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Skipping article");
                    outcome.failed.push(url.clone());
                }
            }
        }

        tracing::info!(
            succeeded = outcome.articles.len(),
            failed = outcome.failed.len(),
            "Batch complete"
        );

        outcome
    }
}
