//! Crawl coordination
//!
//! The coordinator pages through the listing site, unions the candidate links
//! of every page, subtracts the URLs already in the store and decides the
//! run's work-list:
//! - the delta, in discovery order, when anything new was found
//! - a small random sample of everything found when nothing was new
//! - nothing at all when no page yielded a candidate

use crate::crawler::extractor::{extract_links, LinkSet};
use crate::crawler::fetcher::HttpFetcher;
use crate::storage::{lock_store, SharedStore};
use crate::url::listing_page_url;
use crate::Result;
use futures::stream::{self, StreamExt};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashSet;
use url::Url;

/// How the work-list was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkSource {
    /// Candidates not yet in the store
    Delta,

    /// Random sample of already processed candidates
    Fallback,

    /// No candidates were discovered
    Empty,
}

/// The URLs a run should process, with the counts that produced them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkList {
    pub urls: Vec<String>,
    pub source: WorkSource,

    /// Size of the aggregate candidate set
    pub candidates: usize,

    /// Size of the delta against the store
    pub delta: usize,
}

impl WorkList {
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn used_fallback(&self) -> bool {
        self.source == WorkSource::Fallback
    }
}

/// Computes `aggregate - processed`, keeping the aggregate's order
pub fn compute_delta(aggregate: &[String], processed: &HashSet<String>) -> Vec<String> {
    aggregate
        .iter()
        .filter(|url| !processed.contains(*url))
        .cloned()
        .collect()
}

/// Chooses the work-list from the aggregate and the processed set
///
/// # Arguments
///
/// * `aggregate` - Every candidate discovered, deduplicated, in discovery order
/// * `processed` - URLs already in the store
/// * `sample_size` - Fallback sample size when the delta is empty
/// * `rng` - Randomness source for the fallback sample
///
/// # Returns
///
/// The delta if non-empty; otherwise `min(sample_size, |aggregate|)` distinct
/// URLs drawn from the aggregate; an empty list when the aggregate is empty
pub fn select_work_list<R: Rng + ?Sized>(
    aggregate: &[String],
    processed: &HashSet<String>,
    sample_size: usize,
    rng: &mut R,
) -> WorkList {
    if aggregate.is_empty() {
        return WorkList {
            urls: Vec::new(),
            source: WorkSource::Empty,
            candidates: 0,
            delta: 0,
        };
    }

    let delta = compute_delta(aggregate, processed);
    if !delta.is_empty() {
        return WorkList {
            candidates: aggregate.len(),
            delta: delta.len(),
            urls: delta,
            source: WorkSource::Delta,
        };
    }

    let urls: Vec<String> = aggregate
        .choose_multiple(rng, sample_size.min(aggregate.len()))
        .cloned()
        .collect();

    WorkList {
        urls,
        source: WorkSource::Fallback,
        candidates: aggregate.len(),
        delta: 0,
    }
}

/// Pages through the listing site and builds the run's work-list
pub struct CrawlCoordinator {
    fetcher: HttpFetcher,
    store: Option<SharedStore>,
    concurrency: usize,
    fallback_sample_size: usize,
    max_articles: Option<usize>,
}

impl CrawlCoordinator {
    /// Creates a coordinator that fetches one page at a time and falls back to
    /// a sample of two
    ///
    /// # Arguments
    ///
    /// * `fetcher` - HTTP fetcher used for the listing pages
    /// * `store` - The processed-URL store, or None when it could not be opened
    pub fn new(fetcher: HttpFetcher, store: Option<SharedStore>) -> Self {
        Self {
            fetcher,
            store,
            concurrency: 1,
            fallback_sample_size: 2,
            max_articles: None,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_fallback_sample_size(mut self, sample_size: usize) -> Self {
        self.fallback_sample_size = sample_size;
        self
    }

    pub fn with_max_articles(mut self, max_articles: Option<usize>) -> Self {
        self.max_articles = max_articles;
        self
    }

    /// Runs the crawl
    ///
    /// # Algorithm
    ///
    /// 1. Fetch listing pages `1..=page_count` and extract their links
    /// 2. Union the links in page order; a failing page is logged and skipped
    /// 3. Read the processed set from the store (empty if unavailable)
    /// 4. Select the delta or the fallback sample
    /// 5. Apply the optional `max-articles` cap
    ///
    /// # Returns
    ///
    /// * `Ok(WorkList)` - The work-list, possibly empty
    /// * `Err(DigestError)` - The base URL is malformed
    pub async fn crawl(&self, base_url: &str, page_count: u32) -> Result<WorkList> {
        let aggregate = self.discover(base_url, page_count).await?;
        let processed = self.processed_urls();

        let mut work = {
            let mut rng = rand::rng();
            select_work_list(
                aggregate.as_slice(),
                &processed,
                self.fallback_sample_size,
                &mut rng,
            )
        };

        if let Some(cap) = self.max_articles {
            work.urls.truncate(cap);
        }

        match work.source {
            WorkSource::Delta => tracing::info!(
                candidates = work.candidates,
                delta = work.delta,
                selected = work.urls.len(),
                "New articles found"
            ),
            WorkSource::Fallback => tracing::info!(
                candidates = work.candidates,
                selected = work.urls.len(),
                "No new articles; using a fallback sample"
            ),
            WorkSource::Empty => tracing::warn!("No candidate articles discovered"),
        }

        Ok(work)
    }

    /// Fetches the listing pages and returns the aggregate candidate set
    ///
    /// Pages may be fetched concurrently, but results are merged strictly in
    /// page order so the aggregate does not depend on response timing.
    pub async fn discover(&self, base_url: &str, page_count: u32) -> Result<LinkSet> {
        Url::parse(base_url)?;

        let pages: Vec<(u32, String, Result<LinkSet>)> = stream::iter(1..=page_count)
            .map(|page| {
                let page_url = listing_page_url(base_url, page);
                async move {
                    let links = self.fetch_listing(&page_url).await;
                    (page, page_url, links)
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut aggregate = LinkSet::new();
        for (page, page_url, links) in pages {
            match links {
                Ok(links) => {
                    let before = aggregate.len();
                    let found = links.len();
                    aggregate.merge(links);
                    tracing::info!(
                        page,
                        found,
                        new = aggregate.len() - before,
                        "Listing page scanned"
                    );
                }
                Err(e) => {
                    tracing::warn!(page, url = %page_url, error = %e, "Skipping listing page");
                }
            }
        }

        Ok(aggregate)
    }

    async fn fetch_listing(&self, page_url: &str) -> Result<LinkSet> {
        let body = self.fetcher.fetch_text(page_url).await?;
        let url = Url::parse(page_url)?;
        Ok(extract_links(&body, &url))
    }

    /// Reads the processed set; an unavailable store counts as empty
    fn processed_urls(&self) -> HashSet<String> {
        let Some(store) = &self.store else {
            tracing::warn!("URL store unavailable; treating every candidate as new");
            return HashSet::new();
        };

        match lock_store(store).and_then(|guard| guard.list_all()) {
            Ok(urls) => {
                tracing::debug!(count = urls.len(), "Loaded processed URLs");
                urls
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read URL store; treating every candidate as new");
                HashSet::new()
            }
        }
    }
}
