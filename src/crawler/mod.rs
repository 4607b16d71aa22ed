//! Crawler module: listing discovery and article scraping
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Link extraction from listing pages
//! - Crawl coordination and work-list selection
//! - Article parsing, image normalisation and batch processing

mod article;
mod batch;
mod coordinator;
mod extractor;
mod fetcher;
mod image;

pub use article::{parse_article, ArticleFetcher, ParsedArticle, RawBlock};
pub use batch::{BatchOutcome, BatchProcessor};
pub use coordinator::{
    compute_delta, select_work_list, CrawlCoordinator, WorkList, WorkSource,
};
pub use extractor::{
    extract_from_document, extract_links, heading_links, home_items, teaser_cards, LinkSet,
    Strategy, STRATEGIES,
};
pub use fetcher::{build_http_client, retry_policy, HttpFetcher};
pub use image::{normalize_image, MIN_IMAGE_BYTES};

use crate::config::Config;
use crate::storage::SharedStore;
use crate::translate::Translator;
use crate::Result;
use std::sync::Arc;

/// Builds a crawl coordinator from the configuration
pub fn coordinator_from_config(
    config: &Config,
    fetcher: HttpFetcher,
    store: Option<SharedStore>,
) -> CrawlCoordinator {
    CrawlCoordinator::new(fetcher, store)
        .with_concurrency(config.crawler.max_concurrent_fetches)
        .with_fallback_sample_size(config.site.fallback_sample_size)
        .with_max_articles(config.site.max_articles)
}

/// Builds a batch processor from the configuration
pub fn batch_from_config(
    config: &Config,
    fetcher: HttpFetcher,
    translator: Arc<dyn Translator>,
    store: Option<SharedStore>,
) -> BatchProcessor {
    let articles = ArticleFetcher::new(fetcher, translator, store)
        .with_ancestor_depth(config.crawler.ancestor_depth);
    BatchProcessor::new(articles).with_concurrency(config.crawler.max_concurrent_fetches)
}

/// Runs the crawl described by the configuration
///
/// # Returns
///
/// * `Ok(WorkList)` - The URLs to process this run
/// * `Err(DigestError)` - The HTTP client could not be built or the base URL
///   is malformed
pub async fn crawl(config: &Config, store: Option<SharedStore>) -> Result<WorkList> {
    let fetcher = HttpFetcher::from_config(config)?;
    coordinator_from_config(config, fetcher, store)
        .crawl(&config.site.base_url, config.site.page_count)
        .await
}
