//! End-to-end digest run
//!
//! One run goes crawl → batch → render → send, recording its counters in
//! the run ledger. Only an empty candidate set aborts the run; every other
//! shortfall degrades it.

use crate::config::Config;
use crate::crawler::{batch_from_config, coordinator_from_config, HttpFetcher, WorkList};
use crate::output::{default_summary, HtmlRenderer, Renderer, Sender, TelegramSender};
use crate::storage::{
    open_storage, open_storage_read_only, RunLog, RunStatus, RunSummary, SharedStore,
    SqliteStorage, StorageError,
};
use crate::translate::{build_translator, Translator};
use crate::{DigestError, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// What a finished run did
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Ledger id, if the store was available
    pub run_id: Option<i64>,

    pub work: WorkList,

    /// Titles of the articles that made it into the document
    pub titles: Vec<String>,

    /// URLs that could not be scraped
    pub failed: Vec<String>,

    /// The rendered document, if anything was rendered
    pub document: Option<PathBuf>,

    /// Whether the document was delivered
    pub delivered: bool,

    pub status: RunStatus,
}

/// A configured digest run
pub struct DigestPipeline {
    config: Config,
    config_hash: String,
    fetcher: HttpFetcher,
    storage: Option<Arc<Mutex<SqliteStorage>>>,
    translator: Arc<dyn Translator>,
    renderer: Box<dyn Renderer>,
    sender: Option<Box<dyn Sender>>,
}

impl DigestPipeline {
    /// Builds the pipeline described by the configuration
    ///
    /// A store that cannot be opened is logged and the run continues without
    /// deduplication or a ledger.
    pub fn from_config(config: Config, config_hash: &str) -> Result<Self> {
        let storage = match open_storage(Path::new(&config.storage.database_path)) {
            Ok(storage) => Some(storage),
            Err(e) => {
                tracing::warn!(
                    path = %config.storage.database_path,
                    error = %e,
                    "URL store unavailable; continuing without it"
                );
                None
            }
        };

        Self::with_components(config, config_hash, storage)
    }

    /// Builds a pipeline that only plans, for dry runs
    ///
    /// The store is opened read-only and only if it already exists, so
    /// planning never creates or modifies the database.
    pub fn for_planning(config: Config, config_hash: &str) -> Result<Self> {
        let path = Path::new(&config.storage.database_path);
        let storage = match open_storage_read_only(path) {
            Ok(Some(storage)) => Some(storage),
            Ok(None) => {
                tracing::info!(
                    path = %config.storage.database_path,
                    "No URL store yet; every candidate counts as new"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    path = %config.storage.database_path,
                    error = %e,
                    "URL store unavailable; continuing without it"
                );
                None
            }
        };

        Self::with_components(config, config_hash, storage)
    }

    fn with_components(
        config: Config,
        config_hash: &str,
        storage: Option<SqliteStorage>,
    ) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(&config)?;
        let storage = storage.map(|storage| Arc::new(Mutex::new(storage)));

        let translator = build_translator(&config.translation, fetcher.client().clone());
        let renderer: Box<dyn Renderer> = Box::new(HtmlRenderer::from_config(&config.output));
        let sender: Option<Box<dyn Sender>> = if config.telegram.enabled {
            Some(Box::new(TelegramSender::from_config(
                &config.telegram,
                fetcher.client().clone(),
            )))
        } else {
            None
        };

        Ok(Self {
            config,
            config_hash: config_hash.to_string(),
            fetcher,
            storage,
            translator,
            renderer,
            sender,
        })
    }

    pub fn with_storage(mut self, storage: Option<Arc<Mutex<SqliteStorage>>>) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_sender(mut self, sender: Option<Box<dyn Sender>>) -> Self {
        self.sender = sender;
        self
    }

    fn shared_store(&self) -> Option<SharedStore> {
        self.storage
            .as_ref()
            .map(|storage| -> SharedStore { storage.clone() })
    }

    /// Crawls and returns the work-list without fetching articles
    pub async fn plan(&self) -> Result<WorkList> {
        coordinator_from_config(&self.config, self.fetcher.clone(), self.shared_store())
            .crawl(&self.config.site.base_url, self.config.site.page_count)
            .await
    }

    /// Runs the whole digest
    ///
    /// # Arguments
    ///
    /// * `send` - Deliver the document when a sender is configured
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` - The run finished, possibly with nothing to do
    /// * `Err(DigestError::NoCandidates)` - No listing page yielded a link
    /// * `Err(DigestError)` - The document could not be written
    pub async fn run(&self, send: bool) -> Result<RunReport> {
        let run_id = self.start_run();

        let work = match self.plan().await {
            Ok(work) => work,
            Err(e) => {
                self.finish_run(run_id, &RunSummary::default(), RunStatus::Failed);
                return Err(e);
            }
        };
        let mut summary = RunSummary {
            candidates: work.candidates as u64,
            delta: work.delta as u64,
            used_fallback: work.used_fallback(),
            articles: 0,
        };

        if work.candidates == 0 {
            self.finish_run(run_id, &summary, RunStatus::Failed);
            return Err(DigestError::NoCandidates);
        }

        let batch = batch_from_config(
            &self.config,
            self.fetcher.clone(),
            self.translator.clone(),
            self.shared_store(),
        );
        let outcome = batch.run(&work.urls).await;
        summary.articles = outcome.articles.len() as u64;

        let mut report = RunReport {
            run_id,
            work,
            titles: outcome.titles.clone(),
            failed: outcome.failed.clone(),
            document: None,
            delivered: false,
            status: RunStatus::NothingToDo,
        };

        if outcome.is_empty() {
            tracing::info!("No articles scraped; nothing to do");
            self.finish_run(run_id, &summary, RunStatus::NothingToDo);
            return Ok(report);
        }

        let document = match self.renderer.render(&outcome.articles, &outcome.titles) {
            Ok(path) => path,
            Err(e) => {
                self.finish_run(run_id, &summary, RunStatus::Failed);
                return Err(e.into());
            }
        };

        if send {
            if let Some(sender) = &self.sender {
                let text = default_summary(
                    Local::now().date_naive(),
                    &outcome.titles,
                    &self.config.telegram.channel,
                );
                report.delivered = sender.send(&document, &text).await;
            } else {
                tracing::debug!("No sender configured; document kept locally");
            }
        }

        report.document = Some(document);
        report.status = RunStatus::Completed;
        self.finish_run(run_id, &summary, RunStatus::Completed);

        Ok(report)
    }

    fn start_run(&self) -> Option<i64> {
        let storage = self.storage.as_ref()?;
        let result = storage
            .lock()
            .map_err(|_| StorageError::Lock)
            .and_then(|mut guard| guard.create_run(&self.config_hash));

        match result {
            Ok(id) => {
                tracing::info!(run_id = id, "Run started");
                Some(id)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to record run start");
                None
            }
        }
    }

    fn finish_run(&self, run_id: Option<i64>, summary: &RunSummary, status: RunStatus) {
        let (Some(storage), Some(run_id)) = (self.storage.as_ref(), run_id) else {
            return;
        };

        let result = storage
            .lock()
            .map_err(|_| StorageError::Lock)
            .and_then(|mut guard| guard.finish_run(run_id, summary, status));

        if let Err(e) = result {
            tracing::warn!(run_id, error = %e, "Failed to record run result");
        }
    }
}
