//! Renderer and sender traits
//!
//! The digest hands its articles to a [`Renderer`] and the resulting file to
//! a [`Sender`]. Both are narrow boundaries so the pipeline can be driven
//! with other formats or channels.

use crate::article::ArticleRecord;
use crate::storage::StorageError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Turns article records into a document on disk
pub trait Renderer: Send + Sync {
    /// Renders the articles and returns the document path
    ///
    /// # Arguments
    ///
    /// * `articles` - The records, in the order they should appear
    /// * `titles` - Primary-language titles for the cover page
    fn render(&self, articles: &[ArticleRecord], titles: &[String]) -> OutputResult<PathBuf>;
}

/// Delivers a rendered document to a channel
#[async_trait]
pub trait Sender: Send + Sync {
    /// Sends the document with a summary text
    ///
    /// # Returns
    ///
    /// `true` if the channel accepted the document; failures are logged
    /// rather than returned
    async fn send(&self, document: &Path, summary: &str) -> bool;
}
