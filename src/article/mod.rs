//! Article data model
//!
//! This module defines the structured records produced by the article fetcher
//! and consumed by the renderer.

mod block;

pub use block::{BilingualText, BlockKind, ContentBlock};

/// A fully scraped and translated article
///
/// Records are built once by the article fetcher and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    /// The article URL the record was scraped from
    pub source_url: String,

    /// Article title in the source language and its translation
    pub title: BilingualText,

    /// Featured image, re-encoded as PNG
    pub image: Option<Vec<u8>>,

    /// Body content in reading order
    pub content_blocks: Vec<ContentBlock>,
}

impl ArticleRecord {
    /// The title in the source language
    pub fn title_primary(&self) -> &str {
        &self.title.original
    }

    /// The translated title
    pub fn title_translated(&self) -> &str {
        &self.title.translated
    }

    /// Returns true if the article carries a featured image
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}
