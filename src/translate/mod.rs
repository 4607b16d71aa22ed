//! Translation service
//!
//! Article titles and content blocks are translated one text unit at a time.
//! A translator never fails its caller: when the service cannot be reached
//! the original text comes back unchanged.

mod google;

pub use google::GoogleTranslator;

use crate::config::TranslationConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

/// Translates text from the source language to the target language
#[async_trait]
pub trait Translator: Send + Sync {
    /// Returns the translation of `text`, or `text` itself on failure
    ///
    /// Empty or whitespace-only input yields an empty string.
    async fn translate(&self, text: &str) -> String;
}

/// A translator that returns its input, used when translation is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(&self, text: &str) -> String {
        if text.trim().is_empty() {
            String::new()
        } else {
            text.to_string()
        }
    }
}

/// Builds the translator described by the `[translation]` table
pub fn build_translator(config: &TranslationConfig, client: Client) -> Arc<dyn Translator> {
    if config.enabled {
        Arc::new(GoogleTranslator::from_config(config, client))
    } else {
        tracing::info!("Translation disabled; keeping source text");
        Arc::new(PassthroughTranslator)
    }
}

/// Splits text into pieces of at most `max_chars` characters
///
/// A split prefers the last whitespace inside the window so words stay whole;
/// a single word longer than the window is cut at the character limit.
/// Splits always land on character boundaries.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > max_chars {
        let window_end = rest
            .char_indices()
            .nth(max_chars)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());

        let split_at = rest[..window_end]
            .rfind(char::is_whitespace)
            .filter(|&idx| idx > 0)
            .unwrap_or(window_end);

        let (head, tail) = rest.split_at(split_at);
        chunks.push(head.trim_end());
        rest = tail.trim_start();
    }

    if !rest.is_empty() {
        chunks.push(rest);
    }

    chunks
}
