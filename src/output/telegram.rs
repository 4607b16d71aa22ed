//! Telegram delivery
//!
//! Documents go out with `sendDocument`. Telegram limits captions to 1024
//! characters, so a longer summary is cut short on the document and then
//! posted in full with `sendMessage`.

use crate::config::TelegramConfig;
use crate::output::html::display_date;
use crate::output::traits::Sender;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::fmt;
use std::path::Path;

/// Longest caption Telegram accepts on a document
pub const CAPTION_LIMIT: usize = 1024;

/// Builds the default summary for a day's digest
///
/// # Example
///
/// ```
/// use affairs_digest::output::default_summary;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
/// let summary = default_summary(date, &["RBI keeps rates".to_string()], "@CurrentAdda");
/// assert!(summary.starts_with("Current Affairs for 7 May 2024"));
/// ```
pub fn default_summary(date: NaiveDate, titles: &[String], channel: &str) -> String {
    let mut summary = format!("Current Affairs for {}", display_date(date));

    if !titles.is_empty() {
        summary.push_str("\n\n");
        let topics: Vec<String> = titles
            .iter()
            .enumerate()
            .map(|(i, title)| format!("{}. {}", i + 1, title))
            .collect();
        summary.push_str(&topics.join("\n"));
    }

    if channel.starts_with('@') {
        summary.push_str(&format!("\n\nFollow {} for daily updates!", channel));
    }

    summary
}

/// Fits a caption into the document caption limit
///
/// # Returns
///
/// The caption to attach, and whether it was truncated
pub fn truncate_caption(caption: &str) -> (String, bool) {
    if caption.chars().count() <= CAPTION_LIMIT {
        return (caption.to_string(), false);
    }

    let mut short: String = caption.chars().take(CAPTION_LIMIT - 3).collect();
    short.push_str("...");
    (short, true)
}

/// Sends documents through the Telegram Bot API
pub struct TelegramSender {
    client: Client,
    api_base: String,
    token: Option<String>,
    channel: String,
}

impl fmt::Debug for TelegramSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramSender")
            .field("api_base", &self.api_base)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("channel", &self.channel)
            .finish()
    }
}

impl TelegramSender {
    pub fn new(client: Client, api_base: &str, token: Option<String>, channel: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            channel: channel.to_string(),
        }
    }

    /// Builds a sender from `[telegram]`, reading the token from the
    /// configured environment variable
    pub fn from_config(config: &TelegramConfig, client: Client) -> Self {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty());
        if token.is_none() {
            tracing::warn!(variable = %config.token_env, "Telegram bot token not set");
        }
        Self::new(client, &config.api_base, token, &config.channel)
    }

    fn method_url(&self, token: &str, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, token, method)
    }

    async fn send_document(&self, token: &str, document: &Path, caption: &str) -> Result<(), String> {
        let bytes = tokio::fs::read(document)
            .await
            .map_err(|e| format!("failed to read {}: {}", document.display(), e))?;

        let file_name = document
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "digest.html".to_string());

        let form = Form::new()
            .text("chat_id", self.channel.clone())
            .text("caption", caption.to_string())
            .part("document", Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(self.method_url(token, "sendDocument"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        check_status(response.status())
    }

    async fn send_message(&self, token: &str, text: &str) -> Result<(), String> {
        let response = self
            .client
            .post(self.method_url(token, "sendMessage"))
            .form(&[("chat_id", self.channel.as_str()), ("text", text)])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        check_status(response.status())
    }
}

fn check_status(status: reqwest::StatusCode) -> Result<(), String> {
    if status.is_success() {
        Ok(())
    } else {
        Err(format!("Telegram returned HTTP {}", status.as_u16()))
    }
}

#[async_trait]
impl Sender for TelegramSender {
    async fn send(&self, document: &Path, summary: &str) -> bool {
        let Some(token) = self.token.as_deref() else {
            tracing::error!("Cannot send document: Telegram bot token missing");
            return false;
        };

        let (caption, truncated) = truncate_caption(summary);

        if let Err(e) = self.send_document(token, document, &caption).await {
            tracing::error!(document = %document.display(), error = %e, "Failed to send document");
            return false;
        }

        if truncated {
            if let Err(e) = self.send_message(token, summary).await {
                tracing::error!(error = %e, "Failed to send full summary");
                return false;
            }
        }

        tracing::info!(channel = %self.channel, document = %document.display(), "Document delivered");
        true
    }
}
