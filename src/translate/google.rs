use crate::config::TranslationConfig;
use crate::retry::{retry_async, RetryPolicy};
use crate::translate::{split_into_chunks, Translator};
use crate::{DigestError, Result};
use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Client for the public Google Translate `gtx` endpoint
///
/// Requests are serialised: only one is in flight at a time, and each is
/// preceded by a random pause between the configured minimum and maximum
/// delay.
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
    source_language: String,
    target_language: String,
    chunk_size: usize,
    policy: RetryPolicy,
    min_delay: Duration,
    max_delay: Duration,
    gate: Mutex<()>,
}

impl fmt::Debug for GoogleTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleTranslator")
            .field("client", &"<reqwest::Client>")
            .field("endpoint", &self.endpoint)
            .field("source_language", &self.source_language)
            .field("target_language", &self.target_language)
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl GoogleTranslator {
    pub fn from_config(config: &TranslationConfig, client: Client) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
            chunk_size: config.chunk_size,
            policy: RetryPolicy::new(config.max_retries, Duration::from_secs(2)),
            min_delay: Duration::from_millis(config.min_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            gate: Mutex::new(()),
        }
    }

    /// Replaces the retry policy (tests use a fast one)
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn pause(&self) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min..=max))
    }

    async fn translate_chunk(&self, chunk: &str) -> Result<String> {
        retry_async(&self.policy, "translate", |_| true, move || async move {
            let _permit = self.gate.lock().await;
            let pause = self.pause();
            sleep(pause).await;
            self.request(chunk).await
        })
        .await
    }

    async fn request(&self, chunk: &str) -> Result<String> {
        let response = self
            .client
            .get(self.endpoint.as_str())
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_language.as_str()),
                ("tl", self.target_language.as_str()),
                ("dt", "t"),
                ("q", chunk),
            ])
            .send()
            .await
            .map_err(|e| DigestError::Translation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DigestError::Translation(format!(
                "service returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DigestError::Translation(format!("malformed response: {}", e)))?;

        parse_response(&body)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        let chunks = split_into_chunks(text, self.chunk_size);
        let mut translated = Vec::with_capacity(chunks.len());

        for chunk in &chunks {
            match self.translate_chunk(chunk).await {
                Ok(t) => translated.push(t),
                Err(e) => {
                    let preview: String = text.chars().take(50).collect();
                    tracing::warn!(error = %e, text = %preview, "Translation failed; keeping source text");
                    return text.to_string();
                }
            }
        }

        translated.join(" ")
    }
}

/// Extracts the translated text from a `gtx` response
///
/// The response is a nested array whose first element lists the translated
/// segments; the first entry of each segment is its translation.
fn parse_response(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| DigestError::Translation("response has no segments".to_string()))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        return Err(DigestError::Translation("empty translation".to_string()));
    }

    Ok(text)
}
