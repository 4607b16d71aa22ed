//! Affairs-Digest: an incremental current-affairs digest builder
//!
//! This crate pages through a current-affairs listing site, skips the articles
//! it has already processed, scrapes and translates the fresh ones, renders a
//! bilingual document and delivers it to a messaging channel.

pub mod article;
pub mod config;
pub mod crawler;
pub mod output;
pub mod pipeline;
pub mod retry;
pub mod storage;
pub mod translate;
pub mod url;

use thiserror::Error;

/// Main error type for Affairs-Digest operations
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Missing {element} on {url}")]
    MissingElement { url: String, element: &'static str },

    #[error("Image error for {url}: {message}")]
    Image { url: String, message: String },

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("No candidate article URLs were discovered")]
    NoCandidates,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DigestError {
    /// Returns true if retrying the same call may succeed
    ///
    /// Timeouts, connection failures, HTTP 429 and HTTP 5xx are transient.
    /// Missing page structure, other 4xx codes and local errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::Http { source, .. } | Self::Reqwest(source) => {
                source.is_timeout() || source.is_connect()
            }
            Self::Translation(_) => true,
            _ => false,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Affairs-Digest operations
pub type Result<T> = std::result::Result<T, DigestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use article::{ArticleRecord, BilingualText, BlockKind, ContentBlock};
pub use config::Config;
pub use url::{normalize_url, should_include};
