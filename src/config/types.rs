use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Affairs-Digest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// The listing site being digested
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteConfig {
    /// URL of the first listing page
    pub base_url: String,

    /// Number of listing pages to scan
    #[serde(default = "default_page_count")]
    pub page_count: u32,

    /// Size of the random sample used when nothing new was found
    #[serde(default = "default_fallback_sample_size")]
    pub fallback_sample_size: usize,

    /// Optional cap on the number of articles processed per run
    #[serde(default)]
    pub max_articles: Option<usize>,
}

/// Fetch behaviour configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of listing pages or articles fetched at once
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Timeout for listing and article requests (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Timeout for image downloads (seconds)
    #[serde(default = "default_image_timeout_secs")]
    pub image_timeout_secs: u64,

    /// Attempts per request, including the first
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry (milliseconds)
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// How many ancestor levels are checked when stripping non-content blocks
    #[serde(default = "default_ancestor_depth")]
    pub ancestor_depth: usize,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent_fetches(),
            request_timeout_secs: default_request_timeout_secs(),
            image_timeout_secs: default_image_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            ancestor_depth: default_ancestor_depth(),
        }
    }
}

/// User agent sent with every request
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(default = "default_user_agent")]
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: default_user_agent(),
        }
    }
}

/// Processed-URL store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Path to the SQLite database file
    pub database_path: String,
}

/// Translation service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TranslationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_translate_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_source_language")]
    pub source_language: String,

    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Inputs longer than this many characters are split into chunks
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Attempts per chunk, including the first
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Lower bound of the random pause before each request (milliseconds)
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the random pause before each request (milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_translate_endpoint(),
            source_language: default_source_language(),
            target_language: default_target_language(),
            chunk_size: default_chunk_size(),
            max_retries: default_max_retries(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Rendered document configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory the document is written into
    pub directory: String,

    /// File name suffix after the date, e.g. `19-10-2026_Current_Affairs.html`
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,

    /// Document title shown on the cover
    #[serde(default = "default_title")]
    pub title: String,
}

/// Telegram delivery configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,

    /// Channel or chat ID, e.g. `@CurrentAdda`
    #[serde(default)]
    pub channel: String,

    /// Environment variable holding the bot token
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base: default_telegram_api_base(),
            channel: String::new(),
            token_env: default_token_env(),
        }
    }
}

fn default_page_count() -> u32 {
    3
}

fn default_fallback_sample_size() -> usize {
    2
}

fn default_max_concurrent_fetches() -> usize {
    1
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_image_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_ancestor_depth() -> usize {
    6
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

fn default_true() -> bool {
    true
}

fn default_translate_endpoint() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "gu".to_string()
}

fn default_chunk_size() -> usize {
    4000
}

fn default_min_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    2000
}

fn default_file_suffix() -> String {
    "Current_Affairs".to_string()
}

fn default_title() -> String {
    "Current Affairs".to_string()
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_token_env() -> String {
    "TELEGRAM_BOT_TOKEN".to_string()
}
