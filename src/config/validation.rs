use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, SiteConfig, StorageConfig, TelegramConfig,
    TranslationConfig,
};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_storage_config(&config.storage)?;
    validate_translation_config(&config.translation)?;
    validate_output_config(&config.output)?;
    validate_telegram_config(&config.telegram)?;
    Ok(())
}

/// Validates the listing site configuration
fn validate_site_config(config: &SiteConfig) -> ConfigResult<()> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            config.base_url
        )));
    }

    if config.page_count < 1 || config.page_count > 50 {
        return Err(ConfigError::Validation(format!(
            "page_count must be between 1 and 50, got {}",
            config.page_count
        )));
    }

    if config.fallback_sample_size < 1 {
        return Err(ConfigError::Validation(
            "fallback_sample_size must be >= 1".to_string(),
        ));
    }

    if config.max_articles == Some(0) {
        return Err(ConfigError::Validation(
            "max_articles must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates fetch behaviour configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 16 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 16, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.request_timeout_secs == 0 || config.image_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request and image timeouts must be at least one second".to_string(),
        ));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> ConfigResult<()> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates translation configuration
fn validate_translation_config(config: &TranslationConfig) -> ConfigResult<()> {
    if !config.enabled {
        return Ok(());
    }

    Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid translation endpoint: {}", e)))?;

    if config.chunk_size < 100 {
        return Err(ConfigError::Validation(format!(
            "chunk_size must be >= 100, got {}",
            config.chunk_size
        )));
    }

    if config.min_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "min_delay_ms ({}) cannot exceed max_delay_ms ({})",
            config.min_delay_ms, config.max_delay_ms
        )));
    }

    if config.source_language.is_empty() || config.target_language.is_empty() {
        return Err(ConfigError::Validation(
            "translation languages cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.file_suffix.is_empty()
        || config
            .file_suffix
            .chars()
            .any(|c| c == '/' || c == '\\')
    {
        return Err(ConfigError::Validation(format!(
            "file_suffix must be a plain file name fragment, got '{}'",
            config.file_suffix
        )));
    }

    Ok(())
}

/// Validates telegram configuration
fn validate_telegram_config(config: &TelegramConfig) -> ConfigResult<()> {
    if !config.enabled {
        return Ok(());
    }

    if config.channel.is_empty() {
        return Err(ConfigError::Validation(
            "telegram channel cannot be empty when telegram is enabled".to_string(),
        ));
    }

    if config.token_env.is_empty() {
        return Err(ConfigError::Validation(
            "telegram token_env cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.api_base)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid telegram api_base: {}", e)))?;

    Ok(())
}
