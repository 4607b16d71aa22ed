//! Configuration module for Affairs-Digest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use affairs_digest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("digest.toml")).unwrap();
//! println!("Scanning {} listing pages", config.site.page_count);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, SiteConfig, StorageConfig, TelegramConfig,
    TranslationConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
