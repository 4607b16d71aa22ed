//! Affairs-Digest main entry point
//!
//! This is the command-line interface for the current-affairs digest builder.

use affairs_digest::config::{load_config_with_hash, Config};
use affairs_digest::crawler::WorkSource;
use affairs_digest::output::{load_statistics, print_statistics, stats::RECENT_RUNS};
use affairs_digest::pipeline::DigestPipeline;
use affairs_digest::storage::{RunStatus, SqliteStorage};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Affairs-Digest: a daily bilingual current-affairs digest
///
/// Affairs-Digest scans the listing pages of a current-affairs site, picks
/// the articles it has not processed before, translates them and delivers
/// a rendered document to a Telegram channel.
#[derive(Parser, Debug)]
#[command(name = "affairs-digest")]
#[command(version = "1.0.0")]
#[command(about = "A daily bilingual current-affairs digest", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Crawl and show the work-list without fetching articles
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Render the document but do not deliver it
    #[arg(long)]
    no_send: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    dotenvy::dotenv().ok();

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.stats {
        handle_stats(&config)?;
    } else if cli.dry_run {
        handle_dry_run(config, &config_hash).await?;
    } else {
        handle_digest(config, &config_hash, !cli.no_send).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("affairs_digest=info,warn"),
            1 => EnvFilter::new("affairs_digest=debug,info"),
            2 => EnvFilter::new("affairs_digest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the work-list a run would process
async fn handle_dry_run(config: Config, config_hash: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Affairs-Digest Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Pages: {}", config.site.page_count);
    println!("  Fallback sample size: {}", config.site.fallback_sample_size);
    if let Some(max) = config.site.max_articles {
        println!("  Max articles: {}", max);
    }

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);

    println!("\nTranslation:");
    if config.translation.enabled {
        println!(
            "  {} -> {} (chunks of {} chars)",
            config.translation.source_language,
            config.translation.target_language,
            config.translation.chunk_size
        );
    } else {
        println!("  Disabled");
    }

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    if config.telegram.enabled {
        println!("  Telegram channel: {}", config.telegram.channel);
    }

    let pipeline = DigestPipeline::for_planning(config, config_hash)?;
    let work = pipeline.plan().await?;

    let label = match work.source {
        WorkSource::Delta => "new articles",
        WorkSource::Fallback => "fallback sample",
        WorkSource::Empty => "nothing discovered",
    };

    println!(
        "\nWork-list ({}; {} candidates, {} new):",
        label, work.candidates, work.delta
    );
    for url in &work.urls {
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.storage.database_path);

    // Open the database
    let storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;

    // Load statistics
    let stats = load_statistics(&storage, RECENT_RUNS)?;

    // Print statistics
    print_statistics(&stats);

    Ok(())
}

/// Handles the main digest run
async fn handle_digest(
    config: Config,
    config_hash: &str,
    send: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Scanning {} listing pages of {}",
        config.site.page_count,
        config.site.base_url
    );

    let pipeline = DigestPipeline::from_config(config, config_hash)?;

    match pipeline.run(send).await {
        Ok(report) => {
            match report.status {
                RunStatus::NothingToDo => tracing::info!("Nothing to do"),
                _ => tracing::info!(
                    articles = report.titles.len(),
                    failed = report.failed.len(),
                    delivered = report.delivered,
                    "Digest completed"
                ),
            }
            if let Some(path) = &report.document {
                println!("✓ Document written to: {}", path.display());
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Digest failed: {}", e);
            Err(e.into())
        }
    }
}
