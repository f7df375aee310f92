//! bundlewatch CLI
//!
//! Watches a bundle-marketplace listings page and announces new keyword
//! matches to a Discord channel, at most once per listing.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use bundlewatch::{
    error::Result,
    models::Config,
    pipeline::{self, Watcher},
    services::{DiscordNotifier, HttpFetcher},
    storage::{JsonSeenStore, SeenStore},
};

/// bundlewatch - bundle listing watcher
#[derive(Parser, Debug)]
#[command(name = "bundlewatch", version, about = "Bundle listing watcher")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the watcher on its configured interval
    Watch,

    /// Run a single detection cycle and exit
    Scan,

    /// Normalize and deduplicate the persisted seen file
    Clean,

    /// Validate the configuration file
    Validate,

    /// Show seen-set info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Build the full pipeline from configuration.
async fn build_watcher(config: Config) -> Result<Watcher> {
    let config = Arc::new(config);

    let fetcher = Arc::new(HttpFetcher::new(&config.watcher)?);
    let notifier = Arc::new(DiscordNotifier::new(&config.discord)?);
    let store = Arc::new(JsonSeenStore::new(&config.storage.seen_file));

    // Bad credentials should kill the process now, not fail every delivery.
    notifier.validate_token().await?;

    Watcher::new(config, fetcher, notifier, store).await
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(&cli.config)?;
    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Watch => {
            let hours = config.watcher.interval_hours;
            let mut watcher = build_watcher(config).await?;
            log::info!("Watching every {hours} hours");
            watcher.run().await?;
        }

        Command::Scan => {
            let mut watcher = build_watcher(config).await?;
            let outcome = watcher.scan_once().await?;
            log::info!(
                "Scan complete: {} notified, {} delivery failures",
                outcome.notified,
                outcome.delivery_failures
            );
        }

        Command::Clean => {
            let store = JsonSeenStore::new(&config.storage.seen_file);
            let outcome = pipeline::run_clean(&store).await?;
            log::info!(
                "Cleaned {}: {} entries -> {} ({} removed)",
                store.path().display(),
                outcome.before,
                outcome.after,
                outcome.removed()
            );
        }

        Command::Validate => {
            // Config::load already validated; getting here means it passed.
            log::info!("Config OK: {} keywords configured", config.watcher.keywords.len());
        }

        Command::Info => {
            let store = JsonSeenStore::new(&config.storage.seen_file);
            let seen = store.load().await?;
            log::info!("Seen file: {}", store.path().display());
            log::info!("Seen listings: {}", seen.len());
            log::info!("Page: {}", config.watcher.page_url);
            log::info!("Keywords: {}", config.watcher.keywords.join(", "));
        }
    }

    Ok(())
}
