//! Tululu-Harvest main entry point
//!
//! This is the command-line interface for the tululu.org catalog harvester.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tululu_harvest::config::{load_config_with_hash, Config};
use tululu_harvest::crawler::{harvest, HarvestOptions, RunOptions};
use tululu_harvest::output::print_statistics;
use tracing_subscriber::EnvFilter;

/// Tululu-Harvest: download a category of the tululu.org library
///
/// Walks the catalog pages of a category, downloads the text and cover of
/// every book and writes their descriptions to books_descriptions.json.
#[derive(Parser, Debug)]
#[command(name = "tululu-harvest")]
#[command(version)]
#[command(about = "Download books, covers and descriptions from tululu.org", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Category to harvest (defaults to the configured one, 55 out of the box)
    #[arg(long, env = "CATEGORY_ID", value_parser = clap::value_parser!(u32).range(1..))]
    category_id: Option<u32>,

    /// First catalog page to download (default: the page before --end-page)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    start_page: Option<u32>,

    /// Catalog page to stop before (default: the last page of the category)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    end_page: Option<u32>,

    /// Directory receiving books/ and images/
    #[arg(long, value_name = "DIR")]
    dest_folder: Option<PathBuf>,

    /// Directory receiving books_descriptions.json (default: --dest-folder)
    #[arg(long, value_name = "DIR")]
    json_path: Option<PathBuf>,

    /// Do not download cover images
    #[arg(long)]
    skip_imgs: bool,

    /// Do not download book texts
    #[arg(long)]
    skip_txt: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let options = RunOptions {
        start_page: cli.start_page,
        end_page: cli.end_page,
        harvest: HarvestOptions {
            skip_txt: cli.skip_txt,
            skip_imgs: cli.skip_imgs,
        },
    };

    let report = match harvest(&config, options).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!(
        "Harvest completed: {} descriptions written to {}",
        report.descriptions,
        report.descriptions_path.display()
    );

    if !cli.quiet {
        print_statistics(&report.stats);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tululu_harvest=info,warn"),
            1 => EnvFilter::new("tululu_harvest=debug,info"),
            2 => EnvFilter::new("tululu_harvest=trace,debug"),
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

/// Loads the configuration file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(category_id) = cli.category_id {
        config.site.category_id = category_id;
    }
    if let Some(dest_folder) = &cli.dest_folder {
        config.output.dest_folder = dest_folder.clone();
    }
    if let Some(json_path) = &cli.json_path {
        config.output.json_path = Some(json_path.clone());
    }

    tululu_harvest::config::validate(&config)?;
    Ok(config)
}
