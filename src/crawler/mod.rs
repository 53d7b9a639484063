//! Crawler module for catalog walking and book harvesting
//!
//! This module contains the core harvesting logic, including:
//! - HTTP transport with redirect-as-absent classification
//! - The retry loop for transient network failures
//! - HTML extraction of catalog and book pages
//! - Catalog page enumeration
//! - Per-book harvesting and asset retrieval

mod enumerator;
mod fetcher;
mod harvester;
mod parser;
mod retry;

pub use enumerator::{Catalog, PageEnumerator, PageRange};
pub use fetcher::{
    build_http_client, classify_status, is_textual, HttpTransport, RawResponse, ResponseBody,
    StatusClass, Transport, TransportError,
};
pub use harvester::{BookAssets, BookOutcome, HarvestOptions, Harvester};
pub use parser::{
    extract_book_description, extract_catalog_links, extract_last_page_number,
    extract_text_download_link, split_heading, BookPage, ExtractError, TITLE_SEPARATOR,
};
pub use retry::Fetcher;

use crate::config::Config;
use crate::output::{DescriptionSet, HarvestStatistics};
use crate::storage::AssetStore;
use crate::HarvestError;
use std::path::PathBuf;

/// What a run should cover
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// First catalog page; defaults to one before the end page
    pub start_page: Option<u32>,
    /// Catalog page to stop before; defaults to the last page number
    /// shown on the category root
    pub end_page: Option<u32>,
    pub harvest: HarvestOptions,
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub range: PageRange,
    /// Where `books_descriptions.json` was written
    pub descriptions_path: PathBuf,
    /// Number of descriptions in the dataset
    pub descriptions: usize,
    pub stats: HarvestStatistics,
}

/// Runs a complete harvest over the network
///
/// This is the main entry point. It will:
/// 1. Build the HTTP client from the configuration
/// 2. Resolve the page range (querying the category root if needed)
/// 3. Enumerate book pages
/// 4. Harvest every book
/// 5. Persist the descriptions dataset
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `options` - Page range and asset selection
///
/// # Returns
///
/// * `Ok(HarvestReport)` - Harvest completed, dataset written
/// * `Err(HarvestError)` - Setup or final persistence failed
pub async fn harvest(config: &Config, options: RunOptions) -> Result<HarvestReport, HarvestError> {
    let transport = HttpTransport::new(&config.http)?;
    harvest_with_transport(config, transport, options).await
}

/// Runs a complete harvest over the given transport
///
/// Per-page and per-book failures are logged and skipped; only an unusable
/// configuration or a failure to write the dataset ends the run with an
/// error. When the default end page cannot be discovered the range is empty
/// and an empty dataset is still written.
pub async fn harvest_with_transport<T: Transport>(
    config: &Config,
    transport: T,
    options: RunOptions,
) -> Result<HarvestReport, HarvestError> {
    crate::config::validate(config)?;

    let fetcher = Fetcher::new(transport, config.http.retry_delay());
    let catalog = Catalog::from_config(&config.site)?;
    let enumerator = PageEnumerator::new(&fetcher, catalog);

    let range = resolve_page_range(&enumerator, options.start_page, options.end_page).await;
    tracing::info!(
        "Harvesting category {} pages {}..{} into {}",
        config.site.category_id,
        range.start,
        range.end,
        config.output.dest_folder.display()
    );

    let mut stats = HarvestStatistics::default();
    let book_urls = enumerator.enumerate(range, &mut stats).await;

    let assets = AssetStore::new(config.output.dest_folder.clone());
    let harvester = Harvester::new(&fetcher, assets, options.harvest);
    let mut descriptions = DescriptionSet::new();
    harvester
        .harvest(&book_urls, &mut descriptions, &mut stats)
        .await;

    stats.retries = fetcher.retries();
    let descriptions_path = descriptions.persist(&config.output.json_dir())?;

    Ok(HarvestReport {
        range,
        descriptions_path,
        descriptions: descriptions.len(),
        stats,
    })
}

/// Fills in the page bounds the caller left open
///
/// Without an end page the category root is fetched and its last page
/// number is used; without a start page the range covers the single page
/// before the end. If the category root is absent or has no usable
/// pagination control, the range is empty.
pub async fn resolve_page_range<T: Transport>(
    enumerator: &PageEnumerator<'_, T>,
    start_page: Option<u32>,
    end_page: Option<u32>,
) -> PageRange {
    let category_id = enumerator.catalog().category_id;
    let end = match end_page {
        Some(end) => end,
        None => match enumerator.last_page_number().await {
            Ok(last) => {
                tracing::info!("Category {} has {} pages", category_id, last);
                last
            }
            Err(e) => {
                tracing::error!(
                    "Cannot find the last page of category {}, nothing to harvest: {}",
                    category_id,
                    e
                );
                let start = start_page.unwrap_or(1);
                return PageRange::new(start, start);
            }
        },
    };
    let start = start_page.unwrap_or_else(|| end.saturating_sub(1).max(1));
    PageRange::new(start, end)
}
