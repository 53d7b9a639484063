//! Catalog page enumeration
//!
//! Walks catalog pages `start..end` of one category and collects the book
//! page URLs listed on them, page-ascending and in document order.
//!
//! # Page Handling
//!
//! | Outcome | Action |
//! |---------|--------|
//! | Transient network failure | Wait, fetch the same page again (see [`Fetcher`]) |
//! | Redirect (absent page or category) | Log, skip this page |
//! | Other HTTP failure | Log, skip this page |
//! | Malformed page | Log, skip this page |
//! | Success | Append the page's book links |

use crate::config::SiteConfig;
use crate::crawler::parser::{extract_catalog_links, extract_last_page_number, ExtractError};
use crate::crawler::{Fetcher, Transport, TransportError};
use crate::output::HarvestStatistics;
use crate::url::{catalog_page_url, category_url};
use crate::HarvestError;
use scraper::Html;
use url::Url;

/// Half-open range of catalog page numbers, `start..end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// True when `start >= end`; such a range issues no request
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn pages(&self) -> std::ops::Range<u32> {
        self.start..self.end
    }
}

/// Address of one category on the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub base_url: Url,
    pub category_id: u32,
}

impl Catalog {
    pub fn new(base_url: Url, category_id: u32) -> Self {
        Self {
            base_url,
            category_id,
        }
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self, HarvestError> {
        Ok(Self::new(Url::parse(&config.base_url)?, config.category_id))
    }

    pub fn root_url(&self) -> Result<Url, HarvestError> {
        Ok(category_url(&self.base_url, self.category_id)?)
    }

    pub fn page_url(&self, page: u32) -> Result<Url, HarvestError> {
        Ok(catalog_page_url(&self.base_url, self.category_id, page)?)
    }
}

/// Collects book page URLs from a range of catalog pages
pub struct PageEnumerator<'a, T> {
    fetcher: &'a Fetcher<T>,
    catalog: Catalog,
}

impl<'a, T: Transport> PageEnumerator<'a, T> {
    pub fn new(fetcher: &'a Fetcher<T>, catalog: Catalog) -> Self {
        Self { fetcher, catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Reads the last page number from the category root page
    ///
    /// Used when the caller does not name an end page.
    pub async fn last_page_number(&self) -> Result<u32, HarvestError> {
        let url = self.catalog.root_url()?;
        let response = self.fetcher.get(&url).await?;
        let document = Html::parse_document(&response.into_text());
        Ok(extract_last_page_number(&document)?)
    }

    /// Book page URLs listed on pages `start_page..end_page`
    pub async fn enumerate_book_urls(&self, start_page: u32, end_page: u32) -> Vec<Url> {
        let mut stats = HarvestStatistics::default();
        self.enumerate(PageRange::new(start_page, end_page), &mut stats)
            .await
    }

    /// Book page URLs listed on the pages of `range`, updating `stats`
    pub async fn enumerate(&self, range: PageRange, stats: &mut HarvestStatistics) -> Vec<Url> {
        let mut book_urls = Vec::new();

        if range.is_empty() {
            tracing::info!(
                "Empty page range {}..{}, nothing to enumerate",
                range.start,
                range.end
            );
            return book_urls;
        }

        tracing::info!(
            "Enumerating category {} pages {}..{}",
            self.catalog.category_id,
            range.start,
            range.end
        );

        for page in range.pages() {
            match self.collect_page(page).await {
                Ok(links) => {
                    tracing::debug!("Page {}: {} books", page, links.len());
                    stats.pages_visited += 1;
                    book_urls.extend(links);
                }
                Err(e) => {
                    stats.pages_skipped += 1;
                    match &e {
                        HarvestError::Transport(TransportError::NotFound { url }) => {
                            tracing::warn!("Catalog page {} is absent, skipping: {}", page, url)
                        }
                        _ => tracing::warn!("Skipping catalog page {}: {}", page, e),
                    }
                }
            }
        }

        stats.books_found += book_urls.len() as u64;
        tracing::info!("Found {} book pages", book_urls.len());
        book_urls
    }

    async fn collect_page(&self, page: u32) -> Result<Vec<Url>, HarvestError> {
        let url = self.catalog.page_url(page)?;
        let response = self.fetcher.get(&url).await?;
        Ok(parse_catalog_page(&response.into_text(), &url)?)
    }
}

fn parse_catalog_page(html: &str, page_url: &Url) -> Result<Vec<Url>, ExtractError> {
    let document = Html::parse_document(html);
    extract_catalog_links(&document, page_url)
}
