//! Book harvesting
//!
//! Visits every enumerated book page in order, turns it into a
//! [`BookDescription`], downloads the requested assets and appends the
//! description to the dataset.
//!
//! # Failure Scoping
//!
//! | Failure | Effect |
//! |---------|--------|
//! | Transient network failure | Wait, repeat the same request (page or asset) |
//! | Book page absent or failing | Book skipped, no description |
//! | Malformed book page | Book skipped, no description |
//! | No text link / text absent | Text skipped, image still fetched |
//! | Any other asset failure | Remaining assets skipped, description kept |
//!
//! Nothing that happens to one book stops the run.

use crate::crawler::parser::{extract_book_description, extract_text_download_link, ExtractError};
use crate::crawler::{Fetcher, Transport};
use crate::output::{BookDescription, DescriptionSet, HarvestStatistics};
use crate::storage::{AssetError, AssetStore};
use scraper::Html;
use std::collections::HashSet;
use std::path::PathBuf;
use url::Url;

/// Which assets to download besides the description
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestOptions {
    /// Do not download text bodies
    pub skip_txt: bool,
    /// Do not download cover images
    pub skip_imgs: bool,
}

/// Files written for one book
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookAssets {
    pub text: Option<PathBuf>,
    pub image: Option<PathBuf>,
}

/// Result of harvesting one book page
#[derive(Debug)]
pub enum BookOutcome {
    /// Description recorded, every requested asset saved
    Complete {
        description: BookDescription,
        assets: BookAssets,
    },

    /// Description recorded, some requested asset is missing
    Partial {
        description: BookDescription,
        assets: BookAssets,
        reason: String,
    },

    /// No description could be produced
    Skipped { reason: String },
}

impl BookOutcome {
    pub fn description(&self) -> Option<&BookDescription> {
        match self {
            Self::Complete { description, .. } | Self::Partial { description, .. } => {
                Some(description)
            }
            Self::Skipped { .. } => None,
        }
    }

    pub fn assets(&self) -> Option<&BookAssets> {
        match self {
            Self::Complete { assets, .. } | Self::Partial { assets, .. } => Some(assets),
            Self::Skipped { .. } => None,
        }
    }

    pub fn into_description(self) -> Option<BookDescription> {
        match self {
            Self::Complete { description, .. } | Self::Partial { description, .. } => {
                Some(description)
            }
            Self::Skipped { .. } => None,
        }
    }
}

/// A parsed book page: the description and where its text would come from
struct ParsedBook {
    description: BookDescription,
    text_link: Result<Url, ExtractError>,
}

fn parse_book_page(html: &str, page_url: &Url) -> Result<ParsedBook, ExtractError> {
    let document = Html::parse_document(html);
    let page = extract_book_description(&document, page_url)?;
    let description = BookDescription::from_page(page)?;
    let text_link = extract_text_download_link(&document, page_url);
    Ok(ParsedBook {
        description,
        text_link,
    })
}

/// How a book's name relates to names recorded earlier in the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameReuse {
    First,
    /// Title seen before, no earlier text file was replaced
    Repeated,
    /// This book's text replaced one written earlier in the run
    TextOverwritten,
}

/// Names recorded in the run and names whose text file was written
#[derive(Debug, Default)]
struct NameLedger {
    seen: HashSet<String>,
    written: HashSet<String>,
}

impl NameLedger {
    fn record(&mut self, name: &str, wrote_text: bool) -> NameReuse {
        let repeated = !self.seen.insert(name.to_string());
        let overwrote = wrote_text && !self.written.insert(name.to_string());
        match (repeated, overwrote) {
            (_, true) => NameReuse::TextOverwritten,
            (true, false) => NameReuse::Repeated,
            (false, false) => NameReuse::First,
        }
    }
}

/// Harvests book pages one at a time
pub struct Harvester<'a, T> {
    fetcher: &'a Fetcher<T>,
    assets: AssetStore,
    options: HarvestOptions,
}

impl<'a, T: Transport> Harvester<'a, T> {
    pub fn new(fetcher: &'a Fetcher<T>, assets: AssetStore, options: HarvestOptions) -> Self {
        Self {
            fetcher,
            assets,
            options,
        }
    }

    /// Harvests every URL in order, appending descriptions to `descriptions`
    pub async fn harvest(
        &self,
        urls: &[Url],
        descriptions: &mut DescriptionSet,
        stats: &mut HarvestStatistics,
    ) {
        let mut names = NameLedger::default();

        for (index, url) in urls.iter().enumerate() {
            let outcome = self.harvest_book(url).await;

            if let Some(assets) = outcome.assets() {
                stats.texts_saved += u64::from(assets.text.is_some());
                stats.images_saved += u64::from(assets.image.is_some());
            }

            match &outcome {
                BookOutcome::Complete { .. } => stats.books_complete += 1,
                BookOutcome::Partial { reason, .. } => {
                    stats.books_partial += 1;
                    tracing::warn!("Book {} recorded without all assets: {}", url, reason);
                }
                BookOutcome::Skipped { reason } => {
                    stats.books_skipped += 1;
                    tracing::warn!("Book {} skipped: {}", url, reason);
                }
            }

            let wrote_text = outcome.assets().map_or(false, |a| a.text.is_some());
            if let Some(description) = outcome.into_description() {
                match names.record(&description.name, wrote_text) {
                    NameReuse::First => {}
                    NameReuse::Repeated => tracing::warn!(
                        "Title '{}' seen before in this run",
                        description.name
                    ),
                    NameReuse::TextOverwritten => tracing::warn!(
                        "Title '{}' seen before in this run, {} was overwritten",
                        description.name,
                        description.book_path
                    ),
                }
                descriptions.push(description);
            }

            let done = index + 1;
            if done % 10 == 0 {
                tracing::info!(
                    "Progress: {}/{} books, {} described",
                    done,
                    urls.len(),
                    descriptions.len()
                );
            }
        }
    }

    /// Harvests a single book page
    pub async fn harvest_book(&self, url: &Url) -> BookOutcome {
        tracing::debug!("Harvesting {}", url);

        let response = match self.fetcher.get(url).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                return BookOutcome::Skipped {
                    reason: "book page is absent".to_string(),
                }
            }
            Err(e) => {
                return BookOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
        };

        let parsed = match parse_book_page(&response.into_text(), url) {
            Ok(parsed) => parsed,
            Err(e) => {
                return BookOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
        };

        let ParsedBook {
            description,
            text_link,
        } = parsed;
        let mut assets = BookAssets::default();
        let retrieval = self
            .retrieve_assets(&description, text_link, &mut assets)
            .await;

        match retrieval {
            Ok(missing) if missing.is_empty() => BookOutcome::Complete {
                description,
                assets,
            },
            Ok(missing) => BookOutcome::Partial {
                description,
                assets,
                reason: missing.join("; "),
            },
            Err(e) => {
                tracing::error!(
                    "Asset retrieval for '{}' ({}) failed, keeping its description: {}",
                    description.name,
                    url,
                    e
                );
                BookOutcome::Partial {
                    description,
                    assets,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Downloads the requested assets of one book
    ///
    /// Returns the reasons for tolerated gaps (no text available). An error
    /// means retrieval stopped early; assets saved before it stay in `assets`.
    async fn retrieve_assets(
        &self,
        description: &BookDescription,
        text_link: Result<Url, ExtractError>,
        assets: &mut BookAssets,
    ) -> Result<Vec<String>, AssetError> {
        let mut missing = Vec::new();

        if !self.options.skip_txt {
            match text_link {
                Ok(text_url) => {
                    match self
                        .assets
                        .save_text(self.fetcher, &text_url, &description.name)
                        .await
                    {
                        Ok(path) => assets.text = Some(path),
                        Err(e) if e.is_not_found() => {
                            missing.push(format!("text of '{}' is not available", description.name))
                        }
                        Err(e) => return Err(e),
                    }
                }
                Err(ExtractError::MissingAsset(_)) => {
                    missing.push(format!("'{}' has no text download", description.name))
                }
                Err(e) => missing.push(e.to_string()),
            }
        }

        if !self.options.skip_imgs {
            let img_url = Url::parse(&description.img_src)
                .map_err(|_| AssetError::InvalidFileName(description.img_src.clone()))?;
            assets.image = Some(self.assets.save_image(self.fetcher, &img_url).await?);
        }

        Ok(missing)
    }
}
