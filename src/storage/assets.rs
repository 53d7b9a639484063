//! Writes book text bodies and cover images under the destination root
//!
//! Both kinds of asset are keyed by a name derived from what the site
//! reports: text by the sanitized book title, images by the final segment
//! of the image URL. Two books with the same key share one file and the
//! later download overwrites the earlier one; the site's shared "no image"
//! placeholder relies on this.

use crate::crawler::{Fetcher, Transport};
use crate::storage::{AssetError, AssetResult, MAX_FILENAME_BYTES};
use crate::url::last_path_segment;
use std::path::{Path, PathBuf};
use url::Url;

/// Directory (under the destination root) receiving text bodies
pub const BOOKS_DIR: &str = "books";

/// Directory (under the destination root) receiving cover images
pub const IMAGES_DIR: &str = "images";

/// Extension of stored text bodies
pub const TEXT_EXTENSION: &str = ".txt";

/// Longest book name whose text file name still fits the filesystem limit
pub const MAX_BOOK_NAME_BYTES: usize = MAX_FILENAME_BYTES - TEXT_EXTENSION.len();

/// Path of a book's text body, relative to the destination root
pub fn book_relative_path(book_name: &str) -> String {
    format!("{}/{}{}", BOOKS_DIR, book_name, TEXT_EXTENSION)
}

/// Path of a cover image, relative to the destination root
///
/// Returns None when the URL path has no final segment to name the file by.
pub fn image_relative_path(image_url: &Url) -> Option<String> {
    last_path_segment(image_url).map(|segment| format!("{}/{}", IMAGES_DIR, segment))
}

/// Filesystem side of asset retrieval
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Downloads a text body and stores it as `books/<book_name>.txt`
    ///
    /// Returns the path written.
    pub async fn save_text<T: Transport>(
        &self,
        fetcher: &Fetcher<T>,
        url: &Url,
        book_name: &str,
    ) -> AssetResult<PathBuf> {
        if book_name.is_empty() {
            return Err(AssetError::InvalidFileName(url.to_string()));
        }

        let response = fetcher.get(url).await?;
        let path = self.root.join(book_relative_path(book_name));
        self.write(&path, response.into_text().as_bytes()).await?;

        tracing::debug!("Saved text of '{}' to {}", book_name, path.display());
        Ok(path)
    }

    /// Downloads a cover image and stores it as `images/<final URL segment>`
    ///
    /// Returns the path written.
    pub async fn save_image<T: Transport>(
        &self,
        fetcher: &Fetcher<T>,
        url: &Url,
    ) -> AssetResult<PathBuf> {
        let relative = image_relative_path(url)
            .ok_or_else(|| AssetError::InvalidFileName(url.to_string()))?;

        let response = fetcher.get(url).await?;
        let path = self.root.join(relative);
        self.write(&path, &response.into_bytes()).await?;

        tracing::debug!("Saved image {} to {}", url, path.display());
        Ok(path)
    }

    /// Creates the parent directory if needed and replaces the file content
    async fn write(&self, path: &Path, bytes: &[u8]) -> AssetResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| AssetError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(path, bytes)
            .await
            .map_err(|source| AssetError::Io {
                path: path.to_path_buf(),
                source,
            })
    }
}
