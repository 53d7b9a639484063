//! Storage module for downloaded book assets
//!
//! This module handles everything written under the destination root apart
//! from the descriptions dataset:
//! - `books/<sanitized title>.txt` for the text bodies
//! - `images/<final URL segment>` for the cover images
//! - Filename sanitization for titles taken from the site

mod assets;
mod filename;

pub use assets::{
    book_relative_path, image_relative_path, AssetStore, BOOKS_DIR, IMAGES_DIR,
    MAX_BOOK_NAME_BYTES, TEXT_EXTENSION,
};
pub use filename::{sanitize_filename, MAX_FILENAME_BYTES};

use crate::crawler::TransportError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while retrieving an asset
#[derive(Debug, Error)]
pub enum AssetError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot derive a file name from {0}")]
    InvalidFileName(String),
}

impl AssetError {
    /// Whether the site reported the asset as absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_not_found())
    }
}

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;
