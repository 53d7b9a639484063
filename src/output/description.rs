//! Book description records and the dataset they are collected in
//!
//! The dataset is written once, after the harvest loop, as
//! `books_descriptions.json`: a UTF-8 JSON array indented with four spaces,
//! non-ASCII text left unescaped, fields in declaration order.

use crate::crawler::{BookPage, ExtractError};
use crate::output::OutputResult;
use crate::storage::{book_relative_path, image_relative_path};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name of the persisted dataset
pub const DESCRIPTIONS_FILE: &str = "books_descriptions.json";

/// Metadata of one harvested book
///
/// Paths are relative to the destination root. `book_path` is set even when
/// the text could not be downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDescription {
    /// Sanitized title, also the file stem of the text body
    pub name: String,
    pub author: String,
    /// Absolute URL of the cover on the site
    pub img_src: String,
    /// Local cover path, `images/<final URL segment>`
    pub img: String,
    /// Local text path, `books/<name>.txt`
    pub book_path: String,
    pub comments: Vec<String>,
    pub genres: Vec<String>,
}

impl BookDescription {
    /// Builds the record from extracted page fields
    ///
    /// # Errors
    ///
    /// `MalformedBookPage` if the cover URL has no final path segment to name
    /// the local image by.
    pub fn from_page(page: BookPage) -> Result<Self, ExtractError> {
        let img = image_relative_path(&page.img_src).ok_or_else(|| {
            ExtractError::MalformedBookPage(format!(
                "cover URL {} has no file name",
                page.img_src
            ))
        })?;

        Ok(Self {
            book_path: book_relative_path(&page.title),
            name: page.title,
            author: page.author,
            img_src: page.img_src.to_string(),
            img,
            comments: page.comments,
            genres: page.genres,
        })
    }
}

/// Ordered, append-only collection of descriptions
#[derive(Debug, Clone, Default)]
pub struct DescriptionSet {
    books: Vec<BookDescription>,
}

impl DescriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, description: BookDescription) {
        self.books.push(description);
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BookDescription> {
        self.books.iter()
    }

    pub fn as_slice(&self) -> &[BookDescription] {
        &self.books
    }

    /// Renders the dataset as JSON with four-space indentation
    pub fn to_json(&self) -> OutputResult<Vec<u8>> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.books.serialize(&mut serializer)?;
        Ok(buffer)
    }

    /// Writes `books_descriptions.json` into `dir`, creating it if needed
    ///
    /// Returns the path of the written file.
    pub fn persist(&self, dir: &Path) -> OutputResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(DESCRIPTIONS_FILE);

        let mut writer = BufWriter::new(File::create(&path)?);
        writer.write_all(&self.to_json()?)?;
        writer.flush()?;

        tracing::info!("Wrote {} descriptions to {}", self.len(), path.display());
        Ok(path)
    }

    /// Reads a dataset written by [`DescriptionSet::persist`]
    pub fn load(path: &Path) -> OutputResult<Self> {
        let content = std::fs::read(path)?;
        let books: Vec<BookDescription> = serde_json::from_slice(&content)?;
        Ok(Self { books })
    }
}
