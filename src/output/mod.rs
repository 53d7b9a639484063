//! Output module for the harvest results
//!
//! This module handles:
//! - The per-book description record and its JSON form
//! - The ordered, append-only collection of descriptions persisted once per run
//! - Run statistics reported when the harvest finishes

mod description;
pub mod stats;

pub use description::{BookDescription, DescriptionSet, DESCRIPTIONS_FILE};
pub use stats::{print_statistics, HarvestStatistics};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize descriptions: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
