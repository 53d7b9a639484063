//! Harvest statistics
//!
//! Counters updated by the enumerator and the harvester, reported once the
//! run finishes.

/// Counters for one harvest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestStatistics {
    /// Catalog pages whose links were collected
    pub pages_visited: u64,

    /// Catalog pages abandoned (absent, malformed, failed)
    pub pages_skipped: u64,

    /// Book URLs found on the catalog pages
    pub books_found: u64,

    /// Books with a description and every requested asset
    pub books_complete: u64,

    /// Books with a description but at least one asset missing
    pub books_partial: u64,

    /// Books without a description
    pub books_skipped: u64,

    pub texts_saved: u64,
    pub images_saved: u64,

    /// Waits performed after transient network failures
    pub retries: u64,
}

impl HarvestStatistics {
    /// Books that ended up in the dataset
    pub fn books_described(&self) -> u64 {
        self.books_complete + self.books_partial
    }
}

/// Prints statistics in a human-readable format
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Catalog pages:");
    println!("  Visited: {}", stats.pages_visited);
    println!("  Skipped: {}", stats.pages_skipped);

    println!("\nBooks:");
    println!("  Found:    {}", stats.books_found);
    println!("  Complete: {}", stats.books_complete);
    println!("  Partial:  {}", stats.books_partial);
    println!("  Skipped:  {}", stats.books_skipped);

    println!("\nAssets:");
    println!("  Texts saved:  {}", stats.texts_saved);
    println!("  Images saved: {}", stats.images_saved);

    if stats.retries > 0 {
        println!("\nNetwork retries: {}", stats.retries);
    }
}
