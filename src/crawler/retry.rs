//! Retry loop for transient network failures
//!
//! | Outcome | Action |
//! |---------|--------|
//! | Success | Return the response |
//! | Transient network failure | Sleep the fixed delay, repeat the same request |
//! | Redirect (absent) | Return immediately, never retried |
//! | Any other failure | Return immediately |
//!
//! There is no attempt limit: a connectivity outage stalls the harvest
//! instead of dropping pages or books.

use crate::crawler::fetcher::{RawResponse, Transport, TransportError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use url::Url;

/// A [`Transport`] wrapped in the retry-on-transient policy
pub struct Fetcher<T> {
    transport: T,
    retry_delay: Duration,
    retries: AtomicU64,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, retry_delay: Duration) -> Self {
        Self {
            transport,
            retry_delay,
            retries: AtomicU64::new(0),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Number of waits performed so far
    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    /// Fetches `url`, repeating the request after each transient failure
    ///
    /// Never returns [`TransportError::Transient`].
    pub async fn get(&self, url: &Url) -> Result<RawResponse, TransportError> {
        loop {
            match self.transport.fetch(url).await {
                Err(TransportError::Transient { message, .. }) => {
                    self.retries.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        "Could not reach {}: {}. Check the internet connection, retrying in {}s",
                        url,
                        message,
                        self.retry_delay.as_secs()
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                result => return result,
            }
        }
    }
}
