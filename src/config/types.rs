use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default catalog root of the library
pub const DEFAULT_BASE_URL: &str = "https://tululu.org/";

/// Science fiction, the category the harvester was written for
pub const DEFAULT_CATEGORY_ID: u32 = 55;

/// Pause between attempts after a transient network failure
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 10;

/// Main configuration structure for Tululu-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
}

/// Which site and which catalog to walk
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Root URL of the library, catalog pages are resolved against it
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Numeric category identifier (`/l{id}/` on the site)
    #[serde(rename = "category-id")]
    pub category_id: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            category_id: DEFAULT_CATEGORY_ID,
        }
    }
}

/// HTTP client behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Wait before repeating a request that failed at the network level (seconds)
    #[serde(rename = "retry-delay-secs")]
    pub retry_delay_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("tululu-harvest/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination root for `books/` and `images/`
    #[serde(rename = "dest-folder")]
    pub dest_folder: PathBuf,

    /// Directory receiving `books_descriptions.json` (defaults to `dest-folder`)
    #[serde(rename = "json-path")]
    pub json_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dest_folder: PathBuf::from("attachments"),
            json_path: None,
        }
    }
}

impl OutputConfig {
    /// Directory the descriptions dataset is written to
    pub fn json_dir(&self) -> PathBuf {
        self.json_path
            .clone()
            .unwrap_or_else(|| self.dest_folder.clone())
    }
}
