//! HTTP transport
//!
//! This module handles every request the harvester makes:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Classifying the response status (success / absent / other)
//! - Classifying client errors (transient network failure or not)
//! - Returning the body as text or raw bytes depending on its content type
//!
//! The library signals a missing book, category or text file by redirecting
//! to another page, so redirects are never followed. A 3xx answer is reported
//! as [`TransportError::NotFound`].

use crate::config::HttpConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, StatusCode};
use thiserror::Error;
use url::Url;

/// Errors a single request can end with
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The site redirected away from the resource: it does not exist
    #[error("Resource absent (redirected) at {url}")]
    NotFound { url: String },

    /// Connection could not be established or was interrupted
    #[error("Network failure for {url}: {message}")]
    Transient { url: String, message: String },

    /// Any other non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The request failed for a reason retrying will not fix
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
}

impl TransportError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Body of a successful response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    /// Textual content, already decoded using the declared charset
    Text(String),
    /// Anything else, untouched
    Binary(Vec<u8>),
}

/// Successful response, parsing is left to the caller
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The requested URL
    pub url: Url,
    /// Content-Type header value (empty when missing)
    pub content_type: String,
    pub body: ResponseBody,
}

impl RawResponse {
    pub fn text(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            content_type: "text/html; charset=utf-8".to_string(),
            body: ResponseBody::Text(body.into()),
        }
    }

    pub fn binary(url: Url, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            url,
            content_type: content_type.to_string(),
            body: ResponseBody::Binary(body),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.body, ResponseBody::Text(_))
    }

    /// Body as text; binary bodies are decoded as UTF-8, lossily
    pub fn into_text(self) -> String {
        match self.body {
            ResponseBody::Text(text) => text,
            ResponseBody::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self.body {
            ResponseBody::Text(text) => text.into_bytes(),
            ResponseBody::Binary(bytes) => bytes,
        }
    }
}

/// Anything that can GET a URL and classify the outcome
///
/// [`HttpTransport`] talks to the network; tests substitute scripted
/// implementations.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<RawResponse, TransportError>;
}

/// Outcome class of an HTTP status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    /// Redirect, the site's "no such resource"
    Absent,
    Failure,
}

/// Classifies a status code
///
/// | Status | Class |
/// |--------|-------|
/// | 2xx | Success |
/// | 3xx | Absent |
/// | anything else | Failure |
pub fn classify_status(status: StatusCode) -> StatusClass {
    if status.is_success() {
        StatusClass::Success
    } else if status.is_redirection() {
        StatusClass::Absent
    } else {
        StatusClass::Failure
    }
}

/// Whether a Content-Type describes textual content
pub fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    mime.starts_with("text/")
        || mime.ends_with("+xml")
        || mime == "application/xml"
        || mime == "application/xhtml+xml"
        || mime == "application/json"
}

/// Maps a reqwest error to a transport error
///
/// Connection, timeout and interrupted-body errors are transient; the rest
/// (malformed request, redirect policy, decoding) are not.
fn classify_request_error(url: &Url, error: reqwest::Error) -> TransportError {
    if error.is_connect() || error.is_timeout() || error.is_request() || error.is_body() {
        TransportError::Transient {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        TransportError::Request {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are disabled so they can be reported as absent resources.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Network-backed [`Transport`]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &Url) -> Result<RawResponse, TransportError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status();
        match classify_status(status) {
            StatusClass::Success => {}
            StatusClass::Absent => {
                tracing::debug!(
                    "{} redirected to {:?}",
                    url,
                    response.headers().get(reqwest::header::LOCATION)
                );
                return Err(TransportError::NotFound {
                    url: url.to_string(),
                });
            }
            StatusClass::Failure => {
                return Err(TransportError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = if is_textual(&content_type) {
            let text = response
                .text()
                .await
                .map_err(|e| classify_request_error(url, e))?;
            ResponseBody::Text(text)
        } else {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| classify_request_error(url, e))?;
            ResponseBody::Binary(bytes.to_vec())
        };

        Ok(RawResponse {
            url: url.clone(),
            content_type,
            body,
        })
    }
}
