//! HTTP transport port and its reqwest adapter
//!
//! Every transport failure is classified here into an `UpstreamErrorKind`
//! before the retry policy or the lookup services look at it.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use thiserror::Error;

use crate::retry::Retryable;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest slice of an error body kept in `UpstreamError::message`
const MAX_ERROR_BODY: usize = 200;

/// Closed set of upstream failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// 404
    NotFound,
    /// 429
    RateLimited,
    /// 500..=599
    ServerError,
    /// Any other non-success status
    ClientError,
    /// No status: connect failure, timeout, broken body
    NetworkError,
}

impl UpstreamErrorKind {
    pub fn from_status(status: Option<u16>) -> Self {
        match status {
            None => UpstreamErrorKind::NetworkError,
            Some(404) => UpstreamErrorKind::NotFound,
            Some(429) => UpstreamErrorKind::RateLimited,
            Some(500..=599) => UpstreamErrorKind::ServerError,
            Some(_) => UpstreamErrorKind::ClientError,
        }
    }
}

impl fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UpstreamErrorKind::NotFound => "not found",
            UpstreamErrorKind::RateLimited => "rate limited",
            UpstreamErrorKind::ServerError => "server error",
            UpstreamErrorKind::ClientError => "client error",
            UpstreamErrorKind::NetworkError => "network error",
        };
        f.write_str(label)
    }
}

/// A failed upstream request
#[derive(Debug, Clone, Error)]
#[error("{kind} from {url}: {message}")]
pub struct UpstreamError {
    pub kind: UpstreamErrorKind,
    pub status: Option<u16>,
    pub url: String,
    pub message: String,
}

impl UpstreamError {
    /// Builds an error from a non-success HTTP status
    pub fn from_status(url: impl Into<String>, status: u16, body: &str) -> Self {
        let message = if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            let snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
            format!("HTTP {}: {}", status, snippet)
        };
        Self {
            kind: UpstreamErrorKind::from_status(Some(status)),
            status: Some(status),
            url: url.into(),
            message,
        }
    }

    /// Builds an error for a failure that produced no status
    pub fn network(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            kind: UpstreamErrorKind::NetworkError,
            status: None,
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == UpstreamErrorKind::NotFound
    }
}

impl Retryable for UpstreamError {
    fn status(&self) -> Option<u16> {
        self.status
    }
}

/// A base URL that request paths cannot be appended to, like `mailto:`
#[derive(Debug, Clone, Error)]
#[error("base URL cannot take path segments: '{0}'")]
pub struct BaseUrlError(pub String);

/// Returns `url` if path segments can be pushed onto it
pub fn check_base_url(url: Url) -> Result<Url, BaseUrlError> {
    if url.cannot_be_a_base() {
        return Err(BaseUrlError(url.into()));
    }
    Ok(url)
}

/// Port for the two HTTP calls the services make
///
/// Implementations return the response body on a 2xx status and an
/// `UpstreamError` otherwise.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, UpstreamError>;

    async fn post_json(&self, url: &str, body: &serde_json::Value)
        -> Result<String, UpstreamError>;
}

/// `HttpTransport` over a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Creates a transport with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn read_body(url: &str, response: Response) -> Result<String, UpstreamError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::from_status(url, status.as_u16(), &body));
        }
        response
            .text()
            .await
            .map_err(|e| UpstreamError::network(url, e))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<String, UpstreamError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UpstreamError::network(url, e))?;
        Self::read_body(url, response).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<String, UpstreamError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| UpstreamError::network(url, e))?;
        Self::read_body(url, response).await
    }
}
