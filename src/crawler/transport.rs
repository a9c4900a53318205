//! HTTP transport capability
//!
//! The engine never talks to `reqwest` directly. It goes through the
//! [`Transport`] trait, so tests can substitute scripted responses and
//! callers can plug in their own client.

use crate::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// What a transport hands back for a completed GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, decoded to text
    pub body: String,
}

/// Capability to issue GET requests
///
/// Implementations are shared read-only across every in-flight unit of work,
/// so they must be `Send + Sync` and must not need `&mut self`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET for `url` with the given extra headers and timeout
    ///
    /// A response with any status code is `Ok`; only failures to get a
    /// response at all are errors.
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError>;
}

/// Builds the HTTP client used by [`ReqwestTransport`]
///
/// The per-request timeout is supplied on every call; the client only
/// carries a connect timeout.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Transport`] backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with a freshly built client
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client()?))
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", url, e)))?;

        let mut request = self.client.get(parsed).timeout(timeout);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(classify_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify_error)?;

        Ok(TransportResponse { status, body })
    }
}

/// Maps a reqwest error onto the transport error taxonomy
fn classify_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else if error.is_builder() {
        TransportError::InvalidUrl(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}
