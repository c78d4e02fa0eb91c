//! Pluggable HTTP transport.
//!
//! The dispatcher never talks to the network directly: it hands a finished
//! [`OutboundRequest`] to an [`HttpTransport`] and receives a fully buffered
//! [`TransportResponse`]. [`ReqwestTransport`] is the production implementation;
//! tests and embedders can substitute their own.
//!
//! Cancellation is the caller's: dropping the future returned by
//! [`HttpTransport::send`] abandons the in-flight call. No timeout or retry is
//! added here beyond what the underlying client is configured with.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use thiserror::Error;

use crate::request::OutboundRequest;

/// The transport failed before a complete response was available.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failure reported by `reqwest` (connect, TLS, body read, invalid URL).
    #[error("HTTP transport failure: {0}")]
    Http(#[from] reqwest::Error),

    /// The status line and headers arrived but reading the body failed
    /// (e.g. the connection closed before `content-length` bytes were read).
    #[error("failed to read response body (status {status}): {source}")]
    Body {
        /// HTTP status of the partial response.
        status: StatusCode,
        /// Response headers as received.
        headers: HeaderMap,
        /// Why the body read failed.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failure reported by a custom transport.
    #[error("transport failure: {0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Returns the HTTP status if a response was received before the failure.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Body { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
            Self::Other(_) => None,
        }
    }

    /// Returns the response headers if they arrived before the failure.
    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            Self::Body { headers, .. } => Some(headers),
            _ => None,
        }
    }
}

/// A complete response: status, headers, and the whole body.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers as received.
    pub headers: HeaderMap,
    /// The complete response body.
    pub body: Bytes,
}

/// Sends one outbound request and returns its buffered response.
///
/// Implementations must be safe to share across tasks; the client holds one
/// instance for its whole lifetime.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `request`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no complete response was received. Any
    /// HTTP status (including errors) is a successful transport outcome. A
    /// failure after the headers arrived must be reported as
    /// [`TransportError::Body`] so the status and headers reach the caller.
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError>;
}

/// [`HttpTransport`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wraps an existing `reqwest` client (connection pool, proxy, TLS settings).
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let (method, url, headers, body) = request.into_parts();

        let response = self
            .client
            .request(method, url)
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        // Reading to the end consumes the response; the connection is released
        // on every path, including a failed read.
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(source) => {
                return Err(TransportError::Body {
                    status,
                    headers,
                    source: Box::new(source),
                })
            }
        };

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
