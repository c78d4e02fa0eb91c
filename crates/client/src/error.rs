//! The unified error type returned by every client operation.
//!
//! Both backends' failures collapse into [`ClientError`]. A structured upstream
//! error is [`ClientError::Api`]; an upstream error whose body matched neither
//! envelope shape is [`ClientError::Raw`] and keeps the original bytes.

use std::time::Duration;

use bytes::Bytes;
use protocol::{ApiError, ApiErrorType, RetryPolicy};
use reqwest::StatusCode;
use thiserror::Error;

use crate::transport::TransportError;

/// Error type for dispatch-layer operations.
///
/// Nothing is retried or swallowed: each variant reaches the immediate caller,
/// which may consult [`ClientError::retry_policy`] to decide what to do next.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The call cannot be expressed for the configured backend, or the
    /// configuration itself is unusable.
    ///
    /// Produced before any network traffic, e.g. when a gateway-targeted body
    /// cannot supply a model identifier.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the misuse.
        message: String,
    },

    /// The request body could not be serialised to JSON.
    #[error("Failed to serialise request body: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The transport failed before a complete response was received.
    #[error("Network error: {0}")]
    Network(#[from] TransportError),

    /// A success response arrived but its body did not decode into the
    /// caller's result type.
    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The backend returned a structured error.
    #[error("error, status code: {status}, message: {error}")]
    Api {
        /// HTTP status of the response.
        status: StatusCode,
        /// Decoded `{type, message}` payload.
        #[source]
        error: ApiError,
    },

    /// The backend returned an error whose body matched no known envelope,
    /// or whose body could not be read at all.
    #[error("error, status code: {status}, body: {}", String::from_utf8_lossy(.body))]
    Raw {
        /// HTTP status of the response.
        status: StatusCode,
        /// The response body exactly as received. Empty when reading it failed.
        body: Bytes,
        /// Why decoding or reading failed. `None` when the envelope parsed but
        /// carried no error payload.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ClientError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns the HTTP status for errors produced from a response, including
    /// responses whose body could not be read.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } | Self::Raw { status, .. } => Some(*status),
            Self::Network(e) => e.status(),
            _ => None,
        }
    }

    /// Returns the structured upstream error, if one was decoded.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Returns the decoded error kind, if one was decoded.
    pub fn error_type(&self) -> Option<&ApiErrorType> {
        self.api_error().map(|e| &e.error_type)
    }

    /// Returns the raw body of an undecodable error response.
    pub fn raw_body(&self) -> Option<&Bytes> {
        match self {
            Self::Raw { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns `true` if the backend returned a decoded structured error.
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// Returns `true` if this error was raised before any request was sent.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Classifies whether the failed call may be retried.
    ///
    /// `retry_after` (typically from the response's rate-limit headers) is
    /// attached to retryable outcomes. This is advice only; the client never
    /// retries on its own.
    pub fn retry_policy(&self, retry_after: Option<Duration>) -> RetryPolicy {
        match self {
            Self::Network(_) => RetryPolicy::Retryable { after: retry_after },
            Self::Api { status, .. } | Self::Raw { status, .. } => {
                RetryPolicy::for_status(status.as_u16(), retry_after)
            }
            Self::Configuration { .. } | Self::Serialize(_) | Self::Decode(_) => {
                RetryPolicy::NonRetryable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: StatusCode, kind: &str) -> ClientError {
        ClientError::Api {
            status,
            error: ApiError {
                error_type: ApiErrorType::from(kind.to_owned()),
                message: "nope".into(),
            },
        }
    }

    #[test]
    fn test_api_error_display_carries_status_and_message() {
        let err = api(StatusCode::BAD_REQUEST, "invalid_request_error");
        let text = err.to_string();
        assert!(text.contains("400"), "{text}");
        assert!(text.contains("invalid_request_error: nope"), "{text}");
        assert_eq!(err.error_type(), Some(&ApiErrorType::InvalidRequest));
        assert!(err.is_api_error());
    }

    #[test]
    fn test_raw_error_display_includes_body() {
        let err = ClientError::Raw {
            status: StatusCode::BAD_GATEWAY,
            body: Bytes::from_static(b"<html>upstream down</html>"),
            source: None,
        };
        assert!(err.to_string().contains("upstream down"));
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert!(err.api_error().is_none());
    }

    #[test]
    fn test_network_error_reports_status_of_partial_response() {
        let err = ClientError::from(TransportError::Body {
            status: StatusCode::OK,
            headers: reqwest::header::HeaderMap::new(),
            source: "connection closed".into(),
        });
        assert_eq!(err.status(), Some(StatusCode::OK));
        assert!(err.retry_policy(None).is_retryable());

        let err = ClientError::from(TransportError::Other("refused".into()));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_retry_policy_follows_status() {
        let after = Some(Duration::from_secs(2));
        assert_eq!(
            api(StatusCode::TOO_MANY_REQUESTS, "rate_limit_error").retry_policy(after),
            RetryPolicy::Retryable { after }
        );
        assert_eq!(
            api(StatusCode::UNAUTHORIZED, "authentication_error").retry_policy(after),
            RetryPolicy::NonRetryable
        );
        assert_eq!(
            ClientError::configuration("bad").retry_policy(None),
            RetryPolicy::NonRetryable
        );
    }
}
