//! Error envelopes and retry-classification types for the Anthropic protocol.
//!
//! The two backends report failures in separate envelope shapes:
//!
//! - [`StandardErrorEnvelope`]: `{"type": "error", "error": {"type", "message"}}`,
//!   returned by the direct API and by the gateway for most failures.
//! - [`GatewayErrorEnvelope`]: returned by the gateway for authorization
//!   failures. It carries a `{type, message}` pair (spelled `status` by some
//!   gateway versions) and is always decoded on its own path.
//!
//! Both decode to the same domain value, [`ApiError`].
//!
//! [`RetryPolicy`] is a cross-cutting concern: the dispatch layer never retries,
//! but every error it returns can describe whether a retry is safe.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// Returned by the client's error type to let the caller decide whether to
/// re-issue a request. The dispatch layer itself never acts on it.
///
/// - `Retryable` errors: transport failures, 408, 429, 5xx, and 529 (overloaded).
/// - `NonRetryable` errors: malformed requests, authentication and permission
///   failures, unknown resources, configuration mistakes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means retry
        /// immediately or apply the caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried without changing the request.
    NonRetryable,
}

impl RetryPolicy {
    /// Classifies an HTTP status code returned by either backend.
    ///
    /// `retry_after` is attached to retryable outcomes (typically taken from the
    /// `retry-after` response header).
    pub fn for_status(status: u16, retry_after: Option<Duration>) -> Self {
        match status {
            408 | 429 | 500..=599 => Self::Retryable { after: retry_after },
            _ => Self::NonRetryable,
        }
    }

    /// Returns `true` if the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable { .. })
    }
}

// ---------------------------------------------------------------------------
// Error kinds
// ---------------------------------------------------------------------------

/// Machine-checkable error kind reported in the `type` field of an error payload.
///
/// Unknown kinds are preserved verbatim in [`ApiErrorType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApiErrorType {
    /// `invalid_request_error`: the request body or parameters are malformed.
    InvalidRequest,
    /// `authentication_error`: the API key or bearer token was rejected.
    Authentication,
    /// `permission_error`: the credential lacks access to the resource.
    Permission,
    /// `not_found_error`: the resource (often the model) does not exist.
    NotFound,
    /// `rate_limit_error`: the account exceeded its rate limit.
    RateLimit,
    /// `api_error`: an unexpected server-side failure.
    Api,
    /// `overloaded_error`: the API is temporarily overloaded.
    Overloaded,
    /// Any kind not listed above, kept as sent.
    Other(String),
}

impl ApiErrorType {
    /// Returns the wire spelling of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidRequest => "invalid_request_error",
            Self::Authentication => "authentication_error",
            Self::Permission => "permission_error",
            Self::NotFound => "not_found_error",
            Self::RateLimit => "rate_limit_error",
            Self::Api => "api_error",
            Self::Overloaded => "overloaded_error",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for ApiErrorType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "invalid_request_error" => Self::InvalidRequest,
            "authentication_error" => Self::Authentication,
            "permission_error" => Self::Permission,
            "not_found_error" => Self::NotFound,
            "rate_limit_error" => Self::RateLimit,
            "api_error" => Self::Api,
            "overloaded_error" => Self::Overloaded,
            _ => Self::Other(value),
        }
    }
}

impl From<ApiErrorType> for String {
    fn from(value: ApiErrorType) -> Self {
        value.as_str().to_owned()
    }
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Domain error
// ---------------------------------------------------------------------------

/// A structured error reported by either backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine-checkable error kind.
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,

    /// Human-readable description supplied by the backend.
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)
    }
}

impl std::error::Error for ApiError {}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// The error envelope returned by the direct API (and most gateway failures).
///
/// `error` is optional so that a syntactically valid envelope without a
/// payload can be told apart from a parse failure; the decoder treats both as
/// undecodable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardErrorEnvelope {
    /// Top-level discriminator, `"error"` when present.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// The error payload. `None` when absent or `null`.
    #[serde(default)]
    pub error: Option<ApiError>,
}

/// The error payload inside a [`GatewayErrorEnvelope`].
///
/// The kind arrives as `type`, as `status` (some gateway versions), or as
/// both; `type` wins when both are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayApiError {
    /// Error kind as spelled in the `type` field.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ApiErrorType>,

    /// Error kind as spelled in the `status` field, e.g. `UNAUTHENTICATED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ApiErrorType>,

    /// Human-readable description supplied by the gateway.
    pub message: String,

    /// Numeric status echoed by the gateway, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl GatewayApiError {
    /// Returns the error kind, preferring `type` over `status`.
    pub fn kind(&self) -> Option<&ApiErrorType> {
        self.error_type.as_ref().or(self.status.as_ref())
    }

    /// Converts into the domain error, or `None` if the payload names no kind.
    pub fn into_api_error(self) -> Option<ApiError> {
        let error_type = self.error_type.or(self.status)?;
        Some(ApiError {
            error_type,
            message: self.message,
        })
    }
}

/// The error envelope the gateway returns for authorization failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayErrorEnvelope {
    /// The error payload. `None` when absent or `null`.
    #[serde(default)]
    pub error: Option<GatewayApiError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_envelope_decodes_known_kind() {
        let body = r#"{"type":"error","error":{"type":"rate_limit_error","message":"slow down"}}"#;
        let envelope: StandardErrorEnvelope = serde_json::from_str(body).unwrap();
        let error = envelope.error.unwrap();
        assert_eq!(error.error_type, ApiErrorType::RateLimit);
        assert_eq!(error.message, "slow down");
        assert_eq!(error.to_string(), "rate_limit_error: slow down");
    }

    #[test]
    fn test_standard_envelope_keeps_unknown_kind() {
        let body = r#"{"error":{"type":"shiny_new_error","message":"?"}}"#;
        let envelope: StandardErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(
            envelope.error.unwrap().error_type,
            ApiErrorType::Other("shiny_new_error".into())
        );
    }

    #[test]
    fn test_null_error_payload_decodes_as_none() {
        let envelope: StandardErrorEnvelope = serde_json::from_str(r#"{"error":null}"#).unwrap();
        assert!(envelope.error.is_none());

        let envelope: GatewayErrorEnvelope = serde_json::from_str("{}").unwrap();
        assert!(envelope.error.is_none());
    }

    #[test]
    fn test_gateway_envelope_accepts_status_spelling() {
        let body = r#"{"error":{"code":401,"message":"bad token","status":"UNAUTHENTICATED"}}"#;
        let envelope: GatewayErrorEnvelope = serde_json::from_str(body).unwrap();
        let error = envelope.error.unwrap();
        assert_eq!(error.code, Some(401));

        let api = error.into_api_error().unwrap();
        assert_eq!(api.error_type, ApiErrorType::Other("UNAUTHENTICATED".into()));
        assert_eq!(api.message, "bad token");
    }

    #[test]
    fn test_gateway_envelope_with_type_and_status_prefers_type() {
        let body = r#"{"error":{"type":"authentication_error","status":"UNAUTHENTICATED","message":"bad token","code":401}}"#;
        let envelope: GatewayErrorEnvelope = serde_json::from_str(body).unwrap();
        let error = envelope.error.unwrap();
        assert_eq!(error.kind(), Some(&ApiErrorType::Authentication));

        let api = error.into_api_error().unwrap();
        assert_eq!(api.error_type, ApiErrorType::Authentication);
        assert_eq!(api.message, "bad token");
    }

    #[test]
    fn test_gateway_payload_without_kind_has_no_domain_error() {
        let body = r#"{"error":{"message":"denied","code":401}}"#;
        let envelope: GatewayErrorEnvelope = serde_json::from_str(body).unwrap();
        assert!(envelope.error.unwrap().into_api_error().is_none());
    }

    #[test]
    fn test_error_type_wire_spelling_round_trips() {
        let json = serde_json::to_string(&ApiErrorType::Overloaded).unwrap();
        assert_eq!(json, r#""overloaded_error""#);
    }

    #[test]
    fn test_retry_policy_for_status() {
        let after = Some(Duration::from_secs(3));
        assert_eq!(RetryPolicy::for_status(429, after), RetryPolicy::Retryable { after });
        assert!(RetryPolicy::for_status(529, None).is_retryable());
        assert!(RetryPolicy::for_status(500, None).is_retryable());
        assert!(RetryPolicy::for_status(408, None).is_retryable());
        assert_eq!(RetryPolicy::for_status(400, after), RetryPolicy::NonRetryable);
        assert_eq!(RetryPolicy::for_status(401, None), RetryPolicy::NonRetryable);
    }
}
