//! Result capabilities.
//!
//! Every call result implements [`ResponseEnvelope`]: it can be decoded from
//! the JSON body and it keeps the response headers. The dispatcher stores
//! headers before it looks at the status code, so rate-limit information is
//! available to the caller even when the call fails.

use protocol::{RateLimitHeaderError, RateLimitHeaders};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A call result that is decoded from JSON and records response headers.
pub trait ResponseEnvelope: DeserializeOwned {
    /// Stores the raw response headers.
    fn set_headers(&mut self, headers: HeaderMap);
}

// ---------------------------------------------------------------------------
// ResponseHeaders
// ---------------------------------------------------------------------------

/// Raw response headers with typed accessors.
///
/// Result types embed this as a `#[serde(skip)]` field and forward
/// [`ResponseEnvelope::set_headers`] to [`ResponseHeaders::set`].
#[derive(Debug, Clone, Default)]
pub struct ResponseHeaders(HeaderMap);

impl ResponseHeaders {
    /// Replaces the stored headers.
    pub fn set(&mut self, headers: HeaderMap) {
        self.0 = headers;
    }

    /// Returns the value of `name` if present and valid visible ASCII.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the underlying header map.
    pub fn as_map(&self) -> &HeaderMap {
        &self.0
    }

    /// Returns `true` if no headers have been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decodes the `anthropic-ratelimit-*` and `retry-after` headers.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitHeaderError`] if a present header is malformed,
    /// including values that are not valid header text.
    pub fn rate_limits(&self) -> Result<RateLimitHeaders, RateLimitHeaderError> {
        RateLimitHeaders::from_lookup(|name| {
            self.0
                .get(name)
                .map(|value| value.to_str().unwrap_or_default())
        })
    }
}

// ---------------------------------------------------------------------------
// JsonResponse
// ---------------------------------------------------------------------------

/// An untyped JSON result plus the headers it arrived with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonResponse {
    /// The decoded response body.
    pub body: Value,

    #[serde(skip)]
    headers: ResponseHeaders,
}

impl JsonResponse {
    /// Returns the headers recorded for this response.
    pub fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }
}

impl ResponseEnvelope for JsonResponse {
    fn set_headers(&mut self, headers: HeaderMap) {
        self.headers.set(headers);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::header::HeaderValue;

    use super::*;

    #[test]
    fn test_rate_limits_decode_from_stored_headers() {
        let mut map = HeaderMap::new();
        map.insert("anthropic-ratelimit-requests-remaining", HeaderValue::from_static("4"));
        map.insert("retry-after", HeaderValue::from_static("12"));

        let mut response = JsonResponse::default();
        response.set_headers(map);

        let limits = response.headers().rate_limits().unwrap();
        assert_eq!(limits.requests_remaining, Some(4));
        assert_eq!(limits.retry_after, Some(Duration::from_secs(12)));
        assert_eq!(response.headers().get("retry-after"), Some("12"));
    }

    #[test]
    fn test_non_text_header_value_is_reported_malformed() {
        let mut map = HeaderMap::new();
        map.insert(
            "anthropic-ratelimit-tokens-limit",
            HeaderValue::from_bytes(b"\xff\xfe").unwrap(),
        );
        let mut headers = ResponseHeaders::default();
        headers.set(map);
        assert!(headers.rate_limits().is_err());
    }

    #[test]
    fn test_json_response_decodes_transparently() {
        let response: JsonResponse = serde_json::from_str(r#"{"id":"msg_1"}"#).unwrap();
        assert_eq!(response.body["id"], "msg_1");
        assert!(response.headers().is_empty());
    }
}
