//! Decoded rate-limit response headers.
//!
//! Every response (success or error) may carry `anthropic-ratelimit-*` headers
//! and a `retry-after` header. The dispatch layer stores raw headers on the
//! caller's result; [`RateLimitHeaders::from_lookup`] turns them into typed
//! values on demand. This module never touches an HTTP type: the caller
//! supplies a lookup function over whatever header map it holds.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{Timestamp, TokenCount};

/// Maximum requests allowed in the current window.
pub const REQUESTS_LIMIT: &str = "anthropic-ratelimit-requests-limit";
/// Requests remaining in the current window.
pub const REQUESTS_REMAINING: &str = "anthropic-ratelimit-requests-remaining";
/// Instant the request window resets (RFC 3339).
pub const REQUESTS_RESET: &str = "anthropic-ratelimit-requests-reset";
/// Maximum tokens allowed in the current window.
pub const TOKENS_LIMIT: &str = "anthropic-ratelimit-tokens-limit";
/// Tokens remaining in the current window.
pub const TOKENS_REMAINING: &str = "anthropic-ratelimit-tokens-remaining";
/// Instant the token window resets (RFC 3339).
pub const TOKENS_RESET: &str = "anthropic-ratelimit-tokens-reset";
/// Delay before retrying: whole seconds or an HTTP-date.
pub const RETRY_AFTER: &str = "retry-after";

/// A rate-limit header was present but could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimitHeaderError {
    /// A count header did not hold a non-negative integer.
    #[error("rate-limit header '{header}' is not a non-negative integer: '{value}'")]
    InvalidCount {
        /// Header name.
        header: &'static str,
        /// Raw header value.
        value: String,
    },

    /// `retry-after` held neither a number of seconds nor an HTTP-date.
    #[error("header 'retry-after' is neither seconds nor an HTTP-date: '{value}'")]
    InvalidRetryAfter {
        /// Raw header value.
        value: String,
    },

    /// A reset header did not hold an RFC 3339 timestamp.
    #[error("rate-limit header '{header}' is not an RFC 3339 timestamp: '{value}'")]
    InvalidTimestamp {
        /// Header name.
        header: &'static str,
        /// Raw header value.
        value: String,
    },
}

/// Typed view of the rate-limit headers on one response.
///
/// Absent headers decode to `None`. Backends that do not send rate-limit
/// headers (the gateway, most error responses) therefore yield an all-`None`
/// value rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    /// `anthropic-ratelimit-requests-limit`.
    pub requests_limit: Option<u64>,
    /// `anthropic-ratelimit-requests-remaining`.
    pub requests_remaining: Option<u64>,
    /// `anthropic-ratelimit-requests-reset`.
    pub requests_reset: Option<Timestamp>,
    /// `anthropic-ratelimit-tokens-limit`.
    pub tokens_limit: Option<TokenCount>,
    /// `anthropic-ratelimit-tokens-remaining`.
    pub tokens_remaining: Option<TokenCount>,
    /// `anthropic-ratelimit-tokens-reset`.
    pub tokens_reset: Option<Timestamp>,
    /// `retry-after`. An HTTP-date is converted to the delay from the moment
    /// of decoding (zero if already past).
    pub retry_after: Option<Duration>,
}

impl RateLimitHeaders {
    /// Decodes rate-limit headers through `lookup`, which returns the value of
    /// a header by its lowercase name.
    ///
    /// # Errors
    ///
    /// Returns the first [`RateLimitHeaderError`] encountered when a present
    /// header cannot be decoded.
    pub fn from_lookup<'h, F>(lookup: F) -> Result<Self, RateLimitHeaderError>
    where
        F: Fn(&str) -> Option<&'h str>,
    {
        Self::from_lookup_at(lookup, Timestamp::now())
    }

    /// Like [`RateLimitHeaders::from_lookup`], measuring an HTTP-date
    /// `retry-after` from `now`.
    ///
    /// # Errors
    ///
    /// Same as [`RateLimitHeaders::from_lookup`].
    pub fn from_lookup_at<'h, F>(lookup: F, now: Timestamp) -> Result<Self, RateLimitHeaderError>
    where
        F: Fn(&str) -> Option<&'h str>,
    {
        let count = |header: &'static str| -> Result<Option<u64>, RateLimitHeaderError> {
            lookup(header)
                .map(|value| {
                    value
                        .trim()
                        .parse::<u64>()
                        .map_err(|_| RateLimitHeaderError::InvalidCount {
                            header,
                            value: value.to_owned(),
                        })
                })
                .transpose()
        };
        let instant = |header: &'static str| -> Result<Option<Timestamp>, RateLimitHeaderError> {
            lookup(header)
                .map(|value| {
                    Timestamp::parse_rfc3339(value.trim()).map_err(|_| {
                        RateLimitHeaderError::InvalidTimestamp {
                            header,
                            value: value.to_owned(),
                        }
                    })
                })
                .transpose()
        };

        Ok(Self {
            requests_limit: count(REQUESTS_LIMIT)?,
            requests_remaining: count(REQUESTS_REMAINING)?,
            requests_reset: instant(REQUESTS_RESET)?,
            tokens_limit: count(TOKENS_LIMIT)?.map(TokenCount::new),
            tokens_remaining: count(TOKENS_REMAINING)?.map(TokenCount::new),
            tokens_reset: instant(TOKENS_RESET)?,
            retry_after: lookup(RETRY_AFTER)
                .map(|value| {
                    retry_delay(value.trim(), now.as_datetime()).ok_or_else(|| {
                        RateLimitHeaderError::InvalidRetryAfter {
                            value: value.to_owned(),
                        }
                    })
                })
                .transpose()?,
        })
    }

    /// Returns `true` if the response reported an exhausted request or token budget.
    pub fn is_exhausted(&self) -> bool {
        self.requests_remaining == Some(0) || self.tokens_remaining.is_some_and(TokenCount::is_zero)
    }
}

/// Decodes a `retry-after` value given as delay-seconds or an IMF-fixdate.
fn retry_delay(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    let at = DateTime::parse_from_rfc2822(value).ok()?;
    Some((at.with_timezone(&Utc) - now).to_std().unwrap_or(Duration::ZERO))
}
