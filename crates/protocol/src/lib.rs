//! Wire-protocol domain for the Anthropic dispatch layer.
//!
//! This crate contains every protocol concept the dispatch layer reasons about:
//! identifiers, the classification of a protocol version into a backend variant,
//! model-name translation, the two error envelope shapes, and the rate-limit
//! header model. The `client` crate builds and sends requests; it never
//! re-derives any of the rules defined here.
//!
//! ## Architectural Layer
//!
//! **Pure protocol rules.** This crate has no I/O dependencies. It defines
//! *what* the wire looks like; the `client` crate defines *how* to put bytes on it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ModelId`, `ApiVersion`, `BetaFeature`) |
//! | [`backend`] | [`BackendVariant`] classification and model translation |
//! | [`errors`] | Error envelopes, [`ApiError`], [`ApiErrorType`], [`RetryPolicy`] |
//! | [`rate_limit`] | Decoded `anthropic-ratelimit-*` response headers |
//! | [`types`] | Shared value types (`TokenCount`, `Timestamp`) |

pub mod backend;
pub mod errors;
pub mod identifiers;
pub mod rate_limit;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use backend::{
    translate_model, BackendVariant, DEFAULT_API_VERSION, DEFAULT_GATEWAY_API_VERSION,
    GATEWAY_VERSION_FIELD, GATEWAY_VERSION_PREFIX,
};
pub use errors::{
    ApiError, ApiErrorType, GatewayApiError, GatewayErrorEnvelope, RetryPolicy,
    StandardErrorEnvelope,
};
pub use identifiers::{ApiVersion, BetaFeature, ModelId};
pub use rate_limit::{RateLimitHeaderError, RateLimitHeaders};
pub use types::{Timestamp, TokenCount};
