//! Dual-backend dispatch client for the Anthropic API.
//!
//! One [`Client`] talks to either the direct API or the Vertex AI gateway. The
//! backend is chosen once, from the configured protocol version, and every
//! backend-specific decision (URL shape, authentication, body rewriting, error
//! envelope) is made by matching on that choice.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, request formatting, response
//! decoding and error unification live here. The protocol rules themselves
//! (backend classification, model translation, envelope shapes) come from the
//! [`protocol`] crate.
//!
//! ## Call flow
//!
//! ```text
//! Client::new_request ──▶ OutboundRequest ──▶ Client::send ──▶ HttpTransport
//!                                                  │
//!                                   2xx/3xx ◀──────┴──────▶ decode_error
//! ```
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | `config` | [`ClientConfig`], [`ApiKeySource`] |
//! | `body` | [`RequestBody`], [`GatewayFields`], [`JsonBody`] |
//! | `request` | Request builder, [`OutboundRequest`], [`HeaderMutator`] |
//! | `transport` | [`HttpTransport`], [`ReqwestTransport`] |
//! | `dispatch` | [`Client::send`] |
//! | `decode` | [`decode_error`] |
//! | `response` | [`ResponseEnvelope`], [`ResponseHeaders`], [`JsonResponse`] |
//! | `error` | [`ClientError`] |

use protocol::BackendVariant;

mod body;
mod config;
mod decode;
mod dispatch;
mod error;
mod request;
mod response;
mod transport;

#[cfg(test)]
mod test_support;

pub use body::{GatewayFields, JsonBody, RequestBody};
pub use config::{
    ApiKeyFn, ApiKeySource, ClientConfig, API_KEY_ENV, API_VERSION_ENV, BASE_URL_ENV,
    DEFAULT_BASE_URL,
};
pub use decode::decode_error;
pub use error::ClientError;
pub use request::{HeaderMutator, OutboundRequest, ANTHROPIC_BETA, ANTHROPIC_VERSION, X_API_KEY};
pub use response::{JsonResponse, ResponseEnvelope, ResponseHeaders};
pub use transport::{HttpTransport, ReqwestTransport, TransportError, TransportResponse};

pub use reqwest::{Method, StatusCode};

/// A configured dispatch client.
///
/// Cheap to share: the client holds only its immutable configuration, so an
/// `Arc<Client>` (or a clone) can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    /// Creates a client from `config`.
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Returns the client's configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the backend every call from this client targets.
    pub fn backend(&self) -> BackendVariant {
        self.config.backend()
    }

    /// Returns `true` if calls are routed through the Vertex AI gateway.
    pub fn is_vertex_ai(&self) -> bool {
        self.backend().is_gateway()
    }
}

#[cfg(test)]
mod tests {
    use protocol::ApiVersion;

    use super::*;

    #[test]
    fn test_backend_follows_configured_version() {
        let direct = Client::new(ClientConfig::new("sk"));
        assert_eq!(direct.backend(), BackendVariant::Direct);
        assert!(!direct.is_vertex_ai());

        let gateway = Client::new(
            ClientConfig::new("token").with_api_version(ApiVersion::gateway_default()),
        );
        assert_eq!(gateway.backend(), BackendVariant::Gateway);
        assert!(gateway.is_vertex_ai());
    }
}
