//! Client configuration.
//!
//! A [`ClientConfig`] is assembled once, moved into a [`crate::Client`], and
//! never mutated afterwards. Everything in it is `Send + Sync`, so one client
//! can serve any number of concurrent calls.
//!
//! The protocol version doubles as the backend selector: a `vertex-` version
//! sends every call to the gateway (see [`protocol::BackendVariant`]).

use std::sync::Arc;

use protocol::{ApiVersion, BackendVariant};

use crate::transport::{HttpTransport, ReqwestTransport};
use crate::ClientError;

/// Base URL of the direct API.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "ANTHROPIC_BASE_URL";
/// Environment variable overriding the protocol version.
pub const API_VERSION_ENV: &str = "ANTHROPIC_API_VERSION";

/// A function returning the current API key or bearer token.
pub type ApiKeyFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Where the credential for each request comes from.
#[derive(Clone)]
pub enum ApiKeySource {
    /// A fixed key.
    Static(String),
    /// A function consulted on every request (e.g. a refreshing OAuth token).
    Resolver(ApiKeyFn),
}

impl ApiKeySource {
    /// Returns the credential to send with the next request.
    pub fn resolve(&self) -> String {
        match self {
            Self::Static(key) => key.clone(),
            Self::Resolver(resolve) => resolve(),
        }
    }
}

/// Immutable per-client settings.
#[derive(Clone)]
pub struct ClientConfig {
    api_key: ApiKeySource,
    base_url: String,
    api_version: ApiVersion,
    transport: Arc<dyn HttpTransport>,
}

impl ClientConfig {
    /// Creates a direct-API configuration with default base URL, protocol
    /// version, and transport.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: ApiKeySource::Static(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_version: ApiVersion::default(),
            transport: Arc::new(ReqwestTransport::default()),
        }
    }

    /// Creates a Vertex AI gateway configuration.
    ///
    /// The base URL is derived from `project_id` and `location`; `token` is
    /// called for every request to obtain a bearer token.
    pub fn vertex<F>(project_id: &str, location: &str, token: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self {
            api_key: ApiKeySource::Resolver(Arc::new(token)),
            base_url: format!(
                "https://{location}-aiplatform.googleapis.com/v1/projects/{project_id}/locations/{location}/publishers/anthropic/models"
            ),
            api_version: ApiVersion::gateway_default(),
            transport: Arc::new(ReqwestTransport::default()),
        }
    }

    /// Creates a configuration from environment variables.
    ///
    /// - `ANTHROPIC_API_KEY`: API key (required)
    /// - `ANTHROPIC_BASE_URL`: base URL (default: `https://api.anthropic.com/v1`)
    /// - `ANTHROPIC_API_VERSION`: protocol version (default: `2023-06-01`)
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the API key is missing or a
    /// variable is set but empty.
    pub fn from_env() -> Result<Self, ClientError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ClientError::configuration(format!("{API_KEY_ENV} environment variable is required"))
            })?;

        let mut config = Self::new(api_key);

        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            if base_url.is_empty() {
                return Err(ClientError::configuration(format!("{BASE_URL_ENV} is set but empty")));
            }
            config = config.with_base_url(base_url);
        }

        if let Ok(version) = std::env::var(API_VERSION_ENV) {
            let version = ApiVersion::new(version).ok_or_else(|| {
                ClientError::configuration(format!("{API_VERSION_ENV} is set but empty"))
            })?;
            config = config.with_api_version(version);
        }

        Ok(config)
    }

    /// Overrides the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the protocol version (and with it, the backend).
    #[must_use]
    pub fn with_api_version(mut self, api_version: ApiVersion) -> Self {
        self.api_version = api_version;
        self
    }

    /// Resolves the credential through `resolver` on every request, in
    /// preference to any static key.
    #[must_use]
    pub fn with_api_key_fn<F>(mut self, resolver: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.api_key = ApiKeySource::Resolver(Arc::new(resolver));
        self
    }

    /// Replaces the HTTP transport.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the protocol version.
    pub fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the backend selected by the protocol version.
    pub fn backend(&self) -> BackendVariant {
        self.api_version.backend()
    }

    /// Returns the credential source.
    pub fn api_key(&self) -> &ApiKeySource {
        &self.api_key
    }

    /// Returns the HTTP transport.
    pub fn transport(&self) -> &dyn HttpTransport {
        self.transport.as_ref()
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let api_key = match self.api_key {
            ApiKeySource::Static(_) => "[REDACTED]",
            ApiKeySource::Resolver(_) => "<resolver>",
        };
        f.debug_struct("ClientConfig")
            .field("api_key", &api_key)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("backend", &self.backend())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_targets_direct_api() {
        let config = ClientConfig::new("sk-test");
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.api_version().as_str(), "2023-06-01");
        assert_eq!(config.backend(), BackendVariant::Direct);
        assert_eq!(config.api_key().resolve(), "sk-test");
    }

    #[test]
    fn test_vertex_targets_gateway() {
        let config = ClientConfig::vertex("my-project", "us-east5", || "ya29.token".to_owned());
        assert_eq!(config.backend(), BackendVariant::Gateway);
        assert_eq!(
            config.base_url(),
            "https://us-east5-aiplatform.googleapis.com/v1/projects/my-project/locations/us-east5/publishers/anthropic/models"
        );
        assert_eq!(config.api_key().resolve(), "ya29.token");
    }

    #[test]
    fn test_resolver_takes_precedence_over_static_key() {
        let config = ClientConfig::new("static").with_api_key_fn(|| "dynamic".to_owned());
        assert_eq!(config.api_key().resolve(), "dynamic");
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ClientConfig::new("sk-secret-123");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret-123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_from_env_requires_api_key() {
        temp_env::with_vars_unset(vec![API_KEY_ENV, BASE_URL_ENV, API_VERSION_ENV], || {
            let err = ClientConfig::from_env().unwrap_err();
            assert!(err.to_string().contains(API_KEY_ENV));
        });
    }

    #[test]
    fn test_from_env_reads_overrides() {
        temp_env::with_vars(
            vec![
                (API_KEY_ENV, Some("sk-env")),
                (BASE_URL_ENV, Some("http://localhost:9999")),
                (API_VERSION_ENV, Some("vertex-2023-10-16")),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.base_url(), "http://localhost:9999");
                assert_eq!(config.backend(), BackendVariant::Gateway);
                assert_eq!(config.api_key().resolve(), "sk-env");
            },
        );
    }

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(
            vec![
                (API_KEY_ENV, Some("sk-env")),
                (BASE_URL_ENV, None),
                (API_VERSION_ENV, None),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.base_url(), DEFAULT_BASE_URL);
                assert_eq!(config.backend(), BackendVariant::Direct);
            },
        );
    }
}
