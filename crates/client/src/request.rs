//! Outbound request construction.
//!
//! [`Client::new_request`] turns a method, a path suffix, an optional body, and
//! a list of [`HeaderMutator`]s into an [`OutboundRequest`]. All
//! backend-specific decisions are made here by matching on the client's
//! [`BackendVariant`]:
//!
//! | Concern | Direct | Gateway |
//! |---------|--------|---------|
//! | URL | `base + suffix` | `base/MODEL:action` (model translated) |
//! | Auth | `X-Api-Key` + `Anthropic-Version` | `Authorization: Bearer` |
//! | Body | serialised as given | `anthropic_version` injected; model required |
//!
//! [`Client::new_stream_request`] is the same builder with event-stream
//! headers layered on top.

use std::sync::Arc;

use bytes::Bytes;
use protocol::{BackendVariant, BetaFeature, ModelId};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONNECTION,
    CONTENT_TYPE,
};
use reqwest::Method;

use crate::body::RequestBody;
use crate::{Client, ClientError};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const EVENT_STREAM: &str = "text/event-stream";

/// Header carrying the direct-API key.
pub const X_API_KEY: HeaderName = HeaderName::from_static("x-api-key");
/// Header pinning the direct-API protocol version.
pub const ANTHROPIC_VERSION: HeaderName = HeaderName::from_static("anthropic-version");
/// Header carrying opt-in beta feature flags.
pub const ANTHROPIC_BETA: HeaderName = HeaderName::from_static("anthropic-beta");

// ---------------------------------------------------------------------------
// OutboundRequest
// ---------------------------------------------------------------------------

/// A fully built request, ready for a transport. Built once per call.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Bytes,
}

impl OutboundRequest {
    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the absolute URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the serialised body (empty when the call has no body).
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Splits the request into method, URL, headers, and body.
    pub fn into_parts(self) -> (Method, String, HeaderMap, Bytes) {
        (self.method, self.url, self.headers, self.body)
    }
}

// ---------------------------------------------------------------------------
// Header mutators
// ---------------------------------------------------------------------------

/// A call-specific header adjustment applied after the builder's own headers.
///
/// Mutators run in order and may overwrite anything the builder set.
#[derive(Clone)]
pub struct HeaderMutator(Arc<dyn Fn(&mut HeaderMap) + Send + Sync>);

impl HeaderMutator {
    /// Wraps an arbitrary header-setting function.
    pub fn new<F>(mutate: F) -> Self
    where
        F: Fn(&mut HeaderMap) + Send + Sync + 'static,
    {
        Self(Arc::new(mutate))
    }

    /// Sets `name` to `value`, replacing any existing value.
    pub fn header(name: HeaderName, value: HeaderValue) -> Self {
        Self::new(move |headers| {
            headers.insert(name.clone(), value.clone());
        })
    }

    /// Opts the call into a beta feature via the `anthropic-beta` header.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the feature name is not a
    /// valid header value.
    pub fn beta(feature: &BetaFeature) -> Result<Self, ClientError> {
        let value = HeaderValue::from_str(feature.as_str()).map_err(|_| {
            ClientError::configuration(format!("beta feature '{feature}' is not a valid header value"))
        })?;
        Ok(Self::header(ANTHROPIC_BETA, value))
    }

    fn apply(&self, headers: &mut HeaderMap) {
        (self.0)(headers);
    }
}

impl std::fmt::Debug for HeaderMutator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HeaderMutator(..)")
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

impl Client {
    /// Builds a JSON request for `method` on `path`.
    ///
    /// Under the gateway backend, `body` must expose
    /// [`crate::GatewayFields`] with a non-empty model: the model is translated
    /// and moved into the URL, and the protocol version is written into the
    /// body before serialisation.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Configuration`] if the gateway is targeted and the body
    ///   is absent, does not support gateway fields, or has no model; or if the
    ///   credential is not a valid header value.
    /// - [`ClientError::Serialize`] if the body cannot be serialised.
    pub fn new_request<B: RequestBody>(
        &self,
        method: Method,
        path: &str,
        mut body: Option<&mut B>,
        mutators: &[HeaderMutator],
    ) -> Result<OutboundRequest, ClientError> {
        let backend = self.backend();

        let model = match backend {
            BackendVariant::Direct => None,
            BackendVariant::Gateway => {
                let fields = body
                    .as_mut()
                    .and_then(|b| b.gateway_fields())
                    .ok_or_else(|| {
                        ClientError::configuration(format!(
                            "{method} {path} is not supported by the gateway backend"
                        ))
                    })?;
                let model = ModelId::new(fields.model()).ok_or_else(|| {
                    ClientError::configuration(format!(
                        "{method} {path} requires a model for the gateway backend"
                    ))
                })?;
                fields.set_api_version(self.config().api_version());
                Some(model)
            }
        };

        let body = match body {
            Some(body) => serde_json::to_vec(&*body).map_err(ClientError::Serialize)?,
            None => Vec::new(),
        };

        let url = self.full_url(path, model.as_ref());
        let headers = self.base_headers(backend, mutators)?;

        tracing::debug!(
            method = %method,
            url = %url,
            backend = %backend,
            body_len = body.len(),
            "built outbound request"
        );

        Ok(OutboundRequest {
            method,
            url,
            headers,
            body: Bytes::from(body),
        })
    }

    /// Builds a request exactly like [`Client::new_request`], then asks for a
    /// server-sent event stream.
    ///
    /// # Errors
    ///
    /// Same as [`Client::new_request`].
    pub fn new_stream_request<B: RequestBody>(
        &self,
        method: Method,
        path: &str,
        body: Option<&mut B>,
        mutators: &[HeaderMutator],
    ) -> Result<OutboundRequest, ClientError> {
        let mut request = self.new_request(method, path, body, mutators)?;

        request.headers.insert(ACCEPT, HeaderValue::from_static(EVENT_STREAM));
        request.headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        request.headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        Ok(request)
    }

    fn full_url(&self, path: &str, model: Option<&ModelId>) -> String {
        let base_url = self.config().base_url();
        match model {
            Some(model) => format!(
                "{}/{}:{}",
                base_url.trim_end_matches('/'),
                model.for_backend(BackendVariant::Gateway),
                gateway_action(path)
            ),
            None => format!("{base_url}{path}"),
        }
    }

    fn base_headers(
        &self,
        backend: BackendVariant,
        mutators: &[HeaderMutator],
    ) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));

        let api_key = self.config().api_key().resolve();
        match backend {
            BackendVariant::Gateway => {
                headers.insert(AUTHORIZATION, secret_header(&format!("Bearer {api_key}"))?);
            }
            BackendVariant::Direct => {
                headers.insert(X_API_KEY, secret_header(&api_key)?);
                let version = HeaderValue::from_str(self.config().api_version().as_str())
                    .map_err(|_| {
                        ClientError::configuration("protocol version is not a valid header value")
                    })?;
                headers.insert(ANTHROPIC_VERSION, version);
            }
        }

        for mutator in mutators {
            mutator.apply(&mut headers);
        }

        Ok(headers)
    }
}

/// Rewrites a path suffix into the gateway's `action` segment.
///
/// The leading `/` becomes the `:` separator (added by the caller) and a leading
/// direct-API version segment such as `v1/` is dropped. The gateway base URL
/// pins its own REST version.
fn gateway_action(path: &str) -> &str {
    let action = path.strip_prefix('/').unwrap_or(path);
    match action.split_once('/') {
        Some((segment, rest)) if is_version_segment(segment) => rest,
        _ => action,
    }
}

fn is_version_segment(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

fn secret_header(value: &str) -> Result<HeaderValue, ClientError> {
    let mut value = HeaderValue::from_str(value)
        .map_err(|_| ClientError::configuration("API key is not a valid header value"))?;
    value.set_sensitive(true);
    Ok(value)
}
