//! Request body capabilities.
//!
//! The gateway needs two things from a body that the direct API does not: the
//! model identifier (which moves into the URL) and a protocol-version field
//! inside the payload. Bodies opt in by implementing [`GatewayFields`] and
//! returning themselves from [`RequestBody::gateway_fields`]. A body that does
//! not opt in can still be sent to the direct API; sending it to the gateway
//! fails with a configuration error before any bytes leave the process.

use protocol::{ApiVersion, GATEWAY_VERSION_FIELD};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::ClientError;

/// Gateway-specific accessors on a request body.
pub trait GatewayFields {
    /// Returns the canonical model identifier the body targets.
    ///
    /// An empty string means the body has no model.
    fn model(&self) -> &str;

    /// Stores the protocol version in the payload.
    fn set_api_version(&mut self, version: &ApiVersion);
}

/// A JSON request body.
pub trait RequestBody: Serialize {
    /// Returns the body's gateway accessors, or `None` when the body shape is
    /// not accepted by the gateway.
    fn gateway_fields(&mut self) -> Option<&mut dyn GatewayFields> {
        None
    }
}

// ---------------------------------------------------------------------------
// JsonBody
// ---------------------------------------------------------------------------

/// An untyped JSON object body.
///
/// Reads the model from its `"model"` key and writes the gateway protocol
/// version to `"anthropic_version"`, so any Messages-style payload can be sent
/// to either backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JsonBody(Map<String, Value>);

impl JsonBody {
    /// Wraps a JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wraps a JSON value, which must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if `value` is not an object.
    pub fn from_value(value: Value) -> Result<Self, ClientError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(ClientError::configuration(format!(
                "request body must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the wrapped object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl GatewayFields for JsonBody {
    fn model(&self) -> &str {
        self.0.get("model").and_then(Value::as_str).unwrap_or_default()
    }

    fn set_api_version(&mut self, version: &ApiVersion) {
        self.0.insert(
            GATEWAY_VERSION_FIELD.to_owned(),
            Value::String(version.as_str().to_owned()),
        );
    }
}

impl RequestBody for JsonBody {
    fn gateway_fields(&mut self) -> Option<&mut dyn GatewayFields> {
        Some(self)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
