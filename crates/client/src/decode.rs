//! Error-response decoding.
//!
//! Turns a non-success response into a [`ClientError`]. The gateway reports
//! authorization failures in its own envelope, so a 401 from the gateway is
//! parsed as [`GatewayErrorEnvelope`]; every other error response is parsed as
//! [`StandardErrorEnvelope`]. When the body matches neither, the caller still
//! gets the status code and the untouched bytes as [`ClientError::Raw`].

use bytes::Bytes;
use protocol::{BackendVariant, GatewayApiError, GatewayErrorEnvelope, StandardErrorEnvelope};
use reqwest::StatusCode;

use crate::ClientError;

/// Decodes an error response received from `backend`.
pub fn decode_error(status: StatusCode, body: Bytes, backend: BackendVariant) -> ClientError {
    let parsed = if backend.is_gateway() && status == StatusCode::UNAUTHORIZED {
        serde_json::from_slice::<GatewayErrorEnvelope>(&body)
            .map(|envelope| envelope.error.and_then(GatewayApiError::into_api_error))
    } else {
        serde_json::from_slice::<StandardErrorEnvelope>(&body).map(|envelope| envelope.error)
    };

    match parsed {
        Ok(Some(error)) => ClientError::Api { status, error },
        Ok(None) => {
            tracing::warn!(%status, %backend, "error envelope carried no error payload");
            ClientError::Raw {
                status,
                body,
                source: None,
            }
        }
        Err(source) => {
            tracing::warn!(%status, %backend, error = %source, "undecodable error body");
            ClientError::Raw {
                status,
                body,
                source: Some(Box::new(source)),
            }
        }
    }
}
