//! In-memory transport and client fixtures for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use protocol::ApiVersion;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use crate::transport::{HttpTransport, TransportError, TransportResponse};
use crate::{Client, ClientConfig, OutboundRequest};

/// What a [`RecordingTransport`] answers with.
#[derive(Clone)]
enum Canned {
    Response(TransportResponse),
    /// Status and headers arrive, then the body read fails.
    Truncated(StatusCode, HeaderMap),
    /// No response at all.
    Unreachable,
}

/// Returns a canned outcome and records every request it is given.
pub struct RecordingTransport {
    canned: Canned,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl RecordingTransport {
    fn with(canned: Canned) -> Arc<Self> {
        Arc::new(Self {
            canned,
            requests: Mutex::default(),
        })
    }

    pub fn responding(status: StatusCode, headers: HeaderMap, body: &'static [u8]) -> Arc<Self> {
        Self::with(Canned::Response(TransportResponse {
            status,
            headers,
            body: Bytes::from_static(body),
        }))
    }

    /// A transport whose responses are cut off after the headers.
    pub fn truncated(status: StatusCode, headers: HeaderMap) -> Arc<Self> {
        Self::with(Canned::Truncated(status, headers))
    }

    /// A transport whose every call fails before a response arrives.
    pub fn failing() -> Arc<Self> {
        Self::with(Canned::Unreachable)
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        match self.canned.clone() {
            Canned::Response(response) => Ok(response),
            Canned::Truncated(status, headers) => Err(TransportError::Body {
                status,
                headers,
                source: "connection closed before message completed".into(),
            }),
            Canned::Unreachable => Err(TransportError::Other("connection reset".into())),
        }
    }
}

pub fn direct_client(base_url: &str) -> Client {
    Client::new(ClientConfig::new("sk-direct").with_base_url(base_url))
}

pub fn gateway_client(base_url: &str) -> Client {
    Client::new(
        ClientConfig::new("ya29.gateway")
            .with_base_url(base_url)
            .with_api_version(ApiVersion::gateway_default()),
    )
}

pub fn with_transport(client: Client, transport: Arc<RecordingTransport>) -> Client {
    Client::new(client.config().clone().with_transport(transport))
}
