//! Request dispatch.
//!
//! [`Client::send`] is the only place a request meets the network. It stores
//! the response headers on the caller's result before looking at the status,
//! decodes successful bodies, and hands everything else to
//! [`crate::decode_error`].

use bytes::Bytes;
use reqwest::StatusCode;

use crate::decode::decode_error;
use crate::request::OutboundRequest;
use crate::response::ResponseEnvelope;
use crate::transport::TransportError;
use crate::{Client, ClientError};

impl Client {
    /// Sends `request` and decodes the response into `result`.
    ///
    /// `result` receives the response headers whenever a status line and
    /// headers arrive, even if the body then cannot be read or the call fails.
    /// On a 2xx or 3xx status the body is decoded into `result`, replacing its
    /// previous contents.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Network`] if no response was received, or a success
    ///   body could not be read (the status stays available through
    ///   [`ClientError::status`]).
    /// - [`ClientError::Decode`] if a success body is not valid for `T`.
    /// - [`ClientError::Api`] or [`ClientError::Raw`] for any other status.
    ///   An error body that could not be read is [`ClientError::Raw`] with an
    ///   empty body and the read failure as its source.
    #[tracing::instrument(
        name = "client.send",
        skip_all,
        fields(
            method = %request.method(),
            url = %request.url(),
            backend = %self.backend(),
        )
    )]
    pub async fn send<T: ResponseEnvelope>(
        &self,
        request: OutboundRequest,
        result: &mut T,
    ) -> Result<(), ClientError> {
        let response = match self.config().transport().send(request).await {
            Ok(response) => response,
            Err(TransportError::Body {
                status,
                headers,
                source,
            }) => {
                tracing::debug!(status = status.as_u16(), error = %source, "response body read failed");
                result.set_headers(headers.clone());
                return Err(if is_success(status) {
                    ClientError::Network(TransportError::Body {
                        status,
                        headers,
                        source,
                    })
                } else {
                    ClientError::Raw {
                        status,
                        body: Bytes::new(),
                        source: Some(source),
                    }
                });
            }
            Err(e) => {
                tracing::debug!(error = %e, "transport failed");
                return Err(ClientError::Network(e));
            }
        };

        let status = response.status;
        tracing::debug!(status = status.as_u16(), body_len = response.body.len(), "received response");

        result.set_headers(response.headers.clone());

        if !is_success(status) {
            return Err(decode_error(status, response.body, self.backend()));
        }

        let mut decoded: T = serde_json::from_slice(&response.body).map_err(ClientError::Decode)?;
        decoded.set_headers(response.headers);
        *result = decoded;

        Ok(())
    }
}

fn is_success(status: StatusCode) -> bool {
    status.is_success() || status.is_redirection()
}
