//! HTTP transport: one POST per envelope, nothing more.
//!
//! The transport never retries and never interprets the response — both are
//! the orchestrating caller's policy. A retry loop hidden in this layer
//! would silently multiply encrypted requests behind the caller's back.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use common::Envelope;
use reqwest::header::HeaderMap;
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::debug;

/// The proxy's reply, returned verbatim for the caller to interpret.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, untouched.
    pub headers: HeaderMap,
    /// Response body bytes, untouched.
    pub body: Bytes,
}

/// Errors produced by the transport layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The in-flight request was cancelled after the configured deadline.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// The deadline that was exceeded, in milliseconds.
        timeout_ms: u64,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// DNS, connection, or TLS failure — the request may never have left
    /// this host.
    #[error("network failure")]
    Network(#[source] reqwest::Error),
}

/// Sends one envelope to one endpoint. Seam for substituting an in-memory
/// transport in tests.
pub trait Transport {
    /// POST `envelope` as JSON to `endpoint`, cancelling after `timeout`.
    fn send(
        &self,
        envelope: &Envelope,
        endpoint: &Url,
        timeout: Duration,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with a fresh connection pool.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        envelope: &Envelope,
        endpoint: &Url,
        timeout: Duration,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send {
        // `.json(..)` sets `Content-Type: application/json`; the per-request
        // timeout covers everything up to and including the response body.
        let request = self
            .client
            .post(endpoint.clone())
            .json(envelope)
            .timeout(timeout);
        let timeout_ms = timeout.as_millis() as u64;

        async move {
            let response = request
                .send()
                .await
                .map_err(|e| classify(e, timeout_ms))?;

            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(|e| classify(e, timeout_ms))?;

            debug!(status, bytes = body.len(), "proxy responded");
            Ok(RawResponse {
                status,
                headers,
                body,
            })
        }
    }
}

fn classify(source: reqwest::Error, timeout_ms: u64) -> TransportError {
    if source.is_timeout() {
        TransportError::Timeout { timeout_ms, source }
    } else {
        TransportError::Network(source)
    }
}
