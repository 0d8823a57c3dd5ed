//! Request orchestration: derive → encrypt → envelope → send.

use std::time::Duration;

use common::Envelope;
use reqwest::Url;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::crypto::cipher::{self, CipherError};
use crate::crypto::kdf::{DerivationError, KeyProvider, Sha256KeyProvider};
use crate::transport::{HttpTransport, RawResponse, Transport, TransportError};

/// Any failure along the request path.
///
/// Every variant aborts the call immediately with the originating cause
/// attached; nothing is retried here. Derivation, serialisation, and
/// encryption failures abort before any network I/O happens.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The key provider could not derive a key for the identifier.
    #[error("key derivation failed")]
    Derivation(#[from] DerivationError),

    /// The payload could not be serialised to JSON.
    #[error("payload could not be serialised")]
    Serialization(#[from] serde_json::Error),

    /// Encryption or authentication failure in the cipher layer.
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// The network call failed or timed out.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Stateless client for the remote query proxy.
///
/// Holds no key material and no per-request state: the key is re-derived on
/// every call and zeroed when the call returns. Concurrent `request` calls
/// are fully independent.
#[derive(Debug, Clone)]
pub struct SecureRequestClient<P = Sha256KeyProvider, T = HttpTransport> {
    key_provider: P,
    transport: T,
}

impl SecureRequestClient {
    /// Client with the deployed scheme: SHA-256 derivation over HTTP.
    pub fn new() -> Self {
        Self::with_parts(Sha256KeyProvider, HttpTransport::new())
    }
}

impl Default for SecureRequestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: KeyProvider, T: Transport> SecureRequestClient<P, T> {
    /// Client with a substituted key provider and/or transport.
    pub fn with_parts(key_provider: P, transport: T) -> Self {
        Self {
            key_provider,
            transport,
        }
    }

    /// Send one secure request and return the proxy's raw response.
    ///
    /// The key is derived once from `company_ref`; `connection_selector` and
    /// `payload` are encrypted independently, each under its own fresh nonce
    /// (one AEAD call per secret — bundling them would conflate two
    /// independent fields under a single ciphertext).
    ///
    /// # Errors
    ///
    /// See [`RequestError`]. No error message contains key material or
    /// plaintext.
    pub async fn request<S: Serialize>(
        &self,
        company_ref: &str,
        connection_selector: &str,
        payload: &S,
        endpoint: &Url,
        timeout: Duration,
    ) -> Result<RawResponse, RequestError> {
        let key = self.key_provider.derive_key(company_ref)?;

        let encrypted_selector = cipher::encrypt(connection_selector.as_bytes(), &key)?;
        let payload_bytes = serde_json::to_vec(payload)?;
        let encrypted_payload = cipher::encrypt(&payload_bytes, &key)?;

        let envelope = Envelope::build(company_ref, encrypted_selector, encrypted_payload);
        debug!(
            company_ref,
            request_token = %envelope.request_token,
            "sending secure request"
        );

        Ok(self.transport.send(&envelope, endpoint, timeout).await?)
    }
}
