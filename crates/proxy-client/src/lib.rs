//! Client for the remote query-execution proxy.
//!
//! Builds the secure request envelope: a symmetric key is derived from the
//! public company identifier, the connection selector and the JSON payload
//! are each AEAD-encrypted under it, and the result is POSTed to the proxy
//! as a JSON envelope.
//!
//! Nothing in this crate is long-lived: the key is re-derived on every call
//! and zeroed afterwards, no response is interpreted, and no request is
//! retried. Retry policy belongs to the caller.

pub mod client;
pub mod config;
pub mod crypto;
pub mod telemetry;
pub mod transport;

pub use client::{RequestError, SecureRequestClient};
pub use reqwest::Url;
pub use crypto::kdf::{HmacKeyProvider, KeyProvider, Sha256KeyProvider};
pub use transport::{HttpTransport, RawResponse, Transport, TransportError};
