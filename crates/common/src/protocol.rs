//! The transport envelope for templated-query requests to the remote
//! execution proxy.
//!
//! The envelope is serialised as the JSON body of a single HTTP POST:
//!
//! ```text
//! {
//!   "companyRef": "<identifier, plaintext>",
//!   "encryptedConnectionType": "<base64: nonce‖ciphertext‖tag>",
//!   "encryptedPayload": "<base64: nonce‖ciphertext‖tag>",
//!   "timestamp": <integer, epoch ms>,
//!   "nonce": "<opaque random token, advisory only>"
//! }
//! ```
//!
//! Field names on the wire are fixed by the proxy; the Rust-side names are
//! deliberately different where the wire name is misleading (see
//! [`Envelope::request_token`]).

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One secure request as sent over the wire.
///
/// Both encrypted fields are self-contained `base64(nonce‖ciphertext‖tag)`
/// strings; decryption needs only the string plus the re-derived key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Company identifier, sent in plaintext. The proxy re-derives the
    /// decryption key from this value.
    #[serde(rename = "companyRef")]
    pub company_ref: String,

    /// Encrypted connection selector (e.g. `"live"` or `"offline"`).
    #[serde(rename = "encryptedConnectionType")]
    pub encrypted_selector: String,

    /// Encrypted JSON request payload.
    #[serde(rename = "encryptedPayload")]
    pub encrypted_payload: String,

    /// Client clock at envelope construction, milliseconds since the epoch.
    pub timestamp: i64,

    /// Advisory per-request token for logging and deduplication hints.
    ///
    /// The wire name is `nonce`, but this is NOT the AEAD nonce (that one is
    /// embedded inside each encrypted field) and it provides NO replay
    /// protection — the proxy does not enforce uniqueness.
    #[serde(rename = "nonce")]
    pub request_token: String,
}

impl Envelope {
    /// Assemble an envelope around two already-encrypted fields, stamping the
    /// current time and a fresh UUIDv4 request token.
    pub fn build(
        company_ref: impl Into<String>,
        encrypted_selector: String,
        encrypted_payload: String,
    ) -> Self {
        Self {
            company_ref: company_ref.into(),
            encrypted_selector,
            encrypted_payload,
            timestamp: epoch_millis(),
            request_token: Uuid::new_v4().to_string(),
        }
    }

    /// Serialise to the JSON wire form.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse an envelope from its JSON wire form.
    ///
    /// The client never calls this; it exists for the proxy side and for
    /// test harnesses that need to open envelopes.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_stamps_time_and_token() {
        let e = Envelope::build("acme-co", "sel".into(), "pay".into());
        assert_eq!(e.company_ref, "acme-co");
        assert!(e.timestamp > 1_600_000_000_000);
        // UUIDv4 string form: 36 chars with hyphens.
        assert_eq!(e.request_token.len(), 36);
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let e = Envelope::build("1", "aaa".into(), "bbb".into());
        let json = e.to_json().unwrap();
        let parsed = Envelope::from_json(&json).unwrap();
        assert_eq!(parsed, e);
    }

    #[test]
    fn wire_field_names_match_the_proxy() {
        let e = Envelope::build("1", "aaa".into(), "bbb".into());
        let v: serde_json::Value = serde_json::from_str(&e.to_json().unwrap()).unwrap();
        let obj = v.as_object().unwrap();
        for key in [
            "companyRef",
            "encryptedConnectionType",
            "encryptedPayload",
            "timestamp",
            "nonce",
        ] {
            assert!(obj.contains_key(key), "missing wire field: {key}");
        }
        assert_eq!(obj.len(), 5);
    }

    #[test]
    fn tokens_differ_between_envelopes() {
        let a = Envelope::build("1", "x".into(), "y".into());
        let b = Envelope::build("1", "x".into(), "y".into());
        assert_ne!(a.request_token, b.request_token);
    }

    #[test]
    fn parse_rejects_missing_fields() {
        let err = Envelope::from_json(r#"{"companyRef": "1"}"#);
        assert!(err.is_err());
    }
}
