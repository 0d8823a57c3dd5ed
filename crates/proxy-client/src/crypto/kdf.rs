//! Key derivation: company identifier → AES-256 key.
//!
//! The deployed scheme ([`Sha256KeyProvider`]) hashes the identifier with a
//! fixed domain-separation suffix. The identifier is not a secret, so this
//! buys obfuscation rather than confidentiality against anyone who knows it;
//! the [`KeyProvider`] trait is the seam for substituting a stronger scheme
//! (e.g. [`HmacKeyProvider`] with a real shared secret) without touching the
//! cipher, envelope, or client layers.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Suffix appended to the identifier before hashing, so the same identifier
/// used for any other purpose cannot collide with this derivation.
const DOMAIN_SUFFIX: &str = "|query-proxy-envelope|v1";

/// Errors produced by key derivation.
#[derive(Debug, Error)]
pub enum DerivationError {
    /// The provider could not produce key material.
    #[error("key derivation failed: {0}")]
    Failed(String),
}

/// Fixed-size key buffer holding exactly [`KEY_LEN`] bytes.
///
/// Lives only for the duration of one request; the memory is overwritten
/// with zeroes on drop so no long-lived key material sits in RAM.
pub struct Key(Box<[u8; KEY_LEN]>);

impl Key {
    /// Wrap a 32-byte digest as key material.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Box::new(bytes))
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("Key([REDACTED])")
    }
}

/// Capability interface for turning an identifier into a symmetric key.
///
/// Implementations must be deterministic (same identifier, same key bytes),
/// side-effect-free, and safe to call concurrently.
pub trait KeyProvider {
    /// Derive the AES-256 key for `identifier`.
    fn derive_key(&self, identifier: &str) -> Result<Key, DerivationError>;
}

/// SHA-256 over `identifier ‖ DOMAIN_SUFFIX`, digest used directly as the
/// AES-256 key. Deterministic and infallible for string input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256KeyProvider;

impl KeyProvider for Sha256KeyProvider {
    fn derive_key(&self, identifier: &str) -> Result<Key, DerivationError> {
        let mut hasher = Sha256::new();
        hasher.update(identifier.as_bytes());
        hasher.update(DOMAIN_SUFFIX.as_bytes());
        Ok(Key::from_bytes(hasher.finalize().into()))
    }
}

/// HMAC-SHA-256 keyed with a caller-supplied secret over the same
/// domain-separated input.
///
/// Drop-in replacement for [`Sha256KeyProvider`] once both ends of the
/// channel hold a shared secret; with it, knowing the identifier alone is no
/// longer enough to re-derive the key.
#[derive(Clone)]
pub struct HmacKeyProvider {
    secret: Vec<u8>,
}

impl HmacKeyProvider {
    /// Create a provider keyed with `secret`.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for HmacKeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HmacKeyProvider([REDACTED])")
    }
}

impl KeyProvider for HmacKeyProvider {
    fn derive_key(&self, identifier: &str) -> Result<Key, DerivationError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.secret)
            .map_err(|e| DerivationError::Failed(e.to_string()))?;
        mac.update(identifier.as_bytes());
        mac.update(DOMAIN_SUFFIX.as_bytes());
        Ok(Key::from_bytes(mac.finalize().into_bytes().into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let p = Sha256KeyProvider;
        let a = p.derive_key("acme-co").unwrap();
        let b = p.derive_key("acme-co").unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn distinct_identifiers_yield_distinct_keys() {
        let p = Sha256KeyProvider;
        let a = p.derive_key("1").unwrap();
        let b = p.derive_key("2").unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn suffix_separates_from_a_plain_hash() {
        let p = Sha256KeyProvider;
        let derived = p.derive_key("acme-co").unwrap();
        let plain: [u8; KEY_LEN] = Sha256::digest(b"acme-co").into();
        assert_ne!(derived.as_bytes(), &plain);
    }

    #[test]
    fn hmac_provider_differs_from_sha256_provider() {
        let sha = Sha256KeyProvider.derive_key("acme-co").unwrap();
        let hmac = HmacKeyProvider::new(b"server-issued-secret".to_vec())
            .derive_key("acme-co")
            .unwrap();
        assert_ne!(sha.as_bytes(), hmac.as_bytes());
    }

    #[test]
    fn hmac_provider_is_deterministic_per_secret() {
        let p = HmacKeyProvider::new(b"s".to_vec());
        let a = p.derive_key("1").unwrap();
        let b = p.derive_key("1").unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
        let other = HmacKeyProvider::new(b"t".to_vec()).derive_key("1").unwrap();
        assert_ne!(a.as_bytes(), other.as_bytes());
    }

    #[test]
    fn key_redacted_in_debug() {
        let key = Sha256KeyProvider.derive_key("1").unwrap();
        assert!(format!("{key:?}").contains("REDACTED"));
    }
}
