//! AES-256-GCM encryption and decryption of individual envelope fields.
//!
//! Every encryption call draws a fresh 96-bit nonce from the OS CSPRNG.
//! **Nonce reuse under one key silently breaks confidentiality** — it is the
//! single most important invariant here, and the reason a seeded or
//! deterministic PRNG must never be substituted for [`OsRng`].

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use super::kdf::Key;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Errors produced by the cipher layer.
///
/// Decrypt-side failures are deliberately collapsed into one variant:
/// malformed base64, truncated input, a wrong key, and tampered ciphertext
/// are indistinguishable to the caller, so error handling cannot become a
/// decryption oracle.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The AEAD primitive failed to encrypt (should be unreachable with a
    /// valid key and a working CSPRNG).
    #[error("encryption failed")]
    Encryption,

    /// The input could not be authenticated and decrypted.
    #[error("authentication failed")]
    Authentication,
}

/// Encrypt `plaintext` under `key`, returning `base64(nonce‖ciphertext‖tag)`.
pub fn encrypt(plaintext: &[u8], key: &Key) -> Result<String, CipherError> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    // Fresh nonce per call from the OS CSPRNG.
    use aes_gcm::aead::rand_core::RngCore;
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|_| CipherError::Encryption)?;

    let mut raw = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    raw.extend_from_slice(&nonce_bytes);
    raw.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(raw))
}

/// Decrypt a `base64(nonce‖ciphertext‖tag)` string produced by [`encrypt`].
///
/// The tag is verified before any plaintext byte is released; no partial or
/// unauthenticated output exists on any failure path.
///
/// # Errors
///
/// Returns [`CipherError::Authentication`] for every failure: bad encoding,
/// truncated input, wrong key, or tampered data.
pub fn decrypt(encoded: &str, key: &Key) -> Result<Vec<u8>, CipherError> {
    let raw = STANDARD
        .decode(encoded)
        .map_err(|_| CipherError::Authentication)?;
    if raw.len() < NONCE_LEN + TAG_LEN {
        return Err(CipherError::Authentication);
    }
    let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);

    let cipher = Aes256Gcm::new(key.as_bytes().into());
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| CipherError::Authentication)
}
