//! Key derivation and AES-256-GCM field encryption primitives.
//!
//! This module is intentionally free of HTTP and envelope dependencies.
//!
//! # Ciphertext format
//!
//! ```text
//! base64(nonce ‖ ciphertext ‖ tag)
//! ```
//!
//! A single standard-alphabet base64 string. The 96-bit nonce is generated
//! fresh from the OS CSPRNG on every encryption; the string is
//! self-contained and decryption needs only the re-derived key.

pub mod cipher;
pub mod kdf;

pub use kdf::KEY_LEN;
