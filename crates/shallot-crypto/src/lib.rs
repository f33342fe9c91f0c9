//! # shallot-crypto
//!
//! Cryptographic primitives for the shallot onion-routing overlay.
//!
//! The overlay consumes these as black boxes: key generation, asymmetric
//! wrap/unwrap of session keys, and symmetric payload encryption. The suite
//! is fixed — no algorithm negotiation.
//!
//! - [`blake3`] — domain-separated key and nonce derivation
//! - [`x25519`] — X25519 node keypairs (RFC 7748)
//! - [`chacha20`] — ChaCha20-Poly1305 AEAD (RFC 8439)
//! - [`ecies`] — ECIES-X25519-ChaCha20-BLAKE3 session-key wrapping
//! - [`session`] — single-use symmetric session keys

pub mod blake3;
pub mod chacha20;
pub mod ecies;
pub mod session;
pub mod x25519;

/// Error types for cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// AEAD decryption failed (authentication tag mismatch).
    #[error("AEAD decryption failed")]
    AeadDecryption,

    /// Invalid key length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// ECIES encryption/decryption failed.
    #[error("ECIES error: {0}")]
    Ecies(String),

    /// Invalid input data.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
