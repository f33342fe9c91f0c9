//! Single-use symmetric session keys.
//!
//! A session key encrypts exactly one onion layer's payload and is held by
//! exactly two parties: the sender that generated it and the hop whose public
//! key it was wrapped to. Because each key seals exactly one payload, the
//! AEAD nonce is derived from the key itself with a domain-separated context
//! (same derivation pattern as the per-hop keys the key exchange produces).

use rand::RngCore;
use zeroize::Zeroize;

use crate::blake3::{self, contexts};
use crate::chacha20;
use crate::Result;

/// Length of an exported session key in bytes.
pub const SESSION_KEY_SIZE: usize = 32;

/// An ephemeral symmetric key for one onion layer.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SessionKey {
    bytes: [u8; SESSION_KEY_SIZE],
}

impl SessionKey {
    /// Generate a fresh random session key.
    pub fn random() -> Self {
        let mut bytes = [0u8; SESSION_KEY_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Reconstruct a session key from exported bytes.
    pub fn from_bytes(bytes: [u8; SESSION_KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Export the raw key material (for asymmetric wrapping).
    pub fn to_bytes(&self) -> [u8; SESSION_KEY_SIZE] {
        self.bytes
    }

    /// Encrypt one payload under this key.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = self.derive_nonce();
        chacha20::encrypt(&self.bytes, &nonce, plaintext, &[])
    }

    /// Decrypt a payload sealed under this key.
    pub fn open(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let nonce = self.derive_nonce();
        chacha20::decrypt(&self.bytes, &nonce, ciphertext, &[])
    }

    /// Nonce for this key's single AEAD operation.
    fn derive_nonce(&self) -> [u8; chacha20::NONCE_SIZE] {
        let full = blake3::derive_key(contexts::SESSION_NONCE, &self.bytes);
        let mut nonce = [0u8; chacha20::NONCE_SIZE];
        nonce.copy_from_slice(&full[..chacha20::NONCE_SIZE]);
        nonce
    }
}
