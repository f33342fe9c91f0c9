//! ECIES-X25519-ChaCha20-BLAKE3 session-key wrapping.
//!
//! The sender wraps each hop's session key to that hop's public key; only the
//! holder of the matching private key can unwrap it. Authentication comes
//! from the Poly1305 tag: decryption with the wrong key fails outright, it
//! never yields garbage plaintext.
//!
//! ## Algorithm
//!
//! ```text
//! Encrypt(recipient_pk, plaintext):
//!   1. eph_sk = fresh randomness, eph_pk = X25519_basepoint(eph_sk)
//!   2. shared = X25519(eph_sk, recipient_pk)
//!   3. key    = BLAKE3::derive_key("Shallot v1 ecies-encryption-key",
//!               shared || eph_pk || recipient_pk)
//!   4. nonce  = BLAKE3::derive_key("Shallot v1 ecies-nonce", shared || eph_pk)[:12]
//!   5. return eph_pk || ChaCha20-Poly1305(key, nonce, plaintext, aad = eph_pk)
//! ```

use crate::blake3::{self, contexts};
use crate::chacha20;
use crate::x25519::{NodePublicKey, NodeSecretKey};
use crate::{CryptoError, Result};

/// ECIES ciphertext: ephemeral public key + ciphertext + tag.
pub struct EciesCiphertext {
    /// The ephemeral public key (32 bytes).
    pub eph_pk: [u8; 32],
    /// The ciphertext with appended Poly1305 tag.
    pub ciphertext_and_tag: Vec<u8>,
}

impl EciesCiphertext {
    /// Serialize to bytes: eph_pk || ciphertext || tag.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(32 + self.ciphertext_and_tag.len());
        out.extend_from_slice(&self.eph_pk);
        out.extend_from_slice(&self.ciphertext_and_tag);
        out
    }

    /// Deserialize from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 32 + chacha20::TAG_SIZE {
            return Err(CryptoError::Ecies("ciphertext too short".into()));
        }
        let mut eph_pk = [0u8; 32];
        eph_pk.copy_from_slice(&data[..32]);
        Ok(Self {
            eph_pk,
            ciphertext_and_tag: data[32..].to_vec(),
        })
    }
}

/// Encrypt `plaintext` to `recipient_pk` under a fresh ephemeral key.
pub fn encrypt(recipient_pk: &NodePublicKey, plaintext: &[u8]) -> Result<EciesCiphertext> {
    let eph_secret = NodeSecretKey::random();
    let eph_pk = eph_secret.public_key().to_bytes();
    let shared = eph_secret.diffie_hellman(recipient_pk);

    let (key, nonce) = derive_key_and_nonce(shared.as_bytes(), &eph_pk, recipient_pk.as_bytes());
    let ciphertext_and_tag = chacha20::encrypt(&key, &nonce, plaintext, &eph_pk)?;

    Ok(EciesCiphertext {
        eph_pk,
        ciphertext_and_tag,
    })
}

/// Decrypt an ECIES ciphertext with the recipient's secret key.
pub fn decrypt(recipient_sk: &NodeSecretKey, ciphertext: &EciesCiphertext) -> Result<Vec<u8>> {
    let eph_pk = NodePublicKey::from_bytes(ciphertext.eph_pk);
    let recipient_pk = recipient_sk.public_key();
    let shared = recipient_sk.diffie_hellman(&eph_pk);

    let (key, nonce) =
        derive_key_and_nonce(shared.as_bytes(), &ciphertext.eph_pk, recipient_pk.as_bytes());
    chacha20::decrypt(&key, &nonce, &ciphertext.ciphertext_and_tag, &ciphertext.eph_pk)
}

/// Derive the AEAD key and nonce for one ECIES operation.
fn derive_key_and_nonce(
    shared: &[u8; 32],
    eph_pk: &[u8; 32],
    recipient_pk: &[u8; 32],
) -> ([u8; 32], [u8; 12]) {
    let mut key_material = Vec::with_capacity(32 + 32 + 32);
    key_material.extend_from_slice(shared);
    key_material.extend_from_slice(eph_pk);
    key_material.extend_from_slice(recipient_pk);
    let key = blake3::derive_key(contexts::ECIES_ENCRYPTION_KEY, &key_material);

    let mut nonce_material = Vec::with_capacity(32 + 32);
    nonce_material.extend_from_slice(shared);
    nonce_material.extend_from_slice(eph_pk);
    let nonce_full = blake3::derive_key(contexts::ECIES_NONCE, &nonce_material);
    let mut nonce = [0u8; 12];
    nonce.copy_from_slice(&nonce_full[..12]);

    (key, nonce)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ecies_roundtrip() {
        let sk = NodeSecretKey::random();
        let pk = sk.public_key();

        let ct = encrypt(&pk, b"session key bytes").expect("encrypt");
        let decrypted = decrypt(&sk, &ct).expect("decrypt");
        assert_eq!(decrypted, b"session key bytes");
    }

    #[test]
    fn test_ecies_wrong_recipient_fails() {
        let intended = NodeSecretKey::random();
        let other = NodeSecretKey::random();

        let ct = encrypt(&intended.public_key(), b"secret").expect("encrypt");
        assert!(decrypt(&other, &ct).is_err());
    }

    #[test]
    fn test_ecies_tampered_fails() {
        let sk = NodeSecretKey::random();
        let mut ct = encrypt(&sk.public_key(), b"secret").expect("encrypt");
        if let Some(byte) = ct.ciphertext_and_tag.first_mut() {
            *byte ^= 0xFF;
        }
        assert!(decrypt(&sk, &ct).is_err());
    }

    #[test]
    fn test_ecies_serialization() {
        let sk = NodeSecretKey::random();
        let pk = sk.public_key();

        let ct = encrypt(&pk, b"test data").expect("encrypt");
        let restored = EciesCiphertext::from_bytes(&ct.to_bytes()).expect("deserialize");
        let decrypted = decrypt(&sk, &restored).expect("decrypt");
        assert_eq!(decrypted, b"test data");
    }

    #[test]
    fn test_ecies_from_bytes_too_short() {
        assert!(EciesCiphertext::from_bytes(&[0u8; 16]).is_err());
    }

    #[test]
    fn test_ecies_fresh_ephemeral_per_call() {
        let pk = NodeSecretKey::random().public_key();
        let ct1 = encrypt(&pk, b"x").expect("encrypt");
        let ct2 = encrypt(&pk, b"x").expect("encrypt");
        assert_ne!(ct1.eph_pk, ct2.eph_pk);
    }
}
