//! X25519 node keypairs (RFC 7748).
//!
//! Each relay node holds one static keypair for its whole lifetime; the
//! public half is published through the registry, the private half never
//! leaves the node (outside the test-only export).

use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroize;

/// A node's long-lived X25519 secret key.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct NodeSecretKey {
    inner: StaticSecret,
}

/// A node's X25519 public key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePublicKey {
    bytes: [u8; 32],
}

/// An X25519 shared secret.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SharedSecret {
    bytes: [u8; 32],
}

impl NodeSecretKey {
    /// Generate a fresh random secret key.
    pub fn random() -> Self {
        Self {
            inner: StaticSecret::random_from_rng(OsRng),
        }
    }

    /// Reconstruct from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self {
            inner: StaticSecret::from(bytes),
        }
    }

    /// Raw bytes of this secret.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes()
    }

    /// The corresponding public key.
    pub fn public_key(&self) -> NodePublicKey {
        let pk = PublicKey::from(&self.inner);
        NodePublicKey {
            bytes: pk.to_bytes(),
        }
    }

    /// Perform Diffie-Hellman key agreement.
    pub fn diffie_hellman(&self, their_public: &NodePublicKey) -> SharedSecret {
        let pk = PublicKey::from(their_public.bytes);
        let shared = self.inner.diffie_hellman(&pk);
        SharedSecret {
            bytes: *shared.as_bytes(),
        }
    }
}

impl NodePublicKey {
    /// Reconstruct from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Raw bytes by value.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.bytes
    }

    /// Raw bytes by reference.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

impl SharedSecret {
    /// Raw bytes of the shared secret.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}
