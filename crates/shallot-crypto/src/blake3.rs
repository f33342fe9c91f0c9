//! Domain-separated BLAKE3 key derivation.
//!
//! Every derived key and nonce in shallot uses BLAKE3's `derive_key` mode
//! with a registered context string. Cross-domain collisions are prevented by
//! the context; using an unregistered context string is a protocol violation.

/// Registered BLAKE3 context strings.
pub mod contexts {
    /// Encryption key inside an ECIES session-key wrap.
    pub const ECIES_ENCRYPTION_KEY: &str = "Shallot v1 ecies-encryption-key";
    /// AEAD nonce inside an ECIES session-key wrap.
    pub const ECIES_NONCE: &str = "Shallot v1 ecies-nonce";
    /// AEAD nonce for a single-use session key.
    pub const SESSION_NONCE: &str = "Shallot v1 session-nonce";

    /// All registered context strings.
    pub const ALL_CONTEXTS: &[&str] = &[ECIES_ENCRYPTION_KEY, ECIES_NONCE, SESSION_NONCE];
}

/// Derive a 32-byte key from `material` under a registered context.
pub fn derive_key(context: &str, material: &[u8]) -> [u8; 32] {
    ::blake3::derive_key(context, material)
}
