//! Protocol-wide error taxonomy.
//!
//! Every failure a sender can observe maps to exactly one of these kinds,
//! and every service reports failures with the same `{status, kind, message}`
//! envelope (see [`crate::wire::ErrorBody`]). No component masks or retries a
//! failure; errors propagate synchronously backward through the call chain.

use crate::NodeId;

/// Failures defined by the onion-routing protocol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The registry holds fewer nodes than a circuit needs.
    ///
    /// Detected before any network I/O: a send that fails this way has no
    /// side effects anywhere in the overlay.
    #[error("insufficient nodes: need {need}, have {have}")]
    InsufficientNodes { need: usize, have: usize },

    /// A layer object is missing a required field or its decrypted payload
    /// does not parse.
    #[error("malformed layer: {0}")]
    MalformedLayer(String),

    /// A session-key ciphertext was not addressed to the receiving node, or
    /// was corrupted in transit.
    #[error("decryption failed: ciphertext not addressed to this node or corrupted")]
    DecryptionError,

    /// The referenced next hop (or destination inbox) is not reachable.
    #[error("unknown next hop: {0}")]
    UnknownNextHop(NodeId),

    /// A hop did not answer within the bounded per-hop interval.
    #[error("no response from node {node_id} within {timeout_ms}ms")]
    ForwardingTimeout { node_id: NodeId, timeout_ms: u64 },
}

impl ProtocolError {
    /// Stable wire identifier for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientNodes { .. } => "insufficient_nodes",
            Self::MalformedLayer(_) => "malformed_layer",
            Self::DecryptionError => "decryption_error",
            Self::UnknownNextHop(_) => "unknown_next_hop",
            Self::ForwardingTimeout { .. } => "forwarding_timeout",
        }
    }
}

/// Convenience result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
