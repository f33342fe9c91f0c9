//! Narrow interfaces between overlay components.

use async_trait::async_trait;

use shallot_types::error::Result;
use shallot_types::layer::OnionLayer;
use shallot_types::wire::Ack;
use shallot_types::{NodeId, UserId};

/// A relay node's forwarding interface.
///
/// Accepts one layer object and synchronously returns the acknowledgment (or
/// failure) of the whole remaining chain: the callee does not answer until
/// every hop after it has answered.
#[async_trait]
pub trait Forwarding: Send + Sync {
    async fn forward_layer(&self, layer: OnionLayer) -> Result<Ack>;
}

/// A destination's inbox interface. Accepts plaintext content only.
#[async_trait]
pub trait Inbox: Send + Sync {
    async fn deliver(&self, message: String) -> Result<Ack>;
}

/// Resolves overlay identifiers to live service instances.
///
/// Implementations must report an unreachable target as
/// [`ProtocolError::UnknownNextHop`](shallot_types::error::ProtocolError) and
/// bound each dispatch with a per-hop timeout surfaced as
/// [`ProtocolError::ForwardingTimeout`](shallot_types::error::ProtocolError),
/// never silently treated as success and never retried.
#[async_trait]
pub trait Network: Send + Sync {
    /// Hand a layer to the relay identified by `node_id`.
    async fn forward(&self, node_id: NodeId, layer: OnionLayer) -> Result<Ack>;

    /// Deliver plaintext to the user identified by `user_id`.
    async fn deliver(&self, user_id: UserId, message: String) -> Result<Ack>;
}
