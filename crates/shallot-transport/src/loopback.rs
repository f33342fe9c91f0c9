//! In-process overlay network.
//!
//! Routes layer objects and inbox deliveries between service instances
//! living in the same process. Each dispatch is bounded by the per-hop
//! timeout; an expired timeout is reported as `ForwardingTimeout` and never
//! retried. Lookup failures are `UnknownNextHop`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use shallot_types::error::{ProtocolError, Result};
use shallot_types::layer::OnionLayer;
use shallot_types::wire::Ack;
use shallot_types::{NodeId, UserId};

use crate::traits::{Forwarding, Inbox, Network};
use crate::DEFAULT_HOP_TIMEOUT_MS;

/// Routing table of live service instances.
pub struct LoopbackNetwork {
    hop_timeout: Duration,
    relays: RwLock<HashMap<NodeId, Arc<dyn Forwarding>>>,
    inboxes: RwLock<HashMap<UserId, Arc<dyn Inbox>>>,
}

impl LoopbackNetwork {
    /// Create a network with the default per-hop timeout.
    pub fn new() -> Self {
        Self::with_hop_timeout(Duration::from_millis(DEFAULT_HOP_TIMEOUT_MS))
    }

    /// Create a network with an explicit per-hop timeout bound.
    pub fn with_hop_timeout(hop_timeout: Duration) -> Self {
        Self {
            hop_timeout,
            relays: RwLock::new(HashMap::new()),
            inboxes: RwLock::new(HashMap::new()),
        }
    }

    /// Make a relay's forwarding interface reachable under `node_id`.
    pub fn attach_relay(&self, node_id: NodeId, relay: Arc<dyn Forwarding>) {
        self.relays
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(node_id, relay);
        debug!(node_id, "relay attached to loopback network");
    }

    /// Make a user's inbox reachable under `user_id`.
    pub fn attach_inbox(&self, user_id: UserId, inbox: Arc<dyn Inbox>) {
        self.inboxes
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(user_id, inbox);
        debug!(user_id, "inbox attached to loopback network");
    }

    fn relay(&self, node_id: NodeId) -> Result<Arc<dyn Forwarding>> {
        self.relays
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&node_id)
            .cloned()
            .ok_or(ProtocolError::UnknownNextHop(node_id))
    }

    fn inbox(&self, user_id: UserId) -> Result<Arc<dyn Inbox>> {
        self.inboxes
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&user_id)
            .cloned()
            .ok_or(ProtocolError::UnknownNextHop(user_id))
    }
}

impl Default for LoopbackNetwork {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Network for LoopbackNetwork {
    async fn forward(&self, node_id: NodeId, layer: OnionLayer) -> Result<Ack> {
        let relay = self.relay(node_id)?;
        match tokio::time::timeout(self.hop_timeout, relay.forward_layer(layer)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(node_id, "hop did not answer within the timeout");
                Err(ProtocolError::ForwardingTimeout {
                    node_id,
                    timeout_ms: self.hop_timeout.as_millis() as u64,
                })
            }
        }
    }

    async fn deliver(&self, user_id: UserId, message: String) -> Result<Ack> {
        let inbox = self.inbox(user_id)?;
        match tokio::time::timeout(self.hop_timeout, inbox.deliver(message)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(user_id, "inbox did not answer within the timeout");
                Err(ProtocolError::ForwardingTimeout {
                    node_id: user_id,
                    timeout_ms: self.hop_timeout.as_millis() as u64,
                })
            }
        }
    }
}
