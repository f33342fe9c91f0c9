//! Integration test crate for the shallot overlay.
//!
//! Contains only end-to-end tests and the [`SimOverlay`] helper they share.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p shallot-integration-tests
//! ```

use std::sync::Arc;
use std::time::Duration;

use shallot_onion::relay::RelayNode;
use shallot_onion::selector::PathSelector;
use shallot_onion::user::UserNode;
use shallot_registry::Registry;
use shallot_transport::LoopbackNetwork;
use shallot_types::{NodeId, UserId};

/// A complete in-process overlay: registry, network, relays.
pub struct SimOverlay {
    pub registry: Arc<Registry>,
    pub network: Arc<LoopbackNetwork>,
    pub relays: Vec<Arc<RelayNode>>,
}

impl SimOverlay {
    /// Bootstrap `relay_count` relays with the default per-hop timeout.
    pub fn bootstrap(relay_count: u32) -> Self {
        Self::bootstrap_with_timeout(relay_count, None)
    }

    /// Bootstrap with an explicit per-hop timeout.
    pub fn bootstrap_with_timeout(relay_count: u32, hop_timeout: Option<Duration>) -> Self {
        let registry = Arc::new(Registry::new());
        let network = Arc::new(match hop_timeout {
            Some(timeout) => LoopbackNetwork::with_hop_timeout(timeout),
            None => LoopbackNetwork::new(),
        });

        let relays: Vec<Arc<RelayNode>> = (0..relay_count)
            .map(|node_id| {
                let relay = RelayNode::bootstrap(node_id, &registry, network.clone());
                network.attach_relay(node_id, relay.clone());
                relay
            })
            .collect();

        Self {
            registry,
            network,
            relays,
        }
    }

    /// Create a user node with uniform path selection and attach its inbox.
    pub fn add_user(&self, user_id: UserId) -> Arc<UserNode> {
        let user = UserNode::new(user_id, self.registry.clone(), self.network.clone());
        self.network.attach_inbox(user_id, user.clone());
        user
    }

    /// Create a user node with an injected selection strategy.
    pub fn add_user_with_selector(
        &self,
        user_id: UserId,
        selector: Box<dyn PathSelector>,
    ) -> Arc<UserNode> {
        let user = UserNode::with_selector(
            user_id,
            self.registry.clone(),
            self.network.clone(),
            selector,
        );
        self.network.attach_inbox(user_id, user.clone());
        user
    }

    /// The relay with the given node id.
    pub fn relay(&self, node_id: NodeId) -> &Arc<RelayNode> {
        &self.relays[node_id as usize]
    }
}
