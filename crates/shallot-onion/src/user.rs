//! The user node: message sender and destination inbox.
//!
//! A user node originates messages (circuit selection + onion construction +
//! dispatch to the entry hop) and terminates them (an inbox storing the last
//! received plaintext). Every instance owns its diagnostic fields; nothing is
//! process-wide.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, info};

use shallot_registry::Registry;
use shallot_transport::{Inbox, Network};
use shallot_types::diagnostics::UserDiagnostics;
use shallot_types::error::Result;
use shallot_types::wire::{Ack, SendRequest, SendResponse, Status};
use shallot_types::{NodeId, UserId};

use crate::circuit::CircuitBuilder;
use crate::selector::PathSelector;

/// One user service instance.
pub struct UserNode {
    user_id: UserId,
    registry: Arc<Registry>,
    network: Arc<dyn Network>,
    builder: CircuitBuilder,
    diagnostics: Mutex<UserDiagnostics>,
}

impl UserNode {
    /// User node with uniform random path selection.
    pub fn new(user_id: UserId, registry: Arc<Registry>, network: Arc<dyn Network>) -> Arc<Self> {
        Self::with_builder(user_id, registry, network, CircuitBuilder::new())
    }

    /// User node with an injected selection strategy.
    pub fn with_selector(
        user_id: UserId,
        registry: Arc<Registry>,
        network: Arc<dyn Network>,
        selector: Box<dyn PathSelector>,
    ) -> Arc<Self> {
        Self::with_builder(
            user_id,
            registry,
            network,
            CircuitBuilder::with_selector(selector),
        )
    }

    fn with_builder(
        user_id: UserId,
        registry: Arc<Registry>,
        network: Arc<dyn Network>,
        builder: CircuitBuilder,
    ) -> Arc<Self> {
        Arc::new(Self {
            user_id,
            registry,
            network,
            builder,
            diagnostics: Mutex::new(UserDiagnostics::default()),
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Send a message through the overlay.
    ///
    /// Fetches a registry snapshot, selects a circuit, builds the onion and
    /// blocks on the entry hop's acknowledgment, which itself covers the
    /// whole chain. All failures before dispatch are side-effect-free: no
    /// request leaves this node.
    pub async fn send_message(&self, request: SendRequest) -> Result<SendResponse> {
        let snapshot = self.registry.list();
        let circuit = self.builder.select_circuit(&snapshot)?;
        let onion = self
            .builder
            .build_onion(&circuit, &request.message, request.destination_user_id)?;

        self.record_send(&request.message, circuit.node_ids());

        let entry = circuit.entry_hop().node_id;
        debug!(
            user_id = self.user_id,
            entry,
            circuit = ?circuit.node_ids(),
            "dispatching onion to entry hop"
        );
        self.network.forward(entry, onion).await?;

        info!(
            user_id = self.user_id,
            destination = request.destination_user_id,
            "message delivered through circuit"
        );
        Ok(SendResponse {
            status: Status::Success,
            circuit: circuit.node_ids(),
        })
    }

    /// Snapshot of the diagnostic fields (verification only).
    pub fn diagnostics(&self) -> UserDiagnostics {
        self.diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The last plaintext delivered to this user's inbox.
    pub fn last_received_message(&self) -> Option<String> {
        self.diagnostics().last_received_message
    }

    /// The circuit chosen for this user's last send.
    pub fn last_circuit(&self) -> Option<Vec<NodeId>> {
        self.diagnostics().last_circuit
    }

    fn record_send(&self, message: &str, circuit: Vec<NodeId>) {
        let mut diag = self
            .diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        diag.last_sent_message = Some(message.to_string());
        diag.last_circuit = Some(circuit);
    }
}

#[async_trait]
impl Inbox for UserNode {
    async fn deliver(&self, message: String) -> Result<Ack> {
        debug!(user_id = self.user_id, "inbox received message");
        let mut diag = self
            .diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        diag.last_received_message = Some(message);
        Ok(Ack::success())
    }
}

#[cfg(test)]
mod tests {
    use shallot_transport::LoopbackNetwork;
    use shallot_types::error::ProtocolError;
    use shallot_types::wire::RegisterRequest;

    use crate::relay::RelayNode;
    use crate::selector::FixedSelector;

    use super::*;

    fn overlay(relay_count: u32) -> (Arc<Registry>, Arc<LoopbackNetwork>) {
        let registry = Arc::new(Registry::new());
        let network = Arc::new(LoopbackNetwork::new());
        for node_id in 0..relay_count {
            let relay = RelayNode::bootstrap(node_id, &registry, network.clone());
            network.attach_relay(node_id, relay);
        }
        (registry, network)
    }

    #[tokio::test]
    async fn test_send_roundtrip() {
        let (registry, network) = overlay(5);
        let alice = UserNode::new(0, registry.clone(), network.clone());
        let bob = UserNode::new(1, registry.clone(), network.clone());
        network.attach_inbox(0, alice.clone());
        network.attach_inbox(1, bob.clone());

        let response = alice
            .send_message(SendRequest {
                message: "hi bob".to_string(),
                destination_user_id: 1,
            })
            .await
            .expect("send");

        assert_eq!(response.status, Status::Success);
        assert_eq!(response.circuit.len(), 3);
        assert_eq!(bob.last_received_message().as_deref(), Some("hi bob"));
        assert_eq!(alice.last_circuit(), Some(response.circuit));
        assert_eq!(alice.diagnostics().last_sent_message.as_deref(), Some("hi bob"));
    }

    #[tokio::test]
    async fn test_insufficient_nodes_is_side_effect_free() {
        let (registry, network) = overlay(2);
        let alice = UserNode::new(0, registry.clone(), network.clone());

        let result = alice
            .send_message(SendRequest {
                message: "hi".to_string(),
                destination_user_id: 1,
            })
            .await;

        assert_eq!(
            result,
            Err(ProtocolError::InsufficientNodes { need: 3, have: 2 })
        );
        // Nothing recorded: the failure happened before any dispatch.
        assert!(alice.diagnostics().last_sent_message.is_none());
        assert!(alice.last_circuit().is_none());
    }

    #[tokio::test]
    async fn test_fixed_circuit_is_honored() {
        let (registry, network) = overlay(5);
        let alice = UserNode::with_selector(
            0,
            registry.clone(),
            network.clone(),
            Box::new(FixedSelector::new(vec![2, 0, 4])),
        );
        let bob = UserNode::new(1, registry.clone(), network.clone());
        network.attach_inbox(1, bob.clone());

        let response = alice
            .send_message(SendRequest {
                message: "hello".to_string(),
                destination_user_id: 1,
            })
            .await
            .expect("send");

        assert_eq!(response.circuit, vec![2, 0, 4]);
        assert_eq!(alice.last_circuit(), Some(vec![2, 0, 4]));
        assert_eq!(bob.last_received_message().as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_missing_destination_inbox_fails_cleanly() {
        let (registry, network) = overlay(3);
        let alice = UserNode::new(0, registry.clone(), network.clone());

        let result = alice
            .send_message(SendRequest {
                message: "to nobody".to_string(),
                destination_user_id: 9,
            })
            .await;

        assert_eq!(result, Err(ProtocolError::UnknownNextHop(9)));
    }

    #[tokio::test]
    async fn test_users_do_not_share_state() {
        let (registry, network) = overlay(3);
        let alice = UserNode::new(0, registry.clone(), network.clone());
        let bob = UserNode::new(1, registry.clone(), network.clone());
        let carol = UserNode::new(2, registry.clone(), network.clone());
        network.attach_inbox(1, bob.clone());
        network.attach_inbox(2, carol.clone());

        alice
            .send_message(SendRequest {
                message: "for bob".to_string(),
                destination_user_id: 1,
            })
            .await
            .expect("send");

        assert_eq!(bob.last_received_message().as_deref(), Some("for bob"));
        assert!(carol.last_received_message().is_none());
        assert!(bob.last_circuit().is_none(), "receiving must not record a circuit");
    }

    #[tokio::test]
    async fn test_registry_snapshot_taken_per_send() {
        let registry = Arc::new(Registry::new());
        let network = Arc::new(LoopbackNetwork::new());
        let alice = UserNode::new(0, registry.clone(), network.clone());

        // Two nodes: not enough.
        for node_id in 0..2 {
            let relay = RelayNode::bootstrap(node_id, &registry, network.clone());
            network.attach_relay(node_id, relay);
        }
        let result = alice
            .send_message(SendRequest {
                message: "early".to_string(),
                destination_user_id: 1,
            })
            .await;
        assert!(matches!(
            result,
            Err(ProtocolError::InsufficientNodes { .. })
        ));

        // A third registration makes the next snapshot sufficient.
        let relay = RelayNode::bootstrap(2, &registry, network.clone());
        network.attach_relay(2, relay);
        let bob = UserNode::new(1, registry.clone(), network.clone());
        network.attach_inbox(1, bob.clone());

        alice
            .send_message(SendRequest {
                message: "late".to_string(),
                destination_user_id: 1,
            })
            .await
            .expect("send succeeds once three nodes exist");
        assert_eq!(bob.last_received_message().as_deref(), Some("late"));
    }

    #[test]
    fn test_register_request_shape_matches_bootstrap() {
        // The registry's wire request carries the exported public key.
        let request = RegisterRequest {
            node_id: 1,
            public_key: [0x11; 32],
            address: "relay-1.shallot.sim:4433".to_string(),
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert!(json["publicKey"].is_string());
    }
}
