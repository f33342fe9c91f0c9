//! Integration test: failure propagation through the overlay.
//!
//! Exercises every kind in the error taxonomy end to end:
//! pre-flight `InsufficientNodes` with zero side effects, `DecryptionError`
//! on misaddressed layers, `UnknownNextHop` mid-chain, and
//! `ForwardingTimeout` on a stalled hop. A failed hop is terminal: no later
//! hop is ever contacted and nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shallot_integration_tests::SimOverlay;
use shallot_onion::circuit::CircuitBuilder;
use shallot_onion::relay::RelayNode;
use shallot_onion::selector::FixedSelector;
use shallot_onion::user::UserNode;
use shallot_registry::Registry;
use shallot_transport::{Forwarding, LoopbackNetwork, Network};
use shallot_types::error::{ProtocolError, Result};
use shallot_types::layer::OnionLayer;
use shallot_types::wire::{Ack, ErrorBody, RegisterRequest, SendRequest, Status};

#[tokio::test]
async fn insufficient_nodes_is_side_effect_free() {
    let overlay = SimOverlay::bootstrap(2);
    let alice = overlay.add_user(0);
    let _bob = overlay.add_user(1);

    let result = alice
        .send_message(SendRequest {
            message: "never sent".to_string(),
            destination_user_id: 1,
        })
        .await;

    assert_eq!(
        result,
        Err(ProtocolError::InsufficientNodes { need: 3, have: 2 })
    );

    // Zero forwarding requests were observed at any relay.
    for relay in &overlay.relays {
        let diag = relay.diagnostics();
        assert!(diag.last_received_encrypted_message.is_none());
        assert!(diag.last_received_decrypted_message.is_none());
        assert!(diag.last_message_destination.is_none());
    }
    assert!(alice.diagnostics().last_sent_message.is_none());
}

#[tokio::test]
async fn misaddressed_layer_is_rejected_not_garbled() {
    // Non-forgeability of addressing: a layer wrapped to node 0 handed to
    // node 1 must fail with DecryptionError, never "succeed" with garbage.
    let overlay = SimOverlay::bootstrap(3);

    let builder = CircuitBuilder::with_selector(Box::new(FixedSelector::new(vec![0, 1, 2])));
    let snapshot = overlay.registry.list();
    let circuit = builder.select_circuit(&snapshot).expect("circuit");
    let onion = builder.build_onion(&circuit, "secret", 1).expect("onion");

    let result = overlay.network.forward(1, onion).await;
    assert_eq!(result, Err(ProtocolError::DecryptionError));

    // The wrong node saw the ciphertext but recovered nothing.
    let diag = overlay.relay(1).diagnostics();
    assert!(diag.last_received_encrypted_message.is_some());
    assert!(diag.last_received_decrypted_message.is_none());

    // The chain aborted: the intended entry node was never contacted.
    let diag = overlay.relay(0).diagnostics();
    assert!(diag.last_received_encrypted_message.is_none());
}

#[tokio::test]
async fn unreachable_hop_aborts_the_chain() {
    let registry = Arc::new(Registry::new());
    let network = Arc::new(LoopbackNetwork::new());

    // Three registered relays, but node 2 never comes online.
    for node_id in 0..2 {
        let relay = RelayNode::bootstrap(node_id, &registry, network.clone());
        network.attach_relay(node_id, relay);
    }
    let offline = RelayNode::bootstrap(2, &registry, network.clone());

    let alice = UserNode::with_selector(
        0,
        registry.clone(),
        network.clone(),
        Box::new(FixedSelector::new(vec![0, 1, 2])),
    );

    let result = alice
        .send_message(SendRequest {
            message: "stranded".to_string(),
            destination_user_id: 1,
        })
        .await;

    // The middle hop could not reach node 2; the failure propagated back
    // through the chain unchanged.
    assert_eq!(result, Err(ProtocolError::UnknownNextHop(2)));
    assert!(offline
        .diagnostics()
        .last_received_encrypted_message
        .is_none());
}

/// A relay that accepts a layer and never answers.
struct StalledRelay;

#[async_trait]
impl Forwarding for StalledRelay {
    async fn forward_layer(&self, _layer: OnionLayer) -> Result<Ack> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Ack::success())
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_hop_surfaces_as_forwarding_timeout() {
    let registry = Arc::new(Registry::new());
    let network = Arc::new(LoopbackNetwork::with_hop_timeout(Duration::from_millis(50)));

    for node_id in 0..2 {
        let relay = RelayNode::bootstrap(node_id, &registry, network.clone());
        network.attach_relay(node_id, relay);
    }
    // Node 2 is registered but stalls forever on any inbound layer.
    registry.register(RegisterRequest {
        node_id: 2,
        public_key: [0x22; 32],
        address: "relay-2.shallot.sim:4433".to_string(),
    });
    network.attach_relay(2, Arc::new(StalledRelay));

    let alice = UserNode::with_selector(
        0,
        registry.clone(),
        network.clone(),
        Box::new(FixedSelector::new(vec![0, 1, 2])),
    );

    let result = alice
        .send_message(SendRequest {
            message: "patience".to_string(),
            destination_user_id: 1,
        })
        .await;

    let err = result.expect_err("stalled hop must not succeed");
    assert!(
        matches!(
            err,
            ProtocolError::ForwardingTimeout { timeout_ms: 50, .. }
        ),
        "expected forwarding timeout, got {err:?}"
    );
}

#[test]
fn every_failure_maps_to_a_structured_envelope() {
    let cases = [
        (
            ProtocolError::InsufficientNodes { need: 3, have: 2 },
            "insufficient_nodes",
        ),
        (
            ProtocolError::MalformedLayer("encryptedMessage is empty".to_string()),
            "malformed_layer",
        ),
        (ProtocolError::DecryptionError, "decryption_error"),
        (ProtocolError::UnknownNextHop(2), "unknown_next_hop"),
        (
            ProtocolError::ForwardingTimeout {
                node_id: 1,
                timeout_ms: 2000,
            },
            "forwarding_timeout",
        ),
    ];

    for (err, kind) in cases {
        let body = ErrorBody::from(&err);
        assert_eq!(body.status, Status::Error);
        assert_eq!(body.kind, kind);
        assert!(!body.message.is_empty());

        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["status"], "error");
        assert_eq!(json["kind"], kind);
    }
}
