//! The peel-and-forward relay node.
//!
//! Each inbound layer drives one pass through the forwarding state machine:
//!
//! ```text
//! Idle -> Receiving -> Decrypting -> { Forwarding | Delivering } -> Idle
//! ```
//!
//! A node keeps no state across messages beyond its fixed keypair and its
//! diagnostic fields, so any number of in-flight messages stay independent.
//! Every failure is reported synchronously to the immediate caller; a relay
//! never retries, and a failed hop means no later hop is contacted.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::{debug, warn};

use shallot_crypto::ecies::{self, EciesCiphertext};
use shallot_crypto::session::SessionKey;
use shallot_crypto::x25519::{NodePublicKey, NodeSecretKey};
use shallot_registry::Registry;
use shallot_transport::{json, Forwarding, Network};
use shallot_types::diagnostics::RelayDiagnostics;
use shallot_types::error::{ProtocolError, Result};
use shallot_types::layer::OnionLayer;
use shallot_types::wire::{Ack, RegisterRequest};
use shallot_types::{NodeId, UserId};

/// One relay node service instance.
pub struct RelayNode {
    node_id: NodeId,
    secret_key: NodeSecretKey,
    network: Arc<dyn Network>,
    diagnostics: Mutex<RelayDiagnostics>,
}

/// Phases of one peel-and-forward cycle. The machine exists per inbound
/// layer; `Idle` is the absence of a cycle.
enum Step {
    Receiving { layer: OnionLayer },
    Decrypting { layer: OnionLayer },
    Forwarding { next_hop: NodeId, nested: OnionLayer },
    Delivering { user_id: UserId, content: String },
}

impl RelayNode {
    /// Generate a fresh keypair, register it with the directory, and return
    /// the node.
    ///
    /// The caller is responsible for attaching the node's forwarding
    /// interface to a transport.
    pub fn bootstrap(node_id: NodeId, registry: &Registry, network: Arc<dyn Network>) -> Arc<Self> {
        let secret_key = NodeSecretKey::random();
        let address = format!("relay-{node_id}.shallot.sim:4433");
        registry.register(RegisterRequest {
            node_id,
            public_key: secret_key.public_key().to_bytes(),
            address,
        });
        debug!(node_id, "relay bootstrapped and registered");

        Arc::new(Self {
            node_id,
            secret_key,
            network,
            diagnostics: Mutex::new(RelayDiagnostics::default()),
        })
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// This node's public key.
    pub fn public_key(&self) -> NodePublicKey {
        self.secret_key.public_key()
    }

    /// Snapshot of the diagnostic fields (verification only).
    pub fn diagnostics(&self) -> RelayDiagnostics {
        self.diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Export the private key, base64-encoded.
    ///
    /// Test-only escape hatch for verifying layer addressing; a production
    /// deployment must never expose this.
    pub fn export_private_key(&self) -> String {
        BASE64.encode(self.secret_key.to_bytes())
    }

    /// Drive one layer through the state machine.
    async fn process(&self, layer: OnionLayer) -> Result<Ack> {
        let mut step = Step::Receiving { layer };
        loop {
            step = match step {
                Step::Receiving { layer } => {
                    debug!(
                        node_id = self.node_id,
                        variant = layer.variant(),
                        "layer received"
                    );
                    layer.validate()?;
                    self.record_received(layer.encrypted_message());
                    Step::Decrypting { layer }
                }

                Step::Decrypting { layer } => {
                    let session_key = self.unwrap_session_key(layer.encrypted_session_key())?;
                    let payload = open_payload(&session_key, layer.encrypted_message())?;

                    match layer {
                        OnionLayer::Relay {
                            next_destination, ..
                        } => {
                            let nested: OnionLayer = json::from_slice(&payload)?;
                            self.record_decrypted(
                                String::from_utf8_lossy(&payload).into_owned(),
                                next_destination,
                            );
                            Step::Forwarding {
                                next_hop: next_destination,
                                nested,
                            }
                        }
                        OnionLayer::Final {
                            destination_user_id,
                            ..
                        } => {
                            let content = String::from_utf8(payload).map_err(|_| {
                                ProtocolError::MalformedLayer(
                                    "decrypted content is not valid UTF-8".to_string(),
                                )
                            })?;
                            self.record_decrypted(content.clone(), destination_user_id);
                            Step::Delivering {
                                user_id: destination_user_id,
                                content,
                            }
                        }
                    }
                }

                Step::Forwarding { next_hop, nested } => {
                    debug!(node_id = self.node_id, next_hop, "forwarding nested layer");
                    // Synchronous chain: block on the next hop's acknowledgment
                    // and propagate it (or its failure) unchanged.
                    return self.network.forward(next_hop, nested).await;
                }

                Step::Delivering { user_id, content } => {
                    debug!(node_id = self.node_id, user_id, "delivering content to inbox");
                    return self.network.deliver(user_id, content).await;
                }
            };
        }
    }

    /// Recover this layer's session key with the node's private key.
    fn unwrap_session_key(&self, encrypted_session_key: &str) -> Result<SessionKey> {
        let wrapped = BASE64.decode(encrypted_session_key).map_err(|_| {
            ProtocolError::MalformedLayer("encryptedSessionKey is not valid base64".to_string())
        })?;
        let ciphertext =
            EciesCiphertext::from_bytes(&wrapped).map_err(|_| ProtocolError::DecryptionError)?;

        let key_bytes = ecies::decrypt(&self.secret_key, &ciphertext).map_err(|_| {
            warn!(
                node_id = self.node_id,
                "session key not addressed to this node or corrupted"
            );
            ProtocolError::DecryptionError
        })?;

        let bytes: [u8; 32] = key_bytes
            .as_slice()
            .try_into()
            .map_err(|_| ProtocolError::DecryptionError)?;
        Ok(SessionKey::from_bytes(bytes))
    }

    fn record_received(&self, ciphertext: &str) {
        let mut diag = self
            .diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        diag.last_received_encrypted_message = Some(ciphertext.to_string());
    }

    fn record_decrypted(&self, plaintext: String, target: u32) {
        let mut diag = self
            .diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        diag.last_received_decrypted_message = Some(plaintext);
        diag.last_message_destination = Some(target);
    }
}

/// Decrypt a layer's payload with its unwrapped session key.
fn open_payload(session_key: &SessionKey, encrypted_message: &str) -> Result<Vec<u8>> {
    let ciphertext = BASE64.decode(encrypted_message).map_err(|_| {
        ProtocolError::MalformedLayer("encryptedMessage is not valid base64".to_string())
    })?;
    session_key
        .open(&ciphertext)
        .map_err(|_| ProtocolError::DecryptionError)
}

#[async_trait]
impl Forwarding for RelayNode {
    async fn forward_layer(&self, layer: OnionLayer) -> Result<Ack> {
        self.process(layer).await
    }
}
