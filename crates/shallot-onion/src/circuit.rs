//! Circuit representation and layered-encryption construction.
//!
//! The sender walks the circuit from the exit hop back to the entry hop. For
//! each hop it generates a fresh session key, symmetrically encrypts the
//! serialized inner layer under it, and asymmetrically wraps the key to that
//! hop's public key. Exactly one session key exists per (circuit, hop); each
//! is held only by the sender and the hop that unwraps it, and none is ever
//! persisted or reused.
//!
//! The innermost layer is the `Final` layer: the message content sealed
//! under the exit hop's session key. The exit relay performs the final
//! decryption and delivers plaintext to the destination inbox (this is the
//! one fixed convention; the destination never unwraps anything).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::debug;

use shallot_crypto::ecies;
use shallot_crypto::session::SessionKey;
use shallot_crypto::x25519::NodePublicKey;
use shallot_transport::json;
use shallot_types::error::{ProtocolError, Result};
use shallot_types::layer::OnionLayer;
use shallot_types::node::NodeDescriptor;
use shallot_types::{NodeId, UserId, CIRCUIT_HOPS};

use crate::selector::{PathSelector, UniformSelector};

/// An ordered path of relay hops: `[entry, middle, exit]`.
///
/// Hops are drawn without replacement from a single registry snapshot; a
/// node id never repeats within a circuit.
#[derive(Clone, Debug, PartialEq)]
pub struct Circuit {
    hops: Vec<NodeDescriptor>,
}

impl Circuit {
    /// Build a circuit from selected hops, enforcing the arity and
    /// distinctness invariants.
    pub fn from_hops(hops: Vec<NodeDescriptor>) -> Result<Self> {
        let mut ids: Vec<NodeId> = hops.iter().map(|n| n.node_id).collect();
        ids.sort_unstable();
        ids.dedup();
        if hops.len() != CIRCUIT_HOPS || ids.len() != CIRCUIT_HOPS {
            return Err(ProtocolError::InsufficientNodes {
                need: CIRCUIT_HOPS,
                have: ids.len().min(hops.len()),
            });
        }
        Ok(Self { hops })
    }

    /// The hops in traversal order.
    pub fn hops(&self) -> &[NodeDescriptor] {
        &self.hops
    }

    /// The entry (first) hop.
    pub fn entry_hop(&self) -> &NodeDescriptor {
        &self.hops[0]
    }

    /// The middle (second) hop.
    pub fn middle_hop(&self) -> &NodeDescriptor {
        &self.hops[1]
    }

    /// The exit (third) hop.
    pub fn exit_hop(&self) -> &NodeDescriptor {
        &self.hops[CIRCUIT_HOPS - 1]
    }

    /// Node ids in traversal order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.hops.iter().map(|n| n.node_id).collect()
    }
}

/// Sender-side construction of circuits and their onion ciphertexts.
pub struct CircuitBuilder {
    selector: Box<dyn PathSelector>,
}

impl CircuitBuilder {
    /// Builder with uniform random path selection.
    pub fn new() -> Self {
        Self {
            selector: Box::new(UniformSelector),
        }
    }

    /// Builder with an injected selection strategy.
    pub fn with_selector(selector: Box<dyn PathSelector>) -> Self {
        Self { selector }
    }

    /// Choose a circuit from a registry snapshot.
    ///
    /// Fails with `InsufficientNodes` before any network I/O when the
    /// snapshot holds fewer than [`CIRCUIT_HOPS`] nodes.
    pub fn select_circuit(&self, snapshot: &[NodeDescriptor]) -> Result<Circuit> {
        let hops = self.selector.select(snapshot)?;
        let circuit = Circuit::from_hops(hops)?;
        debug!(circuit = ?circuit.node_ids(), "circuit selected");
        Ok(circuit)
    }

    /// Construct the nested onion ciphertext for `message`, returning the
    /// outermost layer to hand to the entry hop.
    pub fn build_onion(
        &self,
        circuit: &Circuit,
        message: &str,
        destination_user_id: UserId,
    ) -> Result<OnionLayer> {
        // Innermost step: seal the content for the exit hop.
        let exit = circuit.exit_hop();
        let content_key = SessionKey::random();
        let content_ciphertext = content_key
            .seal(message.as_bytes())
            .map_err(construction_failure)?;

        let mut layer = OnionLayer::Final {
            destination_user_id,
            encrypted_session_key: wrap_session_key(&content_key, exit)?,
            encrypted_message: BASE64.encode(content_ciphertext),
        };

        // Walk from the exit hop back to the entry hop. Each wrapper is
        // addressed to its hop and names the hop behind it in walk order as
        // the next destination; the exit hop has no wrapper of its own, it
        // receives the Final layer directly.
        let mut next_destination = exit.node_id;
        for hop in circuit.hops()[..CIRCUIT_HOPS - 1].iter().rev() {
            let session_key = SessionKey::random();
            let inner = json::to_vec(&layer)?;
            let payload = session_key.seal(&inner).map_err(construction_failure)?;

            layer = OnionLayer::Relay {
                next_destination,
                encrypted_session_key: wrap_session_key(&session_key, hop)?,
                encrypted_message: BASE64.encode(payload),
            };
            next_destination = hop.node_id;
        }

        Ok(layer)
    }
}

impl Default for CircuitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Asymmetrically wrap a session key to a hop's public key.
fn wrap_session_key(session_key: &SessionKey, hop: &NodeDescriptor) -> Result<String> {
    let recipient = NodePublicKey::from_bytes(hop.public_key);
    let wrapped =
        ecies::encrypt(&recipient, &session_key.to_bytes()).map_err(construction_failure)?;
    Ok(BASE64.encode(wrapped.to_bytes()))
}

fn construction_failure(err: shallot_crypto::CryptoError) -> ProtocolError {
    ProtocolError::MalformedLayer(format!("layer construction: {err}"))
}
