//! # shallot-registry
//!
//! Authoritative directory of known relay nodes: node id → (public key,
//! address). Relays register once at startup; senders read a snapshot when
//! building a circuit.
//!
//! ## Concurrency
//!
//! The table sits behind a reader-writer lock: registrations are serialized
//! by the write lock (no lost updates under concurrent writers), while
//! `list()` snapshots proceed concurrently under the read lock and can never
//! observe a torn write. Registry state is in-memory only and not persisted
//! across restarts.

use std::collections::BTreeMap;
use std::sync::RwLock;

use tracing::debug;

use shallot_types::node::NodeDescriptor;
use shallot_types::wire::{Ack, RegisterRequest};
use shallot_types::NodeId;

/// The node directory service.
#[derive(Default)]
pub struct Registry {
    nodes: RwLock<BTreeMap<NodeId, NodeDescriptor>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node, replacing any previous descriptor for the same id.
    ///
    /// Duplicate registration is not an error: a node that restarts
    /// re-registers under its id and the last write wins.
    pub fn register(&self, request: RegisterRequest) -> Ack {
        let descriptor = NodeDescriptor {
            node_id: request.node_id,
            public_key: request.public_key,
            address: request.address,
        };

        let mut nodes = self
            .nodes
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if nodes.insert(request.node_id, descriptor).is_some() {
            debug!(node_id = request.node_id, "re-registration, replacing descriptor");
        } else {
            debug!(node_id = request.node_id, "node registered");
        }

        Ack::success()
    }

    /// A consistent snapshot of all registered nodes, ordered by node id.
    ///
    /// Reflects every registration that completed before the call.
    pub fn list(&self) -> Vec<NodeDescriptor> {
        self.nodes
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .cloned()
            .collect()
    }

    /// Look up a single node's descriptor.
    pub fn get(&self, node_id: NodeId) -> Option<NodeDescriptor> {
        self.nodes
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&node_id)
            .cloned()
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
