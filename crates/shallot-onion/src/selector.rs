//! Circuit path selection.
//!
//! Selection sits behind a trait so tests can substitute a deterministic
//! strategy for the production uniform-random one.

use rand::Rng;

use shallot_types::error::{ProtocolError, Result};
use shallot_types::node::NodeDescriptor;
use shallot_types::{NodeId, CIRCUIT_HOPS};

/// Chooses the hops of a circuit from a registry snapshot.
pub trait PathSelector: Send + Sync {
    /// Choose [`CIRCUIT_HOPS`] distinct nodes, ordered `[entry, middle, exit]`.
    ///
    /// Fails with `InsufficientNodes` when the snapshot is too small. Called
    /// before any network I/O, so this failure has no side effects.
    fn select(&self, snapshot: &[NodeDescriptor]) -> Result<Vec<NodeDescriptor>>;
}

/// Uniform random selection without replacement.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformSelector;

impl PathSelector for UniformSelector {
    fn select(&self, snapshot: &[NodeDescriptor]) -> Result<Vec<NodeDescriptor>> {
        if snapshot.len() < CIRCUIT_HOPS {
            return Err(ProtocolError::InsufficientNodes {
                need: CIRCUIT_HOPS,
                have: snapshot.len(),
            });
        }

        let mut pool = snapshot.to_vec();
        let mut rng = rand::thread_rng();
        let mut hops = Vec::with_capacity(CIRCUIT_HOPS);
        for _ in 0..CIRCUIT_HOPS {
            let idx = rng.gen_range(0..pool.len());
            hops.push(pool.swap_remove(idx));
        }

        Ok(hops)
    }
}

/// Deterministic selection of a fixed node-id sequence (test strategy).
#[derive(Clone, Debug)]
pub struct FixedSelector {
    node_ids: Vec<NodeId>,
}

impl FixedSelector {
    pub fn new(node_ids: Vec<NodeId>) -> Self {
        Self { node_ids }
    }
}

impl PathSelector for FixedSelector {
    fn select(&self, snapshot: &[NodeDescriptor]) -> Result<Vec<NodeDescriptor>> {
        if snapshot.len() < CIRCUIT_HOPS {
            return Err(ProtocolError::InsufficientNodes {
                need: CIRCUIT_HOPS,
                have: snapshot.len(),
            });
        }

        self.node_ids
            .iter()
            .map(|id| {
                snapshot
                    .iter()
                    .find(|n| n.node_id == *id)
                    .cloned()
                    .ok_or(ProtocolError::UnknownNextHop(*id))
            })
            .collect()
    }
}
