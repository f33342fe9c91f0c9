//! Directory descriptors for relay nodes.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::NodeId;

/// A relay node as known to the registry.
///
/// Registered once at startup and immutable thereafter; re-registration
/// replaces the whole descriptor (last write wins).
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    pub node_id: NodeId,
    /// X25519 public key, base64-encoded on the wire.
    #[serde_as(as = "serde_with::base64::Base64")]
    pub public_key: [u8; 32],
    /// Routable endpoint, e.g. `"relay-3.shallot.sim:4433"`.
    pub address: String,
}
