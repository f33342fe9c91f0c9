//! Diagnostic snapshots exposed by service instances.
//!
//! These fields exist for verification only; the protocol itself never reads
//! them. Each service instance owns its snapshot and there is no process-wide
//! diagnostic state, so many simulated nodes can coexist in one test process
//! without cross-contamination.

use serde::{Deserialize, Serialize};

use crate::NodeId;

/// What a relay node last observed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayDiagnostics {
    /// Raw ciphertext of the last layer received.
    pub last_received_encrypted_message: Option<String>,
    /// Plaintext recovered from the last layer's payload.
    pub last_received_decrypted_message: Option<String>,
    /// Node the last nested layer was forwarded to (relays only).
    pub last_message_destination: Option<NodeId>,
}

/// What a user node last observed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDiagnostics {
    /// Last message this user sent into the overlay.
    pub last_sent_message: Option<String>,
    /// Last plaintext delivered to this user's inbox.
    pub last_received_message: Option<String>,
    /// Circuit chosen for the last send, in traversal order.
    pub last_circuit: Option<Vec<NodeId>>,
}
