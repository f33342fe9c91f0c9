//! Request/response envelopes exchanged with overlay services.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::error::ProtocolError;
use crate::{NodeId, UserId};

/// Outcome discriminator carried in every response envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Error,
}

/// Positive acknowledgment: `{"status": "success"}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub status: Status,
}

impl Ack {
    pub fn success() -> Self {
        Self {
            status: Status::Success,
        }
    }
}

/// Structured failure: `{"status": "error", "kind": ..., "message": ...}`.
///
/// A sender never sees a partial-success response; every failure anywhere in
/// the call chain surfaces as exactly one of these.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: Status,
    pub kind: String,
    pub message: String,
}

impl From<&ProtocolError> for ErrorBody {
    fn from(err: &ProtocolError) -> Self {
        Self {
            status: Status::Error,
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Node registration request.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub node_id: NodeId,
    #[serde_as(as = "serde_with::base64::Base64")]
    pub public_key: [u8; 32],
    pub address: String,
}

/// User-facing send request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub message: String,
    pub destination_user_id: UserId,
}

/// Successful send response, echoing the circuit that was used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub status: Status,
    pub circuit: Vec<NodeId>,
}
