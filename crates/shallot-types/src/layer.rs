//! The onion layer carried between hops.
//!
//! A layer is a tagged union rather than one loose object with optional
//! fields: a `relay` layer always names its next hop, a `final` layer always
//! names its destination user, and both always carry a wrapped session key
//! and an encrypted payload. Field presence is enforced by the type at the
//! deserialization boundary.
//!
//! ## Wire format
//!
//! ```json
//! { "type": "relay", "nextDestination": 4,
//!   "encryptedSessionKey": "<base64>", "encryptedMessage": "<base64>" }
//!
//! { "type": "final", "destinationUserId": 1,
//!   "encryptedSessionKey": "<base64>", "encryptedMessage": "<base64>" }
//! ```
//!
//! `encryptedMessage`, once decrypted with the unwrapped session key, parses
//! to exactly one nested `OnionLayer`; inside a `final` layer it decrypts to
//! the plain message content itself.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::{NodeId, UserId};

/// One level of onion encryption, removable only by the node holding the
/// matching private key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OnionLayer {
    /// An intermediate layer: peel, then forward the nested layer.
    #[serde(rename = "relay", rename_all = "camelCase")]
    Relay {
        /// Node that receives the nested layer after this hop peels its own.
        next_destination: NodeId,
        /// Session key, asymmetrically wrapped to this hop's public key.
        encrypted_session_key: String,
        /// Nested layer, symmetrically encrypted under the session key.
        encrypted_message: String,
    },

    /// The innermost layer: peel, then deliver the content.
    #[serde(rename = "final", rename_all = "camelCase")]
    Final {
        /// User whose inbox receives the decrypted content.
        destination_user_id: UserId,
        /// Session key, asymmetrically wrapped to the exit node's public key.
        encrypted_session_key: String,
        /// Message content, symmetrically encrypted under the session key.
        encrypted_message: String,
    },
}

impl OnionLayer {
    /// The wrapped session key for this layer.
    pub fn encrypted_session_key(&self) -> &str {
        match self {
            Self::Relay {
                encrypted_session_key,
                ..
            }
            | Self::Final {
                encrypted_session_key,
                ..
            } => encrypted_session_key,
        }
    }

    /// The encrypted payload of this layer.
    pub fn encrypted_message(&self) -> &str {
        match self {
            Self::Relay {
                encrypted_message, ..
            }
            | Self::Final {
                encrypted_message, ..
            } => encrypted_message,
        }
    }

    /// Wire tag of this variant.
    pub fn variant(&self) -> &'static str {
        match self {
            Self::Relay { .. } => "relay",
            Self::Final { .. } => "final",
        }
    }

    /// Reject layers whose required ciphertext fields are empty.
    ///
    /// The type system guarantees the fields exist; this catches envelopes
    /// that were assembled with blank strings.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.encrypted_session_key().is_empty() {
            return Err(ProtocolError::MalformedLayer(
                "encryptedSessionKey is empty".to_string(),
            ));
        }
        if self.encrypted_message().is_empty() {
            return Err(ProtocolError::MalformedLayer(
                "encryptedMessage is empty".to_string(),
            ));
        }
        Ok(())
    }
}
