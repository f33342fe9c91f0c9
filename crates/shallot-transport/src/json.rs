//! JSON codec helpers.
//!
//! Layer objects travel as JSON (see `shallot_types::layer`). Anything that
//! fails to parse at this boundary is a malformed layer as far as the
//! protocol is concerned, so both directions map serde failures to
//! [`ProtocolError::MalformedLayer`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use shallot_types::error::{ProtocolError, Result};

/// Serialize a wire value to JSON bytes.
pub fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| ProtocolError::MalformedLayer(format!("serialize: {e}")))
}

/// Deserialize a wire value from JSON bytes.
pub fn from_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    serde_json::from_slice(data)
        .map_err(|e| ProtocolError::MalformedLayer(format!("deserialize: {e}")))
}

#[cfg(test)]
mod tests {
    use shallot_types::layer::OnionLayer;

    use super::*;

    #[test]
    fn test_layer_roundtrip() {
        let layer = OnionLayer::Relay {
            next_destination: 2,
            encrypted_session_key: "a2V5".to_string(),
            encrypted_message: "bXNn".to_string(),
        };

        let bytes = to_vec(&layer).expect("serialize");
        let restored: OnionLayer = from_slice(&bytes).expect("deserialize");
        assert_eq!(restored, layer);
    }

    #[test]
    fn test_garbage_is_malformed_layer() {
        let result: Result<OnionLayer> = from_slice(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::MalformedLayer(_))));
    }

    #[test]
    fn test_wrong_shape_is_malformed_layer() {
        let result: Result<OnionLayer> = from_slice(br#"{"type":"relay"}"#);
        assert!(matches!(result, Err(ProtocolError::MalformedLayer(_))));
    }
}
