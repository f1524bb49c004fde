//! Codec trait and implementations for serializing protocol messages.
//!
//! The rest of the stack never calls `serde_json` directly — it goes
//! through the [`Codec`] seam, so the wire format can change (e.g. to a
//! binary codec) without touching the handler or room layers.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts protocol values to and from raw bytes.
///
/// `Send + Sync + 'static` because codecs are shared across connection
/// handler tasks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that speaks JSON via `serde_json`.
///
/// Human-readable, browser-friendly, and easy to inspect in logs.
/// Behind the default `json` feature.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::ClientIntent;

    #[test]
    fn test_json_codec_round_trip() {
        let codec = JsonCodec;
        let intent = ClientIntent::SubmitWord { word: "cat".into() };
        let bytes = codec.encode(&intent).unwrap();
        let decoded: ClientIntent = codec.decode(&bytes).unwrap();
        assert_eq!(intent, decoded);
    }

    #[test]
    fn test_json_codec_decode_failure() {
        let codec = JsonCodec;
        let result: Result<ClientIntent, _> = codec.decode(b"{{{");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
