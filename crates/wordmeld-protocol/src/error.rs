//! Error types for the protocol layer.

/// Errors that can occur while encoding, decoding, or validating
/// protocol data.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed — malformed JSON, missing fields, or an
    /// unknown tag.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A room code that is empty, too long, or not alphanumeric.
    #[error("invalid room code: {0:?}")]
    InvalidRoomCode(String),

    /// A message that parsed but violates protocol rules.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
