//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The protocol layer doesn't care how messages become bytes; anything
//! implementing [`Codec`] will do. [`JsonCodec`] is the wire format the
//! game server actually speaks; keeping it behind a trait keeps the
//! engine testable with canned byte buffers and leaves room for a binary
//! codec if the server ever grows one.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust types to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because the codec lives inside the engine's
/// long-running Tokio task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed,
    /// truncated, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is the format the game server sends over the WebSocket: tagged
/// records, human-readable, inspectable in browser DevTools. Behind the
/// `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use genie_protocol::{Codec, JsonCodec, ServerMessage};
///
/// let codec = JsonCodec;
/// let bytes = br#"{ "type": "text", "text": "Are you" }"#;
/// let msg: ServerMessage = codec.decode(bytes).unwrap();
/// assert_eq!(msg, ServerMessage::Text { text: "Are you".into() });
/// ```
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
