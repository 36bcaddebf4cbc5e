//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed: malformed JSON, missing required fields,
    /// or wrong data types.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The message decoded fine but violates a protocol rule, e.g. an
    /// answer that isn't in the current action set.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
