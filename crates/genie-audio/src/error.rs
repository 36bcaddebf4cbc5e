//! Error types for the audio layer.

/// Errors that can occur while decoding an audio fragment.
///
/// These are recoverable by design: the engine drops the offending
/// fragment and leaves the playback cursor untouched. Losing a fragment
/// of speech is acceptable; corrupting playback ordering is not.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// The fragment payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[source] base64::DecodeError),

    /// The decoded byte length is not a whole number of 16-bit samples.
    #[error("payload of {len} bytes is not a whole number of 16-bit samples")]
    TruncatedSample { len: usize },
}
