//! Unified error type for the client engine.

use genie_protocol::ProtocolError;

use crate::turn::Phase;

/// Top-level error for the engine and its handle.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The underlying channel failed or is gone.
    ///
    /// Stored as a message rather than a concrete error type because the
    /// engine is generic over the [`Channel`](genie_transport::Channel)
    /// implementation and its associated error.
    #[error("channel error: {0}")]
    Channel(String),

    /// A player action was submitted in a phase that doesn't permit it,
    /// e.g. answering while the genie is still thinking.
    #[error("player action not allowed in phase {0}")]
    ActionNotAllowed(Phase),

    /// The engine's event loop has stopped; the handle is orphaned.
    #[error("engine is not running")]
    EngineStopped,
}
