//! Transport abstraction layer for the genie client.
//!
//! The engine assumes a reliable, ordered, duplex message channel already
//! exists; this crate provides the [`Channel`] trait that expresses that
//! assumption and a WebSocket implementation of it. Handshake and retry
//! policy belong to the collaborator that opens the channel, not here.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket channel via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::WebSocketChannel;

/// A reliable, ordered, duplex message channel carrying opaque bytes.
///
/// Each `send` delivers one complete message; each `recv` yields one
/// complete message. Framing is the transport's problem, ordering is
/// guaranteed, and the payload bytes are opaque at this layer; the
/// protocol crate gives them meaning.
pub trait Channel: Send + Sync + 'static {
    /// The error type for channel operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends one message to the server.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message from the server.
    ///
    /// Returns `Ok(None)` when the channel is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the channel.
    async fn close(&self) -> Result<(), Self::Error>;
}
