//! Typed message session over an opaque byte channel.
//!
//! [`Session`] pairs a [`Channel`] with a [`Codec`] so the engine deals
//! in [`ClientMessage`]/[`ServerMessage`] values, never raw bytes.

use genie_protocol::{ClientMessage, Codec, ServerMessage};
use genie_transport::Channel;

use crate::ClientError;

/// A typed duplex session: encode-and-send out, receive-and-decode in.
pub struct Session<C, K> {
    channel: C,
    codec: K,
}

impl<C: Channel, K: Codec> Session<C, K> {
    /// Wraps an already-open channel with a codec.
    pub fn new(channel: C, codec: K) -> Self {
        Self { channel, codec }
    }

    /// Encodes and sends one player action.
    pub async fn send(&self, message: &ClientMessage) -> Result<(), ClientError> {
        let bytes = self.codec.encode(message)?;
        self.channel
            .send(&bytes)
            .await
            .map_err(|e| ClientError::Channel(e.to_string()))
    }

    /// Receives the next decodable server message.
    ///
    /// Payloads that fail to decode are logged and skipped rather than
    /// tearing down the session; a single garbled frame should not end
    /// the game. Returns `Ok(None)` when the channel closes cleanly.
    pub async fn recv(&self) -> Result<Option<ServerMessage>, ClientError> {
        loop {
            let payload = self
                .channel
                .recv()
                .await
                .map_err(|e| ClientError::Channel(e.to_string()))?;
            let Some(bytes) = payload else {
                return Ok(None);
            };
            match self.codec.decode::<ServerMessage>(&bytes) {
                Ok(message) => return Ok(Some(message)),
                Err(err) => {
                    tracing::debug!(
                        error = %err,
                        len = bytes.len(),
                        "skipping undecodable payload"
                    );
                }
            }
        }
    }

    /// Closes the underlying channel. Close failures are logged, not
    /// surfaced; there is nothing useful a caller can do with one.
    pub async fn close(&self) {
        if let Err(err) = self.channel.close().await {
            tracing::debug!(error = %err, "channel close failed");
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
