//! Wire protocol for the genie guessing-game client.
//!
//! This crate defines the "language" spoken on the game channel:
//!
//! - **Types** ([`ServerMessage`], [`ClientMessage`], [`TurnFlags`],
//!   [`Answer`]): the tagged records that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those records are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between the transport (raw bytes) and the
//! engine (turn state). It knows nothing about connections, pacing, or
//! game phases, only message shapes.
//!
//! ```text
//! Transport (bytes) → Protocol (ServerMessage) → Engine (turn state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    AUDIO_SAMPLE_RATE_HZ, Answer, ClientMessage, DEFAULT_QUESTION_LIMIT,
    ServerMessage, TurnFlags,
};
