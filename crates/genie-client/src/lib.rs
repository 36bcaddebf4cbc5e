//! Turn synchronization engine for the genie guessing-game client.
//!
//! The game is strictly turn-based: the player acts, the genie responds
//! with streamed text and speech, the turn completes, the player acts
//! again. The engine in this crate keeps three clocks honest against one
//! another without ever letting presentation affect game legality:
//!
//! - **Arrival time**: fragments land with network burstiness.
//! - **Reveal time**: text becomes visible one character per 30 ms
//!   ([`genie_reveal`]).
//! - **Playback time**: audio fragments queue gaplessly at 24 kHz
//!   ([`genie_audio`]).
//!
//! Action legality is derived only from control messages, so a turn is
//! playable the moment `turn_complete` arrives even if text is still
//! revealing and audio still playing.
//!
//! # Usage
//!
//! ```ignore
//! use genie_client::{Engine, EngineHandle, Renderer};
//! use genie_protocol::JsonCodec;
//! use genie_transport::WebSocketChannel;
//!
//! let channel = WebSocketChannel::connect("wss://example.com/game").await?;
//! let (engine, handle) = Engine::new(channel, JsonCodec, my_renderer, my_sink);
//! tokio::spawn(engine.run());
//!
//! handle.start_game("genie-classic", "Ada", 25).await?;
//! ```
//!
//! The engine runs as a single task owning all mutable state; the
//! [`EngineHandle`] is the cloneable command surface, and the
//! [`Renderer`] trait is the one-way presentation seam.

mod action;
mod engine;
mod error;
mod render;
mod session;
mod turn;

pub use action::ActionSet;
pub use engine::{Engine, EngineHandle};
pub use error::ClientError;
pub use render::Renderer;
pub use session::Session;
pub use turn::{Phase, TurnMachine};

pub use genie_protocol::{Answer, DEFAULT_QUESTION_LIMIT};
