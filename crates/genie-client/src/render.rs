//! The renderer seam: everything the engine tells the presentation layer.
//!
//! The engine owns the game state; a [`Renderer`] owns what the player
//! sees. Every method is a one-way notification driven from the engine's
//! event loop, so implementations must return quickly and must not call
//! back into the engine synchronously.

use crate::ActionSet;

/// Receives presentation updates from the engine.
///
/// A terminal UI, a GUI view model, or a test recorder all sit behind
/// this trait. `Send + 'static` because the renderer moves into the
/// engine's Tokio task.
pub trait Renderer: Send + 'static {
    /// One character of response text became visible.
    ///
    /// Called at the paced reveal cadence, never in bursts.
    fn append_visible_text(&mut self, ch: char);

    /// The visible response text should be cleared (new turn, resync).
    fn clear_text(&mut self);

    /// The turn finished; these are the player's choices now.
    fn show_actions(&mut self, actions: ActionSet);

    /// Advisory speaking signal for avatar animation.
    ///
    /// `true` while scheduled audio is believed to be playing, `false`
    /// when the turn completes or the scheduled audio runs out. Drives
    /// presentation only; action legality never depends on it.
    fn set_speaking(&mut self, speaking: bool);

    /// The authoritative question count changed.
    fn set_question_count(&mut self, count: u32);

    /// Show or hide the question counter (hidden outside a session).
    fn show_question_counter(&mut self, visible: bool);

    /// The persona's avatar image URL, sent once at session start.
    ///
    /// Default implementation ignores it; renderers without an image
    /// surface don't need to care.
    fn set_avatar(&mut self, _url: &str) {}

    /// The channel dropped mid-session. The engine has already stopped;
    /// reconnecting is the host application's decision.
    fn connection_lost(&mut self, _reason: &str) {}
}
