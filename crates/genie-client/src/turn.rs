//! Turn state machine: the sole authority on which player actions are
//! legal at any moment.
//!
//! The machine consumes control messages (`game_started`,
//! `turn_complete`, `resync`) and tracks the current turn's phase,
//! question number, and accumulated text. The audio scheduler and the
//! reveal queue only affect what is seen and heard, never which actions
//! are legal.
//!
//! ```text
//!          start_game                    turn_complete
//!   Idle ─────────────→ AwaitingGreeting ─────────────→ Awaiting*
//!    ↑                                                      │
//!    │  play_again(No)              answer / reveal         │
//!    └──────────────── Thinking ←───────────────────────────┘
//!                          │            turn_complete
//!                          └──────────────────────────→ Awaiting*
//! ```

use std::fmt;

use genie_protocol::TurnFlags;

use crate::ActionSet;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The phase of the current conversational turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No session.
    Idle,
    /// The session started; waiting for the server's first turn.
    AwaitingGreeting,
    /// A player action was sent; waiting for the server's turn-complete.
    Thinking,
    /// Waiting for a Continue acknowledgement.
    AwaitingContinue,
    /// Waiting for an answer to a regular question.
    AwaitingAnswer,
    /// The player won; waiting for them to reveal their character.
    AwaitingReveal,
    /// Game over; waiting for the play-again choice.
    AwaitingPlayAgain,
    /// The genie made its final guess; waiting for confirmation.
    AwaitingFinalGuess,
}

impl Phase {
    /// Whether the server has handed the turn to the player.
    pub fn is_awaiting(self) -> bool {
        matches!(
            self,
            Phase::AwaitingContinue
                | Phase::AwaitingAnswer
                | Phase::AwaitingReveal
                | Phase::AwaitingPlayAgain
                | Phase::AwaitingFinalGuess
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::AwaitingGreeting => "awaiting-greeting",
            Phase::Thinking => "thinking",
            Phase::AwaitingContinue => "awaiting-continue",
            Phase::AwaitingAnswer => "awaiting-answer",
            Phase::AwaitingReveal => "awaiting-reveal",
            Phase::AwaitingPlayAgain => "awaiting-play-again",
            Phase::AwaitingFinalGuess => "awaiting-final-guess",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// TurnMachine
// ---------------------------------------------------------------------------

/// Session-scoped turn state. One per engine, owned by its event loop.
///
/// At most one turn is "open" (accepting fragments) at a time; opening a
/// new turn synchronously discards the prior turn's accumulated text.
/// The question number is a local echo of the server's counter: carried
/// on every outbound answer so the server can detect divergence, and
/// overwritten whenever the server says otherwise (`game_started`,
/// `turn_complete`, `resync`). Local state never wins a disagreement.
#[derive(Debug)]
pub struct TurnMachine {
    phase: Phase,
    question_number: u32,
    accumulated_text: String,
}

impl TurnMachine {
    /// Creates a machine in the [`Idle`](Phase::Idle) phase.
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            question_number: 0,
            accumulated_text: String::new(),
        }
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The locally tracked question number.
    pub fn question_number(&self) -> u32 {
        self.question_number
    }

    /// All text fragments of the open turn, concatenated in arrival order.
    pub fn accumulated_text(&self) -> &str {
        &self.accumulated_text
    }

    /// A `start_game` submission went out: open the greeting turn.
    pub fn begin_session(&mut self) {
        self.phase = Phase::AwaitingGreeting;
        self.question_number = 0;
        self.accumulated_text.clear();
    }

    /// An `answer` or `reveal` submission went out: open a new turn.
    ///
    /// The prior turn's text accumulator is discarded here, not when the
    /// server replies, so a stale turn can never leak into a new one.
    pub fn open_turn(&mut self) {
        self.phase = Phase::Thinking;
        self.accumulated_text.clear();
    }

    /// Appends an arrival-ordered text fragment to the open turn.
    pub fn append_text(&mut self, fragment: &str) {
        self.accumulated_text.push_str(fragment);
    }

    /// The server confirmed the session. Adopts its question count.
    pub fn game_started(&mut self, question_count: u32) {
        self.question_number = question_count;
        self.phase = Phase::AwaitingGreeting;
    }

    /// The server finished streaming the turn.
    ///
    /// Adopts the authoritative question count, resolves the flags, and
    /// enters the matching awaiting phase. Returns the action set to
    /// surface to the renderer.
    pub fn complete_turn(
        &mut self,
        question_count: u32,
        flags: TurnFlags,
    ) -> ActionSet {
        self.question_number = question_count;
        let actions = ActionSet::resolve(flags);
        self.phase = match actions {
            ActionSet::ContinueOnly => Phase::AwaitingContinue,
            ActionSet::RevealInput => Phase::AwaitingReveal,
            ActionSet::PlayAgain => Phase::AwaitingPlayAgain,
            ActionSet::FinalGuess => Phase::AwaitingFinalGuess,
            ActionSet::FullAnswers => Phase::AwaitingAnswer,
        };
        actions
    }

    /// The server detected a question-count divergence.
    ///
    /// Adopts the server's count, replaces the accumulator with the
    /// server's neutral prompt, and falls back to the regular-question
    /// action set rather than trusting local state.
    pub fn resync(&mut self, question_count: u32, message: &str) -> ActionSet {
        self.question_number = question_count;
        self.accumulated_text.clear();
        self.accumulated_text.push_str(message);
        self.phase = Phase::AwaitingAnswer;
        ActionSet::FullAnswers
    }

    /// Quit or declined play-again: back to [`Idle`](Phase::Idle).
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn flags() -> TurnFlags {
        TurnFlags::default()
    }

    #[test]
    fn test_new_machine_is_idle() {
        let machine = TurnMachine::new();
        assert_eq!(machine.phase(), Phase::Idle);
        assert_eq!(machine.question_number(), 0);
        assert_eq!(machine.accumulated_text(), "");
    }

    #[test]
    fn test_begin_session_enters_awaiting_greeting() {
        let mut machine = TurnMachine::new();
        machine.begin_session();
        assert_eq!(machine.phase(), Phase::AwaitingGreeting);
    }

    #[test]
    fn test_accumulated_text_concatenates_in_arrival_order() {
        let mut machine = TurnMachine::new();
        machine.begin_session();
        machine.append_text("Are you");
        machine.append_text(" thinking of an animal?");
        assert_eq!(
            machine.accumulated_text(),
            "Are you thinking of an animal?"
        );
    }

    #[test]
    fn test_complete_turn_adopts_server_count_and_enters_phase() {
        let mut machine = TurnMachine::new();
        machine.begin_session();
        let actions = machine.complete_turn(1, flags());
        assert_eq!(actions, ActionSet::FullAnswers);
        assert_eq!(machine.phase(), Phase::AwaitingAnswer);
        assert_eq!(machine.question_number(), 1);
    }

    #[test]
    fn test_complete_turn_phase_follows_flag_precedence() {
        let mut machine = TurnMachine::new();

        let mut f = flags();
        f.awaiting_ready = true;
        f.player_won = true;
        machine.complete_turn(0, f);
        // awaiting_ready wins: Continue-only, not the reveal input.
        assert_eq!(machine.phase(), Phase::AwaitingContinue);

        let mut f = flags();
        f.player_won = true;
        machine.complete_turn(9, f);
        assert_eq!(machine.phase(), Phase::AwaitingReveal);

        let mut f = flags();
        f.awaiting_play_again = true;
        machine.complete_turn(9, f);
        assert_eq!(machine.phase(), Phase::AwaitingPlayAgain);

        let mut f = flags();
        f.is_final_guess = true;
        machine.complete_turn(9, f);
        assert_eq!(machine.phase(), Phase::AwaitingFinalGuess);
    }

    #[test]
    fn test_open_turn_discards_prior_accumulated_text() {
        let mut machine = TurnMachine::new();
        machine.begin_session();
        machine.append_text("old turn");
        machine.complete_turn(1, flags());

        machine.open_turn();
        assert_eq!(machine.phase(), Phase::Thinking);
        assert_eq!(machine.accumulated_text(), "");
        // The question number survives: it's the server's counter, not
        // per-turn state.
        assert_eq!(machine.question_number(), 1);
    }

    #[test]
    fn test_resync_adopts_server_count_and_default_actions() {
        let mut machine = TurnMachine::new();
        machine.begin_session();
        machine.complete_turn(5, flags());
        assert_eq!(machine.question_number(), 5);

        let actions = machine.resync(3, "Let us take stock.");
        assert_eq!(actions, ActionSet::FullAnswers);
        assert_eq!(machine.question_number(), 3);
        assert_eq!(machine.phase(), Phase::AwaitingAnswer);
        assert_eq!(machine.accumulated_text(), "Let us take stock.");
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut machine = TurnMachine::new();
        machine.begin_session();
        machine.append_text("something");
        machine.complete_turn(4, flags());

        machine.reset();
        assert_eq!(machine.phase(), Phase::Idle);
        assert_eq!(machine.question_number(), 0);
        assert_eq!(machine.accumulated_text(), "");
    }

    #[test]
    fn test_is_awaiting() {
        assert!(Phase::AwaitingAnswer.is_awaiting());
        assert!(Phase::AwaitingPlayAgain.is_awaiting());
        assert!(!Phase::Idle.is_awaiting());
        assert!(!Phase::Thinking.is_awaiting());
        assert!(!Phase::AwaitingGreeting.is_awaiting());
    }

    #[test]
    fn test_phase_display_names() {
        assert_eq!(Phase::Thinking.to_string(), "thinking");
        assert_eq!(
            Phase::AwaitingFinalGuess.to_string(),
            "awaiting-final-guess"
        );
    }
}
