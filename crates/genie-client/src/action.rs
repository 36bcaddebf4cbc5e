//! Action sets: the player choices valid after a completed turn.
//!
//! The server declares what kind of turn just finished via the semantic
//! flags on `turn_complete`; this module resolves those flags into
//! exactly one [`ActionSet`]. The engine never parses the response text
//! to infer game phase; the flags are authoritative.

use genie_protocol::{Answer, TurnFlags};

/// The set of player-actionable choices valid in the current phase.
///
/// Derived, never stored independently: always a pure function of the
/// latest control message (see [`ActionSet::resolve`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSet {
    /// A single Continue acknowledgement (greeting or emotional beat).
    ContinueOnly,
    /// The player won: the reveal-character input is enabled, no answer
    /// buttons are shown.
    RevealInput,
    /// Play again? Yes restarts with the same persona, No returns to
    /// the idle/home state. Handled through
    /// [`EngineHandle::play_again`](crate::EngineHandle::play_again),
    /// not as wire answers.
    PlayAgain,
    /// The genie made its final guess: Yes / No confirmation.
    FinalGuess,
    /// A regular question: all five answers.
    FullAnswers,
}

impl ActionSet {
    /// Resolves turn flags to an action set by strict precedence.
    ///
    /// The flags are mutually-intended-exclusive, but if a confused
    /// server sets several, the first true flag wins in this order:
    /// `awaiting_ready` → `is_emotional_response` → `player_won` →
    /// `awaiting_play_again` → `is_final_guess` → regular question.
    pub fn resolve(flags: TurnFlags) -> Self {
        // awaiting_ready and is_emotional_response are distinct flags but
        // resolve to the same ack-only set, so the two highest-precedence
        // checks collapse into one.
        if flags.awaiting_ready || flags.is_emotional_response {
            ActionSet::ContinueOnly
        } else if flags.player_won {
            ActionSet::RevealInput
        } else if flags.awaiting_play_again {
            ActionSet::PlayAgain
        } else if flags.is_final_guess {
            ActionSet::FinalGuess
        } else {
            ActionSet::FullAnswers
        }
    }

    /// The answer buttons a renderer should offer for this set.
    ///
    /// Empty for [`RevealInput`](Self::RevealInput) (text input instead
    /// of buttons). For [`PlayAgain`](Self::PlayAgain) the Yes/No pair is
    /// presentation only; the choice goes out as a restart or a return
    /// to idle, never as an `answer` message.
    pub fn answers(self) -> &'static [Answer] {
        match self {
            ActionSet::ContinueOnly => &[Answer::Continue],
            ActionSet::RevealInput => &[],
            ActionSet::PlayAgain => &[Answer::Yes, Answer::No],
            ActionSet::FinalGuess => &[Answer::Yes, Answer::No],
            ActionSet::FullAnswers => &[
                Answer::Yes,
                Answer::No,
                Answer::DontKnow,
                Answer::Probably,
                Answer::ProbablyNot,
            ],
        }
    }

    /// Whether `answer` is a legal wire answer for this set.
    pub fn allows(self, answer: Answer) -> bool {
        // PlayAgain's Yes/No are not wire answers; see `answers`.
        if self == ActionSet::PlayAgain {
            return false;
        }
        self.answers().contains(&answer)
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
    fn test_no_flags_resolves_to_full_answers() {
        assert_eq!(ActionSet::resolve(flags()), ActionSet::FullAnswers);
    }

    #[test]
    fn test_each_flag_resolves_alone() {
        let mut f = flags();
        f.awaiting_ready = true;
        assert_eq!(ActionSet::resolve(f), ActionSet::ContinueOnly);

        let mut f = flags();
        f.is_emotional_response = true;
        assert_eq!(ActionSet::resolve(f), ActionSet::ContinueOnly);

        let mut f = flags();
        f.player_won = true;
        assert_eq!(ActionSet::resolve(f), ActionSet::RevealInput);

        let mut f = flags();
        f.awaiting_play_again = true;
        assert_eq!(ActionSet::resolve(f), ActionSet::PlayAgain);

        let mut f = flags();
        f.is_final_guess = true;
        assert_eq!(ActionSet::resolve(f), ActionSet::FinalGuess);
    }

    #[test]
    fn test_awaiting_ready_outranks_player_won() {
        let mut f = flags();
        f.awaiting_ready = true;
        f.player_won = true;
        assert_eq!(ActionSet::resolve(f), ActionSet::ContinueOnly);
    }

    #[test]
    fn test_player_won_outranks_play_again_and_final_guess() {
        let mut f = flags();
        f.player_won = true;
        f.awaiting_play_again = true;
        f.is_final_guess = true;
        assert_eq!(ActionSet::resolve(f), ActionSet::RevealInput);
    }

    #[test]
    fn test_play_again_outranks_final_guess() {
        let mut f = flags();
        f.awaiting_play_again = true;
        f.is_final_guess = true;
        assert_eq!(ActionSet::resolve(f), ActionSet::PlayAgain);
    }

    #[test]
    fn test_all_flags_set_resolves_to_continue_only() {
        let f = TurnFlags {
            awaiting_ready: true,
            is_emotional_response: true,
            player_won: true,
            awaiting_play_again: true,
            is_final_guess: true,
        };
        assert_eq!(ActionSet::resolve(f), ActionSet::ContinueOnly);
    }

    #[test]
    fn test_full_answers_buttons() {
        let answers = ActionSet::FullAnswers.answers();
        assert_eq!(
            answers,
            &[
                Answer::Yes,
                Answer::No,
                Answer::DontKnow,
                Answer::Probably,
                Answer::ProbablyNot,
            ]
        );
        assert!(!answers.contains(&Answer::Continue));
    }

    #[test]
    fn test_reveal_input_has_no_buttons() {
        assert!(ActionSet::RevealInput.answers().is_empty());
    }

    #[test]
    fn test_allows_respects_the_set() {
        assert!(ActionSet::FullAnswers.allows(Answer::ProbablyNot));
        assert!(!ActionSet::FullAnswers.allows(Answer::Continue));
        assert!(ActionSet::ContinueOnly.allows(Answer::Continue));
        assert!(!ActionSet::ContinueOnly.allows(Answer::Yes));
        assert!(ActionSet::FinalGuess.allows(Answer::No));
        assert!(!ActionSet::FinalGuess.allows(Answer::Probably));
        // Play-again Yes/No never go out as wire answers.
        assert!(!ActionSet::PlayAgain.allows(Answer::Yes));
    }
}
