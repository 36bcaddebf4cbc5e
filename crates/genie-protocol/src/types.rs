//! Wire types for the genie game channel.
//!
//! Every message that travels on the channel is a tagged JSON record:
//! a `"type"` field in snake_case selects the variant, and the remaining
//! fields are camelCase. [`ServerMessage`] covers the inbound direction
//! (content fragments and control signals), [`ClientMessage`] the outbound
//! direction (player actions).

use serde::{Deserialize, Serialize};

use std::fmt;

/// Sample rate of every audio fragment on the wire, in Hz.
///
/// The server synthesizes speech as little-endian 16-bit mono PCM at
/// 24 kHz and base64-encodes it into [`ServerMessage::Audio`].
pub const AUDIO_SAMPLE_RATE_HZ: u32 = 24_000;

/// Question limit after which the genie yields and the player wins.
///
/// Used as the default for `question_count_limit` in
/// [`ClientMessage::StartGame`].
pub const DEFAULT_QUESTION_LIMIT: u32 = 25;

// ---------------------------------------------------------------------------
// Answers
// ---------------------------------------------------------------------------

/// A player's reply to the genie's question.
///
/// Serialized as the exact display strings the server expects
/// (`"Don't Know"`, `"Probably Not"`, ...), not as identifiers.
/// `Continue` is the acknowledgement sent from the Continue-only action
/// set (greeting / emotional beat), never offered as a question answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Answer {
    Yes,
    No,
    #[serde(rename = "Don't Know")]
    DontKnow,
    Probably,
    #[serde(rename = "Probably Not")]
    ProbablyNot,
    Continue,
}

impl Answer {
    /// The wire/display string for this answer.
    pub fn as_str(&self) -> &'static str {
        match self {
            Answer::Yes => "Yes",
            Answer::No => "No",
            Answer::DontKnow => "Don't Know",
            Answer::Probably => "Probably",
            Answer::ProbablyNot => "Probably Not",
            Answer::Continue => "Continue",
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Turn flags
// ---------------------------------------------------------------------------

/// Semantic flags carried by a `turn_complete` control message.
///
/// The server declares what kind of turn just finished; the client derives
/// the next action set from these flags and never infers game phase from
/// the response text. The flags are mutually-intended-exclusive but the
/// client resolves them by strict precedence (see the engine crate), so a
/// confused server can never produce an ambiguous UI.
///
/// Every field defaults to `false` when absent, so older servers that omit
/// a flag keep working.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct TurnFlags {
    /// The genie greeted the player and is waiting for a "ready" ack.
    #[serde(default)]
    pub awaiting_ready: bool,
    /// The response is an emotional beat, not a question; ack to proceed.
    #[serde(default)]
    pub is_emotional_response: bool,
    /// The genie yielded; the player won and may reveal their character.
    #[serde(default)]
    pub player_won: bool,
    /// The game is over and the genie asks whether to play again.
    #[serde(default)]
    pub awaiting_play_again: bool,
    /// The genie made its final guess and wants a yes/no confirmation.
    #[serde(default)]
    pub is_final_guess: bool,
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// A message from the server: a content fragment or a control signal.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, e.g.
/// `{ "type": "text", "text": "Are you" }`. Unrecognized tags decode to
/// [`ServerMessage::Unknown`] instead of failing, since forward compatibility
/// is preferred over rejecting messages from a newer server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// The session is live. Carries the persona avatar (if any) and the
    /// authoritative question count (0 for a fresh game).
    GameStarted {
        #[serde(default)]
        image: Option<String>,
        question_count: u32,
    },

    /// A text fragment of the current turn's response, arrival-ordered.
    Text { text: String },

    /// An audio fragment of the current turn's response: base64-encoded
    /// little-endian 16-bit mono PCM at [`AUDIO_SAMPLE_RATE_HZ`].
    Audio { audio: String },

    /// The server finished streaming this turn. Carries the authoritative
    /// question count and the semantic flags for the next action set.
    TurnComplete {
        question_count: u32,
        #[serde(flatten)]
        flags: TurnFlags,
    },

    /// The server detected a question-count divergence. The client must
    /// adopt `question_count` and fall back to the regular-question
    /// action set; `message` is a neutral prompt to display.
    Resync { message: String, question_count: u32 },

    /// Any message type this client does not know. Ignored.
    #[serde(other)]
    Unknown,
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// A player action sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Open a new game with the chosen persona.
    StartGame {
        persona_id: String,
        player_name: String,
        question_count_limit: u32,
    },

    /// Answer the current question (or ack with `Continue`).
    ///
    /// `question_number` is the client's locally tracked count; the server
    /// compares it against its own and replies with a `resync` control
    /// message instead of a normal `turn_complete` on divergence.
    Answer { message: Answer, question_number: u32 },

    /// The player won and reveals who they were thinking of.
    Reveal { character_name: String },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Wire-shape tests. The server defines exact JSON shapes; a mismatch
    //! in a serde attribute means the client silently drops every message,
    //! so each tag and field name is pinned here.

    use super::*;

    // =====================================================================
    // Answer
    // =====================================================================

    #[test]
    fn test_answer_serializes_as_display_strings() {
        let cases = [
            (Answer::Yes, "\"Yes\""),
            (Answer::No, "\"No\""),
            (Answer::DontKnow, "\"Don't Know\""),
            (Answer::Probably, "\"Probably\""),
            (Answer::ProbablyNot, "\"Probably Not\""),
            (Answer::Continue, "\"Continue\""),
        ];
        for (answer, expected) in cases {
            let json = serde_json::to_string(&answer).unwrap();
            assert_eq!(json, expected);
        }
    }

    #[test]
    fn test_answer_round_trip() {
        for answer in [
            Answer::Yes,
            Answer::No,
            Answer::DontKnow,
            Answer::Probably,
            Answer::ProbablyNot,
            Answer::Continue,
        ] {
            let json = serde_json::to_string(&answer).unwrap();
            let decoded: Answer = serde_json::from_str(&json).unwrap();
            assert_eq!(answer, decoded);
        }
    }

    #[test]
    fn test_answer_display_matches_wire_string() {
        assert_eq!(Answer::DontKnow.to_string(), "Don't Know");
        assert_eq!(Answer::ProbablyNot.to_string(), "Probably Not");
    }

    // =====================================================================
    // ServerMessage tags and field names
    // =====================================================================

    #[test]
    fn test_game_started_json_shape() {
        let json = r#"{
            "type": "game_started",
            "image": "/static/images/genie.png",
            "questionCount": 0
        }"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ServerMessage::GameStarted {
                image: Some("/static/images/genie.png".into()),
                question_count: 0,
            }
        );
    }

    #[test]
    fn test_game_started_image_is_optional() {
        let json = r#"{ "type": "game_started", "questionCount": 3 }"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ServerMessage::GameStarted {
                image: None,
                question_count: 3,
            }
        );
    }

    #[test]
    fn test_text_fragment_json_shape() {
        let json = r#"{ "type": "text", "text": "Are you" }"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg, ServerMessage::Text { text: "Are you".into() });
    }

    #[test]
    fn test_audio_fragment_json_shape() {
        let json = r#"{ "type": "audio", "audio": "AAD//w==" }"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg, ServerMessage::Audio { audio: "AAD//w==".into() });
    }

    #[test]
    fn test_turn_complete_json_shape() {
        let json = r#"{
            "type": "turn_complete",
            "questionCount": 7,
            "awaitingReady": false,
            "isEmotionalResponse": false,
            "playerWon": true,
            "awaitingPlayAgain": false,
            "isFinalGuess": false
        }"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        let ServerMessage::TurnComplete { question_count, flags } = msg else {
            panic!("expected TurnComplete, got {msg:?}");
        };
        assert_eq!(question_count, 7);
        assert!(flags.player_won);
        assert!(!flags.awaiting_ready);
    }

    #[test]
    fn test_turn_complete_flags_default_to_false_when_missing() {
        // An older server may omit flags it doesn't know about.
        let json = r#"{ "type": "turn_complete", "questionCount": 1 }"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ServerMessage::TurnComplete {
                question_count: 1,
                flags: TurnFlags::default(),
            }
        );
    }

    #[test]
    fn test_resync_json_shape() {
        let json = r#"{
            "type": "resync",
            "message": "Let us take stock.",
            "questionCount": 3
        }"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Resync {
                message: "Let us take stock.".into(),
                question_count: 3,
            }
        );
    }

    #[test]
    fn test_unknown_tag_decodes_to_unknown() {
        // Forward compatibility: a newer server's message types must not
        // break the client.
        let json = r#"{ "type": "persona_mood", "mood": "smug" }"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg, ServerMessage::Unknown);
    }

    // =====================================================================
    // ClientMessage tags and field names
    // =====================================================================

    #[test]
    fn test_start_game_json_shape() {
        let msg = ClientMessage::StartGame {
            persona_id: "genie".into(),
            player_name: "Mara".into(),
            question_count_limit: DEFAULT_QUESTION_LIMIT,
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "start_game");
        assert_eq!(json["personaId"], "genie");
        assert_eq!(json["playerName"], "Mara");
        assert_eq!(json["questionCountLimit"], 25);
    }

    #[test]
    fn test_answer_message_json_shape() {
        let msg = ClientMessage::Answer {
            message: Answer::ProbablyNot,
            question_number: 4,
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "answer");
        assert_eq!(json["message"], "Probably Not");
        assert_eq!(json["questionNumber"], 4);
    }

    #[test]
    fn test_reveal_json_shape() {
        let msg = ClientMessage::Reveal {
            character_name: "Ada Lovelace".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "reveal");
        assert_eq!(json["characterName"], "Ada Lovelace");
    }

    #[test]
    fn test_client_message_round_trip() {
        let msg = ClientMessage::Answer {
            message: Answer::Continue,
            question_number: 0,
        };
        let bytes = serde_json::to_vec(&msg).unwrap();
        let decoded: ClientMessage = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }

    // =====================================================================
    // Malformed input
    // =====================================================================

    #[test]
    fn test_decode_garbage_returns_error() {
        let garbage = b"not json at all";
        let result: Result<ServerMessage, _> =
            serde_json::from_slice(garbage);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_missing_tag_returns_error() {
        let untagged = r#"{ "text": "hello" }"#;
        let result: Result<ServerMessage, _> =
            serde_json::from_str(untagged);
        assert!(result.is_err());
    }
}
