//! The turn synchronization engine.
//!
//! One [`Engine`] per game session, running as a single Tokio task that
//! owns all mutable state. Everything flows through one `tokio::select!`
//! loop:
//!
//! - inbound server messages (content fragments, control signals),
//! - the paced character reveal,
//! - the advisory end-of-speech deadline,
//! - player commands arriving from [`EngineHandle`]s.
//!
//! Because the loop is the only writer, no locks guard the turn machine,
//! the reveal queue, or the audio scheduler, and there is no ordering
//! hazard between a command and an inbound message: whichever the loop
//! services first wins, atomically.
//!
//! Handles talk to the engine over an mpsc command channel and receive
//! the validation result over a per-command oneshot, so an illegal action
//! (answering while the genie is thinking) fails at the caller with
//! [`ClientError::ActionNotAllowed`] instead of corrupting state.

use genie_audio::{AudioScheduler, AudioSink};
use genie_protocol::{Answer, ClientMessage, Codec, ServerMessage};
use genie_reveal::{RevealConfig, RevealQueue};
use genie_transport::Channel;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::render::Renderer;
use crate::session::Session;
use crate::turn::{Phase, TurnMachine};
use crate::{ActionSet, ClientError};

/// Capacity of the handle-to-engine command channel. Commands are
/// player-paced; anything beyond a handful in flight means the loop is
/// wedged and backpressure is the right answer.
const COMMAND_CHANNEL_SIZE: usize = 16;

type Reply = oneshot::Sender<Result<(), ClientError>>;

// ---------------------------------------------------------------------------
// Commands and handle
// ---------------------------------------------------------------------------

/// A player action submitted through an [`EngineHandle`].
enum EngineCommand {
    StartGame {
        persona_id: String,
        player_name: String,
        question_count_limit: u32,
        reply: Reply,
    },
    Answer {
        answer: Answer,
        reply: Reply,
    },
    Reveal {
        character_name: String,
        reply: Reply,
    },
    PlayAgain {
        again: bool,
        reply: Reply,
    },
    Quit,
}

/// A cloneable handle for submitting player actions to a running engine.
///
/// Every method waits for the engine to validate and send the action, so
/// the returned `Result` reflects the phase rules: an action submitted in
/// the wrong phase comes back as [`ClientError::ActionNotAllowed`] and
/// nothing goes on the wire.
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    async fn submit(
        &self,
        build: impl FnOnce(Reply) -> EngineCommand,
    ) -> Result<(), ClientError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .await
            .map_err(|_| ClientError::EngineStopped)?;
        rx.await.map_err(|_| ClientError::EngineStopped)?
    }

    /// Starts a new game with the chosen persona. Legal only while idle.
    pub async fn start_game(
        &self,
        persona_id: impl Into<String>,
        player_name: impl Into<String>,
        question_count_limit: u32,
    ) -> Result<(), ClientError> {
        let persona_id = persona_id.into();
        let player_name = player_name.into();
        self.submit(|reply| EngineCommand::StartGame {
            persona_id,
            player_name,
            question_count_limit,
            reply,
        })
        .await
    }

    /// Sends an answer (or a `Continue` ack) for the current question.
    pub async fn answer(&self, answer: Answer) -> Result<(), ClientError> {
        self.submit(|reply| EngineCommand::Answer { answer, reply })
            .await
    }

    /// Reveals the character the player was thinking of, after a win.
    pub async fn reveal(
        &self,
        character_name: impl Into<String>,
    ) -> Result<(), ClientError> {
        let character_name = character_name.into();
        self.submit(|reply| EngineCommand::Reveal {
            character_name,
            reply,
        })
        .await
    }

    /// Answers the play-again prompt. `true` restarts with the same
    /// persona and player name; `false` returns the engine to idle.
    pub async fn play_again(&self, again: bool) -> Result<(), ClientError> {
        self.submit(|reply| EngineCommand::PlayAgain { again, reply })
            .await
    }

    /// Stops the engine's event loop and closes the channel.
    pub async fn quit(&self) -> Result<(), ClientError> {
        self.commands
            .send(EngineCommand::Quit)
            .await
            .map_err(|_| ClientError::EngineStopped)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Parameters of the last `start_game`, kept for play-again restarts.
struct StartParams {
    persona_id: String,
    player_name: String,
    question_count_limit: u32,
}

/// Outcome of servicing one event; `Stop` ends the loop.
#[derive(PartialEq)]
enum Flow {
    Continue,
    Stop,
}

/// The session engine. Owns the typed session, the turn machine, the
/// reveal queue, the audio scheduler, and the renderer.
pub struct Engine<C, K, R, S>
where
    C: Channel,
    K: Codec,
    R: Renderer,
    S: AudioSink,
{
    session: Session<C, K>,
    renderer: R,
    machine: TurnMachine,
    reveal: RevealQueue,
    audio: AudioScheduler<S>,
    commands: mpsc::Receiver<EngineCommand>,
    /// Action set of the last completed turn; `None` while a turn is
    /// streaming or before the first turn.
    actions: Option<ActionSet>,
    /// Whether the renderer was last told `set_speaking(true)`.
    speaking: bool,
    last_start: Option<StartParams>,
}

impl<C, K, R, S> Engine<C, K, R, S>
where
    C: Channel,
    K: Codec,
    R: Renderer,
    S: AudioSink,
{
    /// Creates an engine over an already-open channel, plus the handle
    /// used to drive it. Call [`run`](Self::run) to start the loop.
    pub fn new(channel: C, codec: K, renderer: R, sink: S) -> (Self, EngineHandle) {
        Self::with_reveal_config(channel, codec, renderer, sink, RevealConfig::default())
    }

    /// Like [`new`](Self::new) with a custom reveal cadence.
    pub fn with_reveal_config(
        channel: C,
        codec: K,
        renderer: R,
        sink: S,
        reveal: RevealConfig,
    ) -> (Self, EngineHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let engine = Self {
            session: Session::new(channel, codec),
            renderer,
            machine: TurnMachine::new(),
            reveal: RevealQueue::new(reveal),
            audio: AudioScheduler::new(sink),
            commands: rx,
            actions: None,
            speaking: false,
            last_start: None,
        };
        (engine, EngineHandle { commands: tx })
    }

    /// Runs the event loop until quit, handle drop, or channel loss.
    pub async fn run(mut self) {
        tracing::debug!("engine started");
        loop {
            // Snapshot the advisory deadline so the branch future does
            // not borrow the scheduler across the select.
            let speech_due = if self.speaking {
                self.audio.speaking_until()
            } else {
                None
            };

            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        Some(command) => {
                            if self.handle_command(command).await == Flow::Stop {
                                break;
                            }
                        }
                        // Every handle dropped; nothing can drive us.
                        None => break,
                    }
                }

                inbound = self.session.recv() => {
                    match inbound {
                        Ok(Some(message)) => self.handle_server(message),
                        Ok(None) => {
                            tracing::warn!("channel closed by server");
                            self.renderer.connection_lost("channel closed");
                            break;
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "channel failed");
                            self.renderer.connection_lost(&err.to_string());
                            break;
                        }
                    }
                }

                ch = self.reveal.next_char() => {
                    self.renderer.append_visible_text(ch);
                }

                _ = deadline(speech_due) => {
                    // Scheduled audio ran out before the turn completed.
                    self.end_speaking();
                }
            }
        }
        self.session.close().await;
        tracing::debug!("engine stopped");
    }

    // -----------------------------------------------------------------------
    // Player commands
    // -----------------------------------------------------------------------

    async fn handle_command(&mut self, command: EngineCommand) -> Flow {
        match command {
            EngineCommand::StartGame {
                persona_id,
                player_name,
                question_count_limit,
                reply,
            } => {
                let result = self
                    .start_game(persona_id, player_name, question_count_limit)
                    .await;
                let _ = reply.send(result);
                Flow::Continue
            }
            EngineCommand::Answer { answer, reply } => {
                let result = self.answer(answer).await;
                let _ = reply.send(result);
                Flow::Continue
            }
            EngineCommand::Reveal {
                character_name,
                reply,
            } => {
                let result = self.reveal(character_name).await;
                let _ = reply.send(result);
                Flow::Continue
            }
            EngineCommand::PlayAgain { again, reply } => {
                let result = self.play_again(again).await;
                let _ = reply.send(result);
                Flow::Continue
            }
            EngineCommand::Quit => {
                tracing::info!("quit requested");
                Flow::Stop
            }
        }
    }

    async fn start_game(
        &mut self,
        persona_id: String,
        player_name: String,
        question_count_limit: u32,
    ) -> Result<(), ClientError> {
        if self.machine.phase() != Phase::Idle {
            return Err(ClientError::ActionNotAllowed(self.machine.phase()));
        }
        self.session
            .send(&ClientMessage::StartGame {
                persona_id: persona_id.clone(),
                player_name: player_name.clone(),
                question_count_limit,
            })
            .await?;
        tracing::info!(persona = %persona_id, "game start requested");
        self.last_start = Some(StartParams {
            persona_id,
            player_name,
            question_count_limit,
        });
        self.machine.begin_session();
        self.reset_turn_output();
        Ok(())
    }

    async fn answer(&mut self, answer: Answer) -> Result<(), ClientError> {
        let phase = self.machine.phase();
        let allowed = self
            .actions
            .is_some_and(|actions| phase.is_awaiting() && actions.allows(answer));
        if !allowed {
            return Err(ClientError::ActionNotAllowed(phase));
        }
        self.session
            .send(&ClientMessage::Answer {
                message: answer,
                question_number: self.machine.question_number(),
            })
            .await?;
        tracing::debug!(
            answer = %answer,
            question = self.machine.question_number(),
            "answer sent"
        );
        self.open_turn();
        Ok(())
    }

    async fn reveal(&mut self, character_name: String) -> Result<(), ClientError> {
        if self.machine.phase() != Phase::AwaitingReveal {
            return Err(ClientError::ActionNotAllowed(self.machine.phase()));
        }
        self.session
            .send(&ClientMessage::Reveal { character_name })
            .await?;
        self.open_turn();
        Ok(())
    }

    async fn play_again(&mut self, again: bool) -> Result<(), ClientError> {
        if self.machine.phase() != Phase::AwaitingPlayAgain {
            return Err(ClientError::ActionNotAllowed(self.machine.phase()));
        }
        if !again {
            tracing::info!("play again declined, returning to idle");
            self.machine.reset();
            self.reset_turn_output();
            self.renderer.show_question_counter(false);
            return Ok(());
        }
        // Restart with the same persona and player. A play-again prompt
        // can only follow a started game, so the params are present.
        let Some(params) = &self.last_start else {
            return Err(ClientError::ActionNotAllowed(self.machine.phase()));
        };
        self.session
            .send(&ClientMessage::StartGame {
                persona_id: params.persona_id.clone(),
                player_name: params.player_name.clone(),
                question_count_limit: params.question_count_limit,
            })
            .await?;
        tracing::info!("play again accepted, restarting");
        self.machine.begin_session();
        self.reset_turn_output();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Server messages
    // -----------------------------------------------------------------------

    fn handle_server(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::GameStarted {
                image,
                question_count,
            } => {
                tracing::info!(question_count, "game started");
                if let Some(url) = image.as_deref() {
                    self.renderer.set_avatar(url);
                }
                self.machine.game_started(question_count);
                self.renderer.set_question_count(question_count);
                self.renderer.show_question_counter(true);
            }

            ServerMessage::Text { text } => {
                self.machine.append_text(&text);
                self.reveal.enqueue(&text);
            }

            ServerMessage::Audio { audio } => match self.audio.submit(&audio) {
                Ok(_) => {
                    if !self.speaking {
                        self.speaking = true;
                        self.renderer.set_speaking(true);
                    }
                }
                // A bad fragment costs a moment of silence, nothing more.
                Err(err) => {
                    tracing::debug!(error = %err, "dropping malformed audio fragment");
                }
            },

            ServerMessage::TurnComplete {
                question_count,
                flags,
            } => {
                let actions = self.machine.complete_turn(question_count, flags);
                tracing::debug!(
                    question_count,
                    phase = %self.machine.phase(),
                    "turn complete"
                );
                self.actions = Some(actions);
                self.renderer.set_question_count(question_count);
                self.end_speaking();
                self.renderer.show_actions(actions);
            }

            ServerMessage::Resync {
                message,
                question_count,
            } => {
                tracing::warn!(
                    server_count = question_count,
                    local_count = self.machine.question_number(),
                    "question count diverged, resyncing"
                );
                let actions = self.machine.resync(question_count, &message);
                self.actions = Some(actions);
                self.reveal.reset();
                self.renderer.clear_text();
                self.reveal.enqueue(&message);
                self.renderer.set_question_count(question_count);
                self.renderer.show_question_counter(true);
                self.end_speaking();
                self.renderer.show_actions(actions);
            }

            ServerMessage::Unknown => {
                tracing::debug!("ignoring unknown message type");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Shared transitions
    // -----------------------------------------------------------------------

    /// A player action went on the wire: open a fresh turn and clear all
    /// per-turn output so nothing bleeds across the boundary.
    fn open_turn(&mut self) {
        self.machine.open_turn();
        self.reset_turn_output();
    }

    fn reset_turn_output(&mut self) {
        self.reveal.reset();
        self.audio.reset();
        self.renderer.clear_text();
        self.actions = None;
        if self.speaking {
            self.speaking = false;
            self.renderer.set_speaking(false);
        }
    }

    fn end_speaking(&mut self) {
        self.audio.clear_speaking();
        if self.speaking {
            self.speaking = false;
            self.renderer.set_speaking(false);
        }
    }
}

/// Sleeps until `due`, or pends forever when there is no deadline, so the
/// select branch stays inert while nothing is speaking.
async fn deadline(due: Option<Instant>) {
    match due {
        Some(due) => tokio::time::sleep_until(due).await,
        None => std::future::pending().await,
    }
}
