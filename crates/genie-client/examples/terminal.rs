//! Minimal terminal client: connects to a game server, prints revealed
//! text, and answers from stdin.
//!
//! ```sh
//! cargo run --example terminal -- ws://localhost:9000/game
//! ```

use std::io::Write as _;

use genie_client::{ActionSet, Answer, Engine, Renderer};
use genie_protocol::{DEFAULT_QUESTION_LIMIT, JsonCodec};
use genie_transport::WebSocketChannel;
use tokio::time::Instant;

struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn append_visible_text(&mut self, ch: char) {
        print!("{ch}");
        let _ = std::io::stdout().flush();
    }

    fn clear_text(&mut self) {
        println!();
    }

    fn show_actions(&mut self, actions: ActionSet) {
        println!();
        match actions {
            ActionSet::RevealInput => println!("(type the character's name)"),
            ActionSet::PlayAgain => println!("(play again? y/n)"),
            _ => {
                let names: Vec<&str> =
                    actions.answers().iter().map(Answer::as_str).collect();
                println!("[{}]", names.join(" / "));
            }
        }
    }

    fn set_speaking(&mut self, _speaking: bool) {}

    fn set_question_count(&mut self, count: u32) {
        println!("-- question {count} --");
    }

    fn show_question_counter(&mut self, _visible: bool) {}
}

/// Discards audio; a real client would feed a playback device here.
struct NullSink;

impl genie_audio::AudioSink for NullSink {
    fn play(&mut self, _start: Instant, _samples: Vec<f32>) {}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "genie_client=info".into()),
        )
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://localhost:9000/game".into());

    let channel = WebSocketChannel::connect(&url).await?;
    let (engine, handle) = Engine::new(channel, JsonCodec, TerminalRenderer, NullSink);
    let engine_task = tokio::spawn(engine.run());

    handle
        .start_game("genie-classic", "player", DEFAULT_QUESTION_LIMIT)
        .await?;

    let stdin = std::io::stdin();
    loop {
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            handle.quit().await?;
            break;
        }
        let input = line.trim();
        let result = match input {
            "" | "c" => handle.answer(Answer::Continue).await,
            "y" => handle.answer(Answer::Yes).await,
            "n" => handle.answer(Answer::No).await,
            "?" => handle.answer(Answer::DontKnow).await,
            "p" => handle.answer(Answer::Probably).await,
            "pn" => handle.answer(Answer::ProbablyNot).await,
            "again" => handle.play_again(true).await,
            "stop" => handle.play_again(false).await,
            "quit" => {
                handle.quit().await?;
                break;
            }
            name => handle.reveal(name).await,
        };
        if let Err(err) = result {
            eprintln!("! {err}");
        }
    }

    let _ = engine_task.await;
    Ok(())
}
