//! Gapless audio fragment scheduler for the genie client.
//!
//! The server streams synthesized speech as base64-encoded chunks of
//! little-endian 16-bit mono PCM at 24 kHz. Chunks arrive with network
//! burstiness; this crate schedules them so playback is gapless and
//! order-preserving:
//!
//! - Fragments arriving faster than real time queue back-to-back with
//!   no inserted silence.
//! - Fragments arriving slower than real time each start immediately,
//!   accepting an audible gap rather than overlapping or reordering.
//!
//! The scheduler computes *when* each buffer should start; actually
//! producing sound is the [`AudioSink`] collaborator's job. That keeps
//! the scheduling math testable without an audio device.
//!
//! # Integration
//!
//! One [`AudioScheduler`] per session, driven from the engine's event
//! loop. `submit` is synchronous and never blocks; the sink hand-off is
//! fire-and-forget against the host's timing primitives.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tokio::time::Instant;

mod error;

pub use error::AudioError;

/// Sample rate of every fragment, in Hz. Fixed by the server's TTS output.
pub const SAMPLE_RATE_HZ: u32 = 24_000;

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes a base64 PCM16 fragment into normalized `f32` samples.
///
/// Each signed 16-bit sample is divided by 32768 to land in `[-1.0, 1.0)`.
///
/// # Errors
/// Returns [`AudioError::Base64`] for malformed base64 and
/// [`AudioError::TruncatedSample`] when the byte length is odd.
pub fn decode_fragment(payload: &str) -> Result<Vec<f32>, AudioError> {
    let bytes = BASE64.decode(payload).map_err(AudioError::Base64)?;
    if bytes.len() % 2 != 0 {
        return Err(AudioError::TruncatedSample { len: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect())
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Receives decoded sample buffers with their scheduled start times.
///
/// Implementations hand the buffer to the host audio output (or record
/// it, in tests). `play` must not block: the engine calls it from its
/// single event-loop task.
pub trait AudioSink: Send + 'static {
    /// Queues `samples` for playback starting at `start`.
    fn play(&mut self, start: Instant, samples: Vec<f32>);
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Schedules audio fragments for gapless, order-preserving playback.
///
/// The playback cursor is "the timestamp at which the next fragment may
/// begin playing": monotonically non-decreasing within a turn, cleared
/// by [`reset`](Self::reset) when a new turn opens so a stale cursor from
/// an aborted turn never delays new audio.
pub struct AudioScheduler<S: AudioSink> {
    sink: S,
    /// End of the last scheduled fragment. `None` means the next fragment
    /// starts at the current clock time.
    cursor: Option<Instant>,
    /// Computed end of all scheduled speech, for the advisory "is
    /// speaking" signal. Approximate under bursty arrival by design.
    speaking_until: Option<Instant>,
    fragments_scheduled: u64,
}

impl<S: AudioSink> AudioScheduler<S> {
    /// Creates a scheduler that hands scheduled buffers to `sink`.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            cursor: None,
            speaking_until: None,
            fragments_scheduled: 0,
        }
    }

    /// Decodes a fragment and schedules it at `max(cursor, now)`.
    ///
    /// On success the cursor advances to the fragment's computed end
    /// (`scheduled start + sample_count / 24000` seconds) and the
    /// fragment's duration is returned. A fragment is never scheduled
    /// before the current clock time and never before a previously
    /// scheduled fragment's end.
    ///
    /// # Errors
    /// Returns the decode error for a malformed fragment. The cursor and
    /// speaking deadline are untouched in that case.
    pub fn submit(&mut self, payload: &str) -> Result<Duration, AudioError> {
        let samples = decode_fragment(payload)?;

        let now = Instant::now();
        let start = match self.cursor {
            Some(cursor) if cursor > now => cursor,
            _ => now,
        };
        let duration =
            Duration::from_secs_f64(samples.len() as f64 / SAMPLE_RATE_HZ as f64);
        let end = start + duration;

        self.cursor = Some(end);
        self.speaking_until = Some(end);
        self.fragments_scheduled += 1;

        tracing::trace!(
            samples = samples.len(),
            start_in_ms = start.saturating_duration_since(now).as_millis() as u64,
            duration_ms = duration.as_secs_f64() * 1000.0,
            "audio fragment scheduled"
        );

        self.sink.play(start, samples);
        Ok(duration)
    }

    /// Discards scheduling state when a new turn opens.
    ///
    /// The next fragment starts at the clock time of its own `submit`
    /// call. Already-started playback is not forcibly stopped; turns do
    /// not overlap in practice, and the sink owns anything in flight.
    pub fn reset(&mut self) {
        if self.cursor.is_some() {
            tracing::debug!("audio scheduler reset, discarding stale cursor");
        }
        self.cursor = None;
        self.speaking_until = None;
    }

    /// Computed end of all scheduled speech, if any is pending.
    ///
    /// Advisory only: when fragments arrive slower than playback this
    /// lags reality. It drives presentation, never game logic.
    pub fn speaking_until(&self) -> Option<Instant> {
        self.speaking_until
    }

    /// Clears the speaking deadline without touching the cursor.
    ///
    /// Called when the turn-complete control message ends the advisory
    /// signal ahead of the computed deadline.
    pub fn clear_speaking(&mut self) {
        self.speaking_until = None;
    }

    /// Total fragments successfully scheduled since creation.
    pub fn fragments_scheduled(&self) -> u64 {
        self.fragments_scheduled
    }

    /// The current playback cursor, if a fragment has been scheduled
    /// since the last reset.
    pub fn cursor(&self) -> Option<Instant> {
        self.cursor
    }
}

// =========================================================================
// Tests
// =========================================================================
