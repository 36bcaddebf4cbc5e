//! Paced text reveal queue for the genie client.
//!
//! Text fragments arrive with network burstiness: a 200-character
//! fragment can land in one instant. The reveal queue decouples the
//! perceptual reveal rate from arrival timing: characters are released
//! one at a time at a fixed interval (default 30 ms), so bursty delivery
//! still reads as a steady, continuous reveal with no visible seam
//! between fragments.
//!
//! # Integration
//!
//! The queue is designed to sit inside the engine's `tokio::select!`
//! loop as a time-driven suspension point:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         msg = session.recv() => { /* enqueue fragments, ... */ }
//!         ch = reveal.next_char() => renderer.append_visible_text(ch),
//!     }
//! }
//! ```
//!
//! When the queue is empty, [`RevealQueue::next_char`] pends forever;
//! the drain self-terminates and `select!` keeps servicing the other
//! branches. Enqueueing while idle restarts the drain with the first
//! character due immediately.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::{self, Instant};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the reveal cadence.
#[derive(Debug, Clone)]
pub struct RevealConfig {
    /// Fixed interval between revealed characters.
    pub interval: Duration,
}

impl RevealConfig {
    /// Default per-character reveal interval.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(30);

    /// Creates a config with a custom reveal interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}

// ---------------------------------------------------------------------------
// Queue
// ---------------------------------------------------------------------------

/// An unbounded ordered queue of characters drained at a fixed cadence.
///
/// At most one drain is active per turn: the drain *is* the
/// [`next_char`](Self::next_char) future, and the engine's single event
/// loop awaits it in one place, so re-entrancy cannot arise.
pub struct RevealQueue {
    config: RevealConfig,
    pending: VecDeque<char>,
    /// When the next character is due. `None` means the drain is idle.
    next_due: Option<Instant>,
    revealed: u64,
}

impl RevealQueue {
    /// Creates an empty queue with the given cadence.
    pub fn new(config: RevealConfig) -> Self {
        Self {
            config,
            pending: VecDeque::new(),
            next_due: None,
            revealed: 0,
        }
    }

    /// Appends every character of `text` to the queue.
    ///
    /// If the drain was idle, it restarts with the first character due
    /// immediately; if a drain is in flight, the characters simply extend
    /// it, preserving order across fragment boundaries.
    pub fn enqueue(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.pending.extend(text.chars());
        if self.next_due.is_none() {
            self.next_due = Some(Instant::now());
        }
        tracing::trace!(
            queued = self.pending.len(),
            "text fragment enqueued"
        );
    }

    /// Waits until the next character is due and dequeues it.
    ///
    /// Pends forever while the queue is empty, so `tokio::select!` keeps
    /// processing other branches; the drain resumes automatically on the
    /// next [`enqueue`](Self::enqueue).
    pub async fn next_char(&mut self) -> char {
        let due = match self.next_due {
            Some(due) if !self.pending.is_empty() => due,
            _ => {
                // This future never completes; select! handles the other branches.
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(due).await;

        let Some(ch) = self.pending.pop_front() else {
            // Guarded above; nothing else mutates the queue between the
            // check and here because we hold &mut self across the await.
            unreachable!()
        };
        self.revealed += 1;

        // Schedule from the deadline, not from now, so a briefly busy
        // event loop catches up instead of drifting permanently late.
        self.next_due = if self.pending.is_empty() {
            None
        } else {
            Some(due + self.config.interval)
        };

        ch
    }

    /// Clears the queue and pacing state when a new turn opens.
    ///
    /// Undelivered characters from the previous turn are discarded, so
    /// no text ever bleeds across turns.
    pub fn reset(&mut self) {
        if !self.pending.is_empty() {
            tracing::debug!(
                discarded = self.pending.len(),
                "reveal queue reset, discarding undelivered characters"
            );
        }
        self.pending.clear();
        self.next_due = None;
    }

    /// Whether the drain is idle (nothing queued).
    pub fn is_idle(&self) -> bool {
        self.next_due.is_none()
    }

    /// Number of characters waiting to be revealed.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Total characters revealed since creation.
    pub fn revealed(&self) -> u64 {
        self.revealed
    }
}

impl Default for RevealQueue {
    fn default() -> Self {
        Self::new(RevealConfig::default())
    }
}
