//! Round countdown.
//!
//! Like the rest of the timer code this is a wall-clock state machine with
//! no internal thread: the caller polls it with the current instant and
//! receives one [`Tick`] per whole second that has elapsed since the last
//! poll.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!         Expired          (any state) --cancel--> Idle
//! ```
//!
//! Every `start`, `pause` and `cancel` moves the countdown to a new
//! generation. A tick is only live while its generation matches, so ticks
//! that were produced but not yet consumed when the countdown was cancelled
//! can never act on a later round.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    Idle,
    Running,
    Paused,
    /// All ticks down to zero have been produced.
    Expired,
}

/// One elapsed second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub generation: u64,
    pub remaining_secs: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Countdown {
    state: CountdownState,
    generation: u64,
    duration_secs: u32,
    /// Whole seconds already handed out as ticks.
    delivered_secs: u32,
    /// Milliseconds elapsed before the most recent resume.
    banked_ms: i64,
    /// When the countdown was last started or resumed.
    resumed_at: Option<DateTime<Utc>>,
}

impl Countdown {
    pub fn new() -> Self {
        Self {
            state: CountdownState::Idle,
            generation: 0,
            duration_secs: 0,
            delivered_secs: 0,
            banked_ms: 0,
            resumed_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.duration_secs.saturating_sub(self.delivered_secs)
    }

    /// True when `tick` belongs to the current, uncancelled run.
    pub fn is_live(&self, tick: &Tick) -> bool {
        self.state != CountdownState::Idle && tick.generation == self.generation
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, duration_secs: u32, now: DateTime<Utc>) {
        self.generation += 1;
        self.state = CountdownState::Running;
        self.duration_secs = duration_secs;
        self.delivered_secs = 0;
        self.banked_ms = 0;
        self.resumed_at = Some(now);
    }

    /// Stop delivery. Safe to call in any state.
    pub fn cancel(&mut self) {
        if self.state == CountdownState::Idle {
            return;
        }
        // Expired still counts: its zero tick may not have been consumed yet.
        self.generation += 1;
        self.state = CountdownState::Idle;
        self.resumed_at = None;
    }

    pub fn reset(&mut self, duration_secs: u32, now: DateTime<Utc>) {
        self.cancel();
        self.start(duration_secs, now);
    }

    /// Freeze the countdown, keeping partial progress toward the next tick.
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        if self.state != CountdownState::Running {
            return false;
        }
        self.banked_ms = self.elapsed_ms(now);
        self.resumed_at = None;
        self.state = CountdownState::Paused;
        self.generation += 1;
        true
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> bool {
        if self.state != CountdownState::Paused {
            return false;
        }
        self.resumed_at = Some(now);
        self.state = CountdownState::Running;
        true
    }

    /// Produce the ticks for every whole second elapsed since the last poll.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Vec<Tick> {
        if self.state != CountdownState::Running {
            return Vec::new();
        }

        let elapsed_secs = (self.elapsed_ms(now) / 1000).min(self.duration_secs as i64) as u32;
        let ticks: Vec<Tick> = (self.delivered_secs + 1..=elapsed_secs)
            .map(|s| Tick {
                generation: self.generation,
                remaining_secs: self.duration_secs - s,
            })
            .collect();
        self.delivered_secs = self.delivered_secs.max(elapsed_secs);

        if self.delivered_secs == self.duration_secs {
            self.state = CountdownState::Expired;
            self.resumed_at = None;
        }
        ticks
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        let running = self
            .resumed_at
            .map(|at| (now - at).num_milliseconds().max(0))
            .unwrap_or(0);
        self.banked_ms + running
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}
