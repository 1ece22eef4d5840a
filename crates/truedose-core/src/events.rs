use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::SessionResult;
use crate::scoring::RoundPoints;
use crate::session::SessionState;

/// Whether the end-of-session result reached the sync queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncStatus {
    Queued,
    /// Soft failure: the result is still held by the engine.
    Failed { reason: String },
}

/// Every state change in a session produces an Event.
/// The presentation layer renders them; nothing in here holds a timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    RoundStarted {
        round: u32,
        fact_id: String,
        statement: String,
        category: String,
        time_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerTick {
        time_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        time_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerResumed {
        time_remaining: u32,
        at: DateTime<Utc>,
    },
    AnswerAccepted {
        fact_id: String,
        answer: bool,
        correct: bool,
        points: RoundPoints,
        streak: u32,
        score: u32,
        at: DateTime<Utc>,
    },
    RoundTimedOut {
        fact_id: String,
        correct_answer: bool,
        at: DateTime<Utc>,
    },
    GameOver {
        result: SessionResult,
        sync: SyncStatus,
        at: DateTime<Utc>,
    },
    ExplanationRevealed {
        fact_id: String,
        explanation: String,
        source: Option<String>,
        correct_answer: bool,
        user_answer: Option<bool>,
        /// Free reveals left today; `None` for subscribers.
        remaining_today: Option<u32>,
        at: DateTime<Utc>,
    },
    /// Daily limit reached; the caller may offer a subscription.
    QuotaExhausted {
        fact_id: String,
        daily_limit: u32,
        at: DateTime<Utc>,
    },
    BookmarkToggled {
        fact_id: String,
        bookmarked: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        /// Bonus a correct answer would earn right now.
        speed_bonus: u32,
        at: DateTime<Utc>,
    },
}
