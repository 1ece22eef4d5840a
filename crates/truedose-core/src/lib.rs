//! # TrueDose Core Library
//!
//! Core logic for TrueDose, a timed true/false medical trivia game. The CLI
//! binary is a thin presentation layer over this crate: every rule lives
//! here and every state change comes out as an [`Event`].
//!
//! ## Architecture
//!
//! - **Session**: [`SessionEngine`] applies the round rules. It holds no
//!   thread; the caller pumps it and feeds it answers.
//! - **Timer**: a single wall-clock [`Countdown`] per session whose ticks
//!   carry a generation, so a cancelled countdown cannot act on a later
//!   round.
//! - **Facts**: a [`FactProvider`] behind a [`FactDeck`] that decides the
//!   order facts are shown in.
//! - **Quota**: [`ExplanationQuota`] limits free explanation reveals per
//!   local calendar day.
//! - **Profile**: finished sessions go to a [`ResultSink`]; a background
//!   worker persists them through [`ProfileSync`].
//! - **Storage**: SQLite for results, bookmarks and quota state, TOML for
//!   configuration.

pub mod bookmarks;
pub mod error;
pub mod events;
pub mod facts;
pub mod profile;
pub mod quota;
pub mod scoring;
pub mod session;
pub mod storage;
pub mod timer;

pub use bookmarks::{BookmarkStore, MemoryBookmarks};
pub use error::{ConfigError, ContentError, CoreError, DatabaseError, SyncError};
pub use events::{Event, SyncStatus};
pub use facts::{Fact, FactDeck, FactOrder, FactProvider, InMemoryFacts};
pub use profile::{
    spawn_profile_sync, BestStreak, ChannelSink, EndReason, MemorySink, ProfileSync, ResultSink,
    SessionResult, SqliteProfileStore, SyncReport,
};
pub use quota::{ExplanationQuota, QuotaState};
pub use scoring::{round_score, speed_bonus, RoundPoints, ScoringRules, SpeedBonusTier};
pub use session::{GameMode, GameOverSummary, Phase, RoundOutcome, SessionEngine, SessionState};
pub use storage::{Config, Database};
pub use timer::{Clock, Countdown, CountdownState, ManualClock, SystemClock, Tick};
