//! End-of-session results and the profile sync boundary.
//!
//! The engine hands each finished session to a [`ResultSink`] without
//! waiting on persistence. A [`ProfileSync`] implementation does the actual
//! storage, usually behind the background worker in [`worker`].

mod sqlite;
pub mod worker;

pub use sqlite::SqliteProfileStore;
pub use worker::{spawn_profile_sync, ChannelSink, SyncReport};

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SyncError;
use crate::session::GameMode;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    WrongAnswer,
    Timeout,
    Quit,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::WrongAnswer => "wrong_answer",
            EndReason::Timeout => "timeout",
            EndReason::Quit => "quit",
        }
    }
}

/// Produced exactly once when a session reaches game over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub session_id: Uuid,
    pub mode: GameMode,
    pub final_streak: u32,
    pub final_score: u32,
    pub rounds_played: u32,
    pub end_reason: EndReason,
    pub user_id: Option<String>,
    pub ended_at: DateTime<Utc>,
}

/// Persistence side of profile sync.
pub trait ProfileSync: Send + Sync {
    fn record_result(&self, result: &SessionResult) -> Result<(), SyncError>;

    /// Lifetime best streak. `Ok(None)` when there is no signed-in user or
    /// nothing has been stored for them yet.
    fn highest_streak(&self, user_id: Option<&str>) -> Result<Option<u32>, SyncError>;
}

/// Non-blocking handoff used by the engine.
pub trait ResultSink: Send {
    fn submit(&self, result: SessionResult) -> Result<(), SyncError>;
}

/// Best streak as shown to the player. Absent data stays unknown rather
/// than reading as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum BestStreak {
    Unknown,
    Known(u32),
}

impl BestStreak {
    /// Read the stored best streak. Store failures degrade to `Unknown`.
    pub fn lookup(sync: &dyn ProfileSync, user_id: Option<&str>) -> Self {
        match sync.highest_streak(user_id) {
            Ok(Some(n)) => BestStreak::Known(n),
            Ok(None) => BestStreak::Unknown,
            Err(e) => {
                tracing::warn!(error = %e, "could not read best streak");
                BestStreak::Unknown
            }
        }
    }

    pub fn value(&self) -> Option<u32> {
        match self {
            BestStreak::Unknown => None,
            BestStreak::Known(n) => Some(*n),
        }
    }
}

impl fmt::Display for BestStreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BestStreak::Unknown => f.write_str("unknown"),
            BestStreak::Known(n) => write!(f, "{n}"),
        }
    }
}

/// Keeps submitted results in memory. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    results: Arc<Mutex<Vec<SessionResult>>>,
    reject_with: Option<SyncError>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that refuses every result with `err`.
    pub fn failing(err: SyncError) -> Self {
        Self {
            results: Arc::default(),
            reject_with: Some(err),
        }
    }

    pub fn results(&self) -> Vec<SessionResult> {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ResultSink for MemorySink {
    fn submit(&self, result: SessionResult) -> Result<(), SyncError> {
        if let Some(err) = &self.reject_with {
            return Err(err.clone());
        }
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedStore(Result<Option<u32>, SyncError>);

    impl ProfileSync for FixedStore {
        fn record_result(&self, _result: &SessionResult) -> Result<(), SyncError> {
            Ok(())
        }

        fn highest_streak(&self, _user_id: Option<&str>) -> Result<Option<u32>, SyncError> {
            self.0.clone()
        }
    }

    #[test]
    fn best_streak_absent_is_unknown_not_zero() {
        let store = FixedStore(Ok(None));
        let best = BestStreak::lookup(&store, None);
        assert_eq!(best, BestStreak::Unknown);
        assert_eq!(best.value(), None);
        assert_eq!(best.to_string(), "unknown");
    }

    #[test]
    fn best_streak_known_and_failure() {
        assert_eq!(
            BestStreak::lookup(&FixedStore(Ok(Some(0))), Some("u1")),
            BestStreak::Known(0)
        );
        assert_eq!(
            BestStreak::lookup(&FixedStore(Err(SyncError::Store("offline".into()))), Some("u1")),
            BestStreak::Unknown
        );
    }

    #[test]
    fn failing_sink_rejects() {
        let sink = MemorySink::failing(SyncError::ChannelClosed);
        let result = SessionResult {
            session_id: Uuid::new_v4(),
            mode: GameMode::Classic,
            final_streak: 1,
            final_score: 150,
            rounds_played: 2,
            end_reason: EndReason::Quit,
            user_id: None,
            ended_at: Utc::now(),
        };
        assert_eq!(sink.submit(result), Err(SyncError::ChannelClosed));
        assert!(sink.results().is_empty());
    }
}
