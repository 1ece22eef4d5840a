use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::facts::Fact;
use crate::scoring::RoundPoints;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// First miss or timeout ends the session.
    #[default]
    Classic,
    /// Misses never end the session; only quitting does.
    Practice,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Practice => "practice",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Playing,
    RoundResolved,
    GameOver,
}

/// How the current round was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    Correct,
    Incorrect,
    TimedOut,
}

/// Everything the presentation layer needs to render a session.
///
/// Only the engine mutates this; callers get a shared reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: Uuid,
    pub mode: GameMode,
    pub phase: Phase,
    /// 1-based round counter within the session.
    pub round: u32,
    /// Provider index of `fact`.
    pub current_fact_index: usize,
    pub fact: Fact,
    pub streak: u32,
    pub score: u32,
    pub time_remaining: u32,
    /// Set once per round by an accepted answer; stays empty on timeout.
    pub user_answer: Option<bool>,
    pub outcome: Option<RoundOutcome>,
    /// Points earned by the last resolved round.
    pub last_points: RoundPoints,
    pub paused: bool,
}

impl SessionState {
    pub(crate) fn new(mode: GameMode, fact_index: usize, fact: Fact, round_seconds: u32) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            mode,
            phase: Phase::Playing,
            round: 1,
            current_fact_index: fact_index,
            fact,
            streak: 0,
            score: 0,
            time_remaining: round_seconds,
            user_answer: None,
            outcome: None,
            last_points: RoundPoints::default(),
            paused: false,
        }
    }

    /// Open the next round on `fact`. Score and streak carry over.
    pub(crate) fn begin_round(&mut self, fact_index: usize, fact: Fact, round_seconds: u32) {
        self.phase = Phase::Playing;
        self.round += 1;
        self.current_fact_index = fact_index;
        self.fact = fact;
        self.time_remaining = round_seconds;
        self.user_answer = None;
        self.outcome = None;
        self.last_points = RoundPoints::default();
        self.paused = false;
    }

    /// True while an answer can still be accepted.
    pub fn is_open(&self) -> bool {
        self.phase == Phase::Playing && self.user_answer.is_none() && self.outcome.is_none()
    }
}
