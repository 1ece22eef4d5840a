//! Session state machine and its end-of-game summary.

mod engine;
mod state;
mod summary;

pub use engine::{SessionBuilder, SessionEngine};
pub use state::{GameMode, Phase, RoundOutcome, SessionState};
pub use summary::{headline, GameOverSummary, StreakTier};
