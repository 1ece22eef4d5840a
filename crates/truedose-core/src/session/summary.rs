//! End-of-session summary shown on the game-over screen.

use serde::{Deserialize, Serialize};

use super::state::GameMode;
use crate::profile::{BestStreak, SessionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTier {
    KeepPushing,
    Good,
    Solid,
    Incredible,
    Legend,
}

impl StreakTier {
    pub fn for_streak(streak: u32) -> Self {
        match streak {
            50.. => StreakTier::Legend,
            25..=49 => StreakTier::Incredible,
            10..=24 => StreakTier::Solid,
            5..=9 => StreakTier::Good,
            _ => StreakTier::KeepPushing,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            StreakTier::Legend => "You're a TrueDose legend!",
            StreakTier::Incredible => "Incredible streak!",
            StreakTier::Solid => "Solid knowledge!",
            StreakTier::Good => "Good progress!",
            StreakTier::KeepPushing => "Keep pushing!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverSummary {
    pub headline: String,
    pub streak: u32,
    pub score: u32,
    pub rounds_played: u32,
    pub tier: StreakTier,
    pub motivation: String,
    pub best_streak: BestStreak,
}

impl GameOverSummary {
    pub fn new(result: &SessionResult, best_streak: BestStreak) -> Self {
        let tier = StreakTier::for_streak(result.final_streak);
        Self {
            headline: headline(result.mode, result.final_score).to_string(),
            streak: result.final_streak,
            score: result.final_score,
            rounds_played: result.rounds_played,
            tier,
            motivation: tier.message().to_string(),
            best_streak,
        }
    }
}

pub fn headline(mode: GameMode, score: u32) -> &'static str {
    if mode == GameMode::Practice {
        return "Practice Session Complete!";
    }
    match score {
        501.. => "Fantastic Performance!",
        201..=500 => "Great Effort!",
        _ => "You can do better!",
    }
}
