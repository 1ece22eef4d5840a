//! Round scoring.
//!
//! Scoring is a pure function of whether the answer was right and how many
//! seconds were left on the countdown when it was accepted.
//!
//! | Time remaining | Speed bonus |
//! |----------------|-------------|
//! | > 10s          | 50          |
//! | > 5s           | 25          |
//! | otherwise      | 0           |
//!
//! A correct answer earns the base points (100) plus the bonus; an incorrect
//! answer or a timeout earns nothing.

use serde::{Deserialize, Serialize};

use crate::storage::config::{BASE_CORRECT_POINTS, DEFAULT_SPEED_BONUS_TIERS};

/// Bonus awarded when strictly more than `above_secs` seconds remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedBonusTier {
    pub above_secs: u32,
    pub points: u32,
}

/// Points earned by a single round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundPoints {
    pub base: u32,
    pub speed_bonus: u32,
}

impl RoundPoints {
    pub fn total(&self) -> u32 {
        self.base + self.speed_bonus
    }
}

/// Scoring table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    pub base_correct_points: u32,
    /// Sorted by `above_secs`, highest first.
    pub speed_bonus_tiers: Vec<SpeedBonusTier>,
}

impl ScoringRules {
    pub fn new(base_correct_points: u32, mut speed_bonus_tiers: Vec<SpeedBonusTier>) -> Self {
        speed_bonus_tiers.sort_by(|a, b| b.above_secs.cmp(&a.above_secs));
        Self {
            base_correct_points,
            speed_bonus_tiers,
        }
    }

    /// Bonus for answering with `time_remaining` seconds left.
    pub fn speed_bonus(&self, time_remaining: u32) -> u32 {
        self.speed_bonus_tiers
            .iter()
            .find(|tier| time_remaining > tier.above_secs)
            .map(|tier| tier.points)
            .unwrap_or(0)
    }

    pub fn round_points(&self, is_correct: bool, time_remaining: u32) -> RoundPoints {
        if !is_correct {
            return RoundPoints::default();
        }
        RoundPoints {
            base: self.base_correct_points,
            speed_bonus: self.speed_bonus(time_remaining),
        }
    }

    pub fn round_score(&self, is_correct: bool, time_remaining: u32) -> u32 {
        self.round_points(is_correct, time_remaining).total()
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self::new(BASE_CORRECT_POINTS, DEFAULT_SPEED_BONUS_TIERS.to_vec())
    }
}

/// Speed bonus under the default table.
pub fn speed_bonus(time_remaining: u32) -> u32 {
    ScoringRules::default().speed_bonus(time_remaining)
}

/// Round score under the default table.
pub fn round_score(is_correct: bool, time_remaining: u32) -> u32 {
    ScoringRules::default().round_score(is_correct, time_remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_table_matches_published_values() {
        assert_eq!(round_score(true, 12), 150);
        assert_eq!(round_score(true, 7), 125);
        assert_eq!(round_score(true, 3), 100);
        assert_eq!(round_score(false, 12), 0);
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(speed_bonus(11), 50);
        assert_eq!(speed_bonus(10), 25);
        assert_eq!(speed_bonus(6), 25);
        assert_eq!(speed_bonus(5), 0);
        assert_eq!(speed_bonus(0), 0);
    }

    #[test]
    fn tiers_are_sorted_on_construction() {
        let rules = ScoringRules::new(
            10,
            vec![
                SpeedBonusTier { above_secs: 2, points: 1 },
                SpeedBonusTier { above_secs: 8, points: 5 },
            ],
        );
        assert_eq!(rules.speed_bonus(9), 5);
        assert_eq!(rules.speed_bonus(3), 1);
        assert_eq!(rules.round_points(true, 9), RoundPoints { base: 10, speed_bonus: 5 });
    }

    proptest! {
        #[test]
        fn incorrect_answers_never_score(t in 0u32..=15) {
            prop_assert_eq!(round_score(false, t), 0);
        }

        #[test]
        fn more_time_never_scores_less(a in 0u32..=15, b in 0u32..=15) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(round_score(true, lo) <= round_score(true, hi));
        }
    }
}
