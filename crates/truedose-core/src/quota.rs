//! Daily explanation quota.
//!
//! Free users may reveal a limited number of explanations per local calendar
//! day; subscribers are unlimited. There is no midnight job: the counter is
//! rolled over lazily by the first access that lands on a new day.
//!
//! If the clock moves backwards across a day boundary the stored day is
//! kept and the counter is left alone, so skew can cost a free reveal but
//! never grant a fresh allowance.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::config::DAILY_EXPLANATION_LIMIT;

/// Persisted quota counters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuotaState {
    pub explanations_viewed_today: u32,
    pub is_subscribed: bool,
    /// Local date the counter belongs to. `None` until first access.
    #[serde(default)]
    pub day: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct ExplanationQuota {
    state: QuotaState,
    daily_limit: u32,
}

impl ExplanationQuota {
    pub fn new(daily_limit: u32) -> Self {
        Self::from_state(QuotaState::default(), daily_limit)
    }

    pub fn from_state(state: QuotaState, daily_limit: u32) -> Self {
        Self { state, daily_limit }
    }

    pub fn state(&self) -> &QuotaState {
        &self.state
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    pub fn is_subscribed(&self) -> bool {
        self.state.is_subscribed
    }

    pub fn set_subscribed(&mut self, subscribed: bool) {
        if self.state.is_subscribed != subscribed {
            tracing::info!(subscribed, "subscription changed");
        }
        self.state.is_subscribed = subscribed;
    }

    pub fn can_reveal(&mut self, now: DateTime<Utc>) -> bool {
        self.roll_day(now);
        self.state.is_subscribed || self.state.explanations_viewed_today < self.daily_limit
    }

    /// Count one reveal. Returns `false` (and changes nothing) when the
    /// quota is already used up. Subscriber reveals are not counted.
    pub fn record_reveal(&mut self, now: DateTime<Utc>) -> bool {
        if !self.can_reveal(now) {
            return false;
        }
        if !self.state.is_subscribed {
            self.state.explanations_viewed_today += 1;
        }
        true
    }

    /// Free reveals left today; `None` for subscribers.
    pub fn remaining_today(&mut self, now: DateTime<Utc>) -> Option<u32> {
        self.roll_day(now);
        if self.state.is_subscribed {
            return None;
        }
        Some(
            self.daily_limit
                .saturating_sub(self.state.explanations_viewed_today),
        )
    }

    fn roll_day(&mut self, now: DateTime<Utc>) {
        let today = now.with_timezone(&Local).date_naive();
        match self.state.day {
            Some(day) if day == today => {}
            Some(day) if today < day => {
                tracing::warn!(%day, %today, "clock moved backwards; keeping quota day");
            }
            _ => {
                self.state.day = Some(today);
                self.state.explanations_viewed_today = 0;
            }
        }
    }
}

impl Default for ExplanationQuota {
    fn default() -> Self {
        Self::new(DAILY_EXPLANATION_LIMIT)
    }
}
