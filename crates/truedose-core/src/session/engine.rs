//! Session engine.
//!
//! Owns the single countdown, the fact deck, the quota tracker and the
//! result handoff, and applies the round rules to [`SessionState`]. Like the
//! countdown it has no thread of its own: the caller feeds it answers and
//! calls [`SessionEngine::pump`] periodically, one event at a time.
//!
//! ## State Transitions
//!
//! ```text
//! Playing --answer ok--------------------> RoundResolved --next_round--> Playing
//! Playing --miss/timeout (practice)------> RoundResolved
//! Playing --miss/timeout (classic)-------> GameOver --restart--> Playing
//! (any) ---quit--------------------------> GameOver
//! ```
//!
//! Methods called in the wrong phase are no-ops and return nothing.

use super::state::{GameMode, Phase, RoundOutcome, SessionState};
use crate::bookmarks::{BookmarkStore, MemoryBookmarks};
use crate::error::{Result, SyncError};
use crate::events::{Event, SyncStatus};
use crate::facts::{Fact, FactDeck};
use crate::profile::{EndReason, MemorySink, ResultSink, SessionResult};
use crate::quota::ExplanationQuota;
use crate::scoring::ScoringRules;
use crate::storage::Config;
use crate::timer::{Clock, Countdown, SystemClock, Tick};

/// Collaborators and settings for a new session.
pub struct SessionBuilder {
    deck: FactDeck,
    mode: GameMode,
    config: Config,
    clock: Box<dyn Clock>,
    quota: ExplanationQuota,
    results: Box<dyn ResultSink>,
    bookmarks: Box<dyn BookmarkStore>,
    user_id: Option<String>,
}

impl SessionBuilder {
    pub fn mode(mut self, mode: GameMode) -> Self {
        self.mode = mode;
        self
    }

    /// Round length, scoring table and daily limit from `config`.
    /// Checked by [`SessionBuilder::start`].
    pub fn config(mut self, config: &Config) -> Self {
        self.quota = ExplanationQuota::from_state(
            self.quota.state().clone(),
            config.quota.daily_explanation_limit,
        );
        self.config = config.clone();
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn quota(mut self, quota: ExplanationQuota) -> Self {
        self.quota = quota;
        self
    }

    pub fn results(mut self, sink: impl ResultSink + 'static) -> Self {
        self.results = Box::new(sink);
        self
    }

    pub fn bookmarks(mut self, store: impl BookmarkStore + 'static) -> Self {
        self.bookmarks = Box::new(store);
        self
    }

    /// Signed-in user the result is attributed to.
    pub fn user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    /// Open the first round and start its countdown.
    ///
    /// # Errors
    /// Returns [`crate::CoreError::Config`] if the configuration describes
    /// an unplayable round, and [`crate::CoreError::NoContentAvailable`] if
    /// the deck cannot produce a fact.
    pub fn start(self) -> Result<SessionEngine> {
        self.config.validate()?;
        let round_seconds = self.config.round.round_seconds;
        let fact = self.deck.current()?.clone();
        let state = SessionState::new(self.mode, self.deck.current_index(), fact, round_seconds);

        let mut engine = SessionEngine {
            deck: self.deck,
            round_seconds,
            scoring: self.config.scoring_rules(),
            clock: self.clock,
            countdown: Countdown::new(),
            quota: self.quota,
            results: self.results,
            bookmarks: self.bookmarks,
            user_id: self.user_id,
            state,
            result_emitted: false,
            revealed_this_round: false,
            rounds_played: 0,
            last_result: None,
            last_sync_error: None,
        };
        let now = engine.clock.now();
        engine.countdown.start(engine.round_seconds, now);
        tracing::info!(
            session_id = %engine.state.session_id,
            mode = engine.state.mode.as_str(),
            "session started"
        );
        Ok(engine)
    }
}

pub struct SessionEngine {
    deck: FactDeck,
    round_seconds: u32,
    scoring: ScoringRules,
    clock: Box<dyn Clock>,
    /// The only countdown this session ever runs.
    countdown: Countdown,
    quota: ExplanationQuota,
    results: Box<dyn ResultSink>,
    bookmarks: Box<dyn BookmarkStore>,
    user_id: Option<String>,
    state: SessionState,
    result_emitted: bool,
    revealed_this_round: bool,
    rounds_played: u32,
    last_result: Option<SessionResult>,
    last_sync_error: Option<SyncError>,
}

impl SessionEngine {
    /// Defaults: classic mode, system clock, in-memory sink and bookmarks.
    pub fn builder(deck: FactDeck) -> SessionBuilder {
        SessionBuilder {
            deck,
            mode: GameMode::Classic,
            config: Config::default(),
            clock: Box::new(SystemClock),
            quota: ExplanationQuota::default(),
            results: Box::new(MemorySink::new()),
            bookmarks: Box::new(MemoryBookmarks::new()),
            user_id: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn mode(&self) -> GameMode {
        self.state.mode
    }

    pub fn current_fact(&self) -> &Fact {
        &self.state.fact
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn quota(&self) -> &ExplanationQuota {
        &self.quota
    }

    pub fn round_seconds(&self) -> u32 {
        self.round_seconds
    }

    /// The result handed off at game over, kept even if the handoff failed.
    pub fn last_result(&self) -> Option<&SessionResult> {
        self.last_result.as_ref()
    }

    pub fn last_sync_error(&self) -> Option<&SyncError> {
        self.last_sync_error.as_ref()
    }

    /// Bonus a correct answer would earn right now.
    pub fn speed_bonus_now(&self) -> u32 {
        if self.state.is_open() {
            self.scoring.speed_bonus(self.state.time_remaining)
        } else {
            0
        }
    }

    pub fn is_bookmarked(&self) -> Result<bool> {
        self.bookmarks.is_bookmarked(&self.state.fact.id)
    }

    pub fn bookmarks(&self) -> Result<Vec<String>> {
        self.bookmarks.list()
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state.clone(),
            speed_bonus: self.speed_bonus_now(),
            at: self.clock.now(),
        }
    }

    // ── Timer ────────────────────────────────────────────────────────

    /// Collect ticks that are due without applying them.
    pub fn poll_ticks(&mut self) -> Vec<Tick> {
        let now = self.clock.now();
        self.countdown.poll(now)
    }

    /// Apply one tick. Stale ticks, replayed or out-of-order ticks and
    /// ticks outside an open round are dropped; remaining time only goes
    /// down.
    pub fn apply_tick(&mut self, tick: Tick) -> Vec<Event> {
        if !self.state.is_open()
            || self.state.paused
            || !self.countdown.is_live(&tick)
            || tick.remaining_secs >= self.state.time_remaining
        {
            tracing::debug!(
                generation = tick.generation,
                live = self.countdown.generation(),
                phase = ?self.state.phase,
                "ignoring tick"
            );
            return Vec::new();
        }

        self.state.time_remaining = tick.remaining_secs;
        let mut events = vec![Event::TimerTick {
            time_remaining: self.state.time_remaining,
            at: self.clock.now(),
        }];
        if self.state.time_remaining == 0 {
            events.extend(self.time_out());
        }
        events
    }

    /// Poll and apply every due tick.
    pub fn pump(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        for tick in self.poll_ticks() {
            events.extend(self.apply_tick(tick));
        }
        events
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Accept the player's answer for the open round. Only the first answer
    /// counts.
    pub fn submit_answer(&mut self, answer: bool) -> Vec<Event> {
        if !self.state.is_open() || self.state.paused {
            tracing::debug!(phase = ?self.state.phase, "ignoring answer");
            return Vec::new();
        }

        self.countdown.cancel();
        self.rounds_played += 1;
        self.state.user_answer = Some(answer);

        let correct = answer == self.state.fact.correct;
        let points = self.scoring.round_points(correct, self.state.time_remaining);
        self.state.last_points = points;
        if correct {
            self.state.score += points.total();
            self.state.streak += 1;
            self.state.outcome = Some(RoundOutcome::Correct);
        } else {
            self.state.outcome = Some(RoundOutcome::Incorrect);
        }
        tracing::info!(
            fact_id = %self.state.fact.id,
            correct,
            time_remaining = self.state.time_remaining,
            "answer accepted"
        );

        // Resolve first so the event carries the post-miss streak.
        let game_over = if correct {
            self.state.phase = Phase::RoundResolved;
            None
        } else {
            self.miss(EndReason::WrongAnswer)
        };

        let mut events = vec![Event::AnswerAccepted {
            fact_id: self.state.fact.id.clone(),
            answer,
            correct,
            points,
            streak: self.state.streak,
            score: self.state.score,
            at: self.clock.now(),
        }];
        events.extend(game_over);
        events
    }

    /// Move from a resolved round to the next fact.
    pub fn next_round(&mut self) -> Option<Event> {
        if self.state.phase != Phase::RoundResolved {
            return None;
        }
        let fact = match self.deck.advance() {
            Ok(fact) => fact.clone(),
            Err(e) => {
                tracing::error!(error = %e, "cannot advance deck");
                return None;
            }
        };
        Some(self.open_round(fact))
    }

    /// Start a fresh session after game over.
    pub fn restart(&mut self) -> Option<Event> {
        if self.state.phase != Phase::GameOver {
            return None;
        }
        self.deck.reset();
        let fact = match self.deck.current() {
            Ok(fact) => fact.clone(),
            Err(e) => {
                tracing::error!(error = %e, "cannot restart without content");
                return None;
            }
        };

        self.state = SessionState::new(
            self.state.mode,
            self.deck.current_index(),
            fact,
            self.round_seconds,
        );
        self.result_emitted = false;
        self.revealed_this_round = false;
        self.rounds_played = 0;
        self.countdown.reset(self.round_seconds, self.clock.now());
        tracing::info!(session_id = %self.state.session_id, "session restarted");
        Some(self.round_started())
    }

    /// End the session now, from any phase.
    pub fn quit(&mut self) -> Option<Event> {
        if self.state.phase == Phase::GameOver {
            return None;
        }
        self.enter_game_over(EndReason::Quit)
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.is_open() || self.state.paused {
            return None;
        }
        self.countdown.pause(self.clock.now());
        self.state.paused = true;
        Some(Event::TimerPaused {
            time_remaining: self.state.time_remaining,
            at: self.clock.now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if !self.state.is_open() || !self.state.paused {
            return None;
        }
        self.countdown.resume(self.clock.now());
        self.state.paused = false;
        Some(Event::TimerResumed {
            time_remaining: self.state.time_remaining,
            at: self.clock.now(),
        })
    }

    pub fn set_subscribed(&mut self, subscribed: bool) {
        self.quota.set_subscribed(subscribed);
    }

    /// Reveal the explanation for the round just played.
    ///
    /// Allowed once the round is resolved, including after game over. A
    /// round counts against the daily quota at most once, however many
    /// times it is revealed.
    pub fn reveal_explanation(&mut self) -> Option<Event> {
        if self.state.phase == Phase::Playing {
            return None;
        }
        let now = self.clock.now();
        let fact = &self.state.fact;

        if !self.revealed_this_round {
            if !self.quota.can_reveal(now) {
                return Some(Event::QuotaExhausted {
                    fact_id: fact.id.clone(),
                    daily_limit: self.quota.daily_limit(),
                    at: self.clock.now(),
                });
            }
            self.quota.record_reveal(now);
            self.revealed_this_round = true;
        }

        Some(Event::ExplanationRevealed {
            fact_id: fact.id.clone(),
            explanation: fact.explanation.clone(),
            source: fact.source.clone(),
            correct_answer: fact.correct,
            user_answer: self.state.user_answer,
            remaining_today: self.quota.remaining_today(now),
            at: self.clock.now(),
        })
    }

    pub fn toggle_bookmark(&mut self) -> Result<Event> {
        let fact_id = self.state.fact.id.clone();
        let bookmarked = self.bookmarks.toggle(&fact_id)?;
        Ok(Event::BookmarkToggled {
            fact_id,
            bookmarked,
            at: self.clock.now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn time_out(&mut self) -> Vec<Event> {
        self.countdown.cancel();
        self.rounds_played += 1;
        self.state.outcome = Some(RoundOutcome::TimedOut);
        self.state.last_points = Default::default();
        tracing::info!(fact_id = %self.state.fact.id, "round timed out");

        let mut events = vec![Event::RoundTimedOut {
            fact_id: self.state.fact.id.clone(),
            correct_answer: self.state.fact.correct,
            at: self.clock.now(),
        }];
        events.extend(self.miss(EndReason::Timeout));
        events
    }

    /// Wrong answer or timeout: classic ends, practice breaks the streak.
    fn miss(&mut self, reason: EndReason) -> Option<Event> {
        match self.state.mode {
            GameMode::Classic => self.enter_game_over(reason),
            GameMode::Practice => {
                self.state.streak = 0;
                self.state.phase = Phase::RoundResolved;
                None
            }
        }
    }

    fn open_round(&mut self, fact: Fact) -> Event {
        self.state
            .begin_round(self.deck.current_index(), fact, self.round_seconds);
        self.revealed_this_round = false;
        self.countdown.reset(self.round_seconds, self.clock.now());
        self.round_started()
    }

    fn round_started(&self) -> Event {
        Event::RoundStarted {
            round: self.state.round,
            fact_id: self.state.fact.id.clone(),
            statement: self.state.fact.statement.clone(),
            category: self.state.fact.category.clone(),
            time_remaining: self.state.time_remaining,
            at: self.clock.now(),
        }
    }

    fn enter_game_over(&mut self, reason: EndReason) -> Option<Event> {
        self.countdown.cancel();
        self.state.phase = Phase::GameOver;
        self.state.paused = false;
        if self.result_emitted {
            return None;
        }
        self.result_emitted = true;

        let result = SessionResult {
            session_id: self.state.session_id,
            mode: self.state.mode,
            final_streak: self.state.streak,
            final_score: self.state.score,
            rounds_played: self.rounds_played,
            end_reason: reason,
            user_id: self.user_id.clone(),
            ended_at: self.clock.now(),
        };
        tracing::info!(
            session_id = %result.session_id,
            streak = result.final_streak,
            score = result.final_score,
            reason = reason.as_str(),
            "game over"
        );

        let sync = match self.results.submit(result.clone()) {
            Ok(()) => {
                self.last_sync_error = None;
                SyncStatus::Queued
            }
            Err(e) => {
                tracing::warn!(error = %e, "session result not queued; keeping it locally");
                let status = SyncStatus::Failed {
                    reason: e.to_string(),
                };
                self.last_sync_error = Some(e);
                status
            }
        };
        self.last_result = Some(result.clone());

        Some(Event::GameOver {
            result,
            sync,
            at: self.clock.now(),
        })
    }
}

impl std::fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine")
            .field("state", &self.state)
            .field("countdown", &self.countdown)
            .field("deck", &self.deck)
            .finish()
    }
}
