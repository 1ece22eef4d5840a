//! End-to-end session flows driven by a manual clock.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use truedose_core::{
    spawn_profile_sync, BestStreak, Clock, Database, EndReason, Event, ExplanationQuota, Fact,
    FactDeck, FactOrder, GameMode, InMemoryFacts, ManualClock, MemorySink, Phase, RoundOutcome,
    SessionEngine, SqliteProfileStore, SyncStatus,
};

fn fact(id: &str, correct: bool) -> Fact {
    Fact {
        id: id.to_string(),
        statement: format!("Statement for {id}"),
        correct,
        category: "Pharmacology".to_string(),
        explanation: format!("Why {id} is {correct}"),
        source: Some("Test source".to_string()),
    }
}

fn deck() -> FactDeck {
    let facts = InMemoryFacts::new(vec![fact("a", true), fact("b", false), fact("c", true)]).unwrap();
    FactDeck::new(Box::new(facts), FactOrder::Sequential, None).unwrap()
}

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap())
}

fn session(mode: GameMode) -> (SessionEngine, ManualClock, MemorySink) {
    let clock = clock();
    let sink = MemorySink::new();
    let engine = SessionEngine::builder(deck())
        .mode(mode)
        .clock(clock.clone())
        .results(sink.clone())
        .start()
        .unwrap();
    (engine, clock, sink)
}

#[test]
fn correct_answer_at_eleven_seconds_then_continue() {
    let (mut engine, clock, _) = session(GameMode::Classic);

    clock.advance_secs(4);
    let ticks = engine.pump();
    assert_eq!(ticks.len(), 4);
    assert_eq!(engine.state().time_remaining, 11);

    engine.submit_answer(true);
    let state = engine.state();
    assert_eq!(state.score, 150);
    assert_eq!(state.streak, 1);
    assert_eq!(state.phase, Phase::RoundResolved);
    assert_eq!(state.user_answer, Some(true));

    let started = engine.next_round().unwrap();
    assert!(matches!(started, Event::RoundStarted { round: 2, .. }));
    let state = engine.state();
    assert_eq!(state.fact.id, "b");
    assert_eq!(state.time_remaining, 15);
    assert_eq!(state.user_answer, None);
    assert_eq!(state.phase, Phase::Playing);
}

#[test]
fn scoring_follows_remaining_time() {
    let (mut engine, clock, _) = session(GameMode::Practice);

    // a: answered with 7s left
    clock.advance_secs(8);
    engine.pump();
    engine.submit_answer(true);
    assert_eq!(engine.state().last_points.total(), 125);

    // b: answered with 3s left
    engine.next_round();
    clock.advance_secs(12);
    engine.pump();
    engine.submit_answer(false);
    assert_eq!(engine.state().last_points.total(), 100);

    // c: answered wrong with time to spare
    engine.next_round();
    engine.submit_answer(false);
    assert_eq!(engine.state().last_points.total(), 0);
    assert_eq!(engine.state().score, 225);
}

#[test]
fn classic_wrong_answer_records_result_once() {
    let (mut engine, _, sink) = session(GameMode::Classic);

    engine.submit_answer(true);
    engine.next_round();
    let events = engine.submit_answer(true);

    assert_eq!(engine.phase(), Phase::GameOver);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::GameOver { sync: SyncStatus::Queued, .. })));

    assert!(engine.quit().is_none());
    assert!(engine.submit_answer(false).is_empty());
    assert!(engine.next_round().is_none());

    let results = sink.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].final_streak, 1);
    assert_eq!(results[0].final_score, 150);
    assert_eq!(results[0].rounds_played, 2);
    assert_eq!(results[0].end_reason, EndReason::WrongAnswer);
    assert_eq!(results[0].mode, GameMode::Classic);

    // The streak survives until restart.
    assert_eq!(engine.state().streak, 1);
    engine.restart().unwrap();
    assert_eq!(engine.state().streak, 0);
    assert_eq!(engine.state().score, 0);
    assert_eq!(engine.state().fact.id, "a");
    assert_eq!(engine.phase(), Phase::Playing);
    assert_eq!(sink.results().len(), 1);
}

#[test]
fn restarted_session_emits_its_own_result() {
    let (mut engine, _, sink) = session(GameMode::Classic);
    let first_id = engine.state().session_id;

    engine.quit().unwrap();
    engine.restart().unwrap();
    assert_ne!(engine.state().session_id, first_id);
    engine.quit().unwrap();

    let results = sink.results();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].session_id, first_id);
    assert_ne!(results[1].session_id, first_id);
}

#[test]
fn classic_timeout_ends_session() {
    let (mut engine, clock, sink) = session(GameMode::Classic);
    engine.submit_answer(true);
    engine.next_round();

    clock.advance_secs(15);
    let events = engine.pump();

    assert!(matches!(events.last(), Some(Event::GameOver { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::RoundTimedOut { correct_answer: false, .. })));
    assert_eq!(engine.state().time_remaining, 0);
    assert_eq!(engine.state().outcome, Some(RoundOutcome::TimedOut));
    assert_eq!(engine.state().user_answer, None);

    let results = sink.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].end_reason, EndReason::Timeout);
    assert_eq!(results[0].final_score, 150);
}

#[test]
fn practice_never_ends_on_misses() {
    let (mut engine, clock, sink) = session(GameMode::Practice);

    engine.submit_answer(true);
    engine.next_round();
    engine.submit_answer(true);
    assert_eq!(engine.phase(), Phase::RoundResolved);
    assert_eq!(engine.state().streak, 0);

    engine.next_round();
    clock.advance_secs(20);
    engine.pump();
    assert_eq!(engine.phase(), Phase::RoundResolved);
    assert_eq!(engine.state().outcome, Some(RoundOutcome::TimedOut));

    // Wraps back to the first fact.
    engine.next_round();
    assert_eq!(engine.state().fact.id, "a");
    assert_eq!(engine.state().round, 4);
    assert!(sink.results().is_empty());

    let event = engine.quit().unwrap();
    match event {
        Event::GameOver { result, .. } => {
            assert_eq!(result.mode, GameMode::Practice);
            assert_eq!(result.end_reason, EndReason::Quit);
            assert_eq!(result.final_score, 150);
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(sink.results().len(), 1);
}

#[test]
fn ticks_collected_before_cancel_are_dropped() {
    let (mut engine, clock, _) = session(GameMode::Classic);

    clock.advance_secs(3);
    let stale = engine.poll_ticks();
    assert_eq!(stale.len(), 3);

    engine.submit_answer(true);
    for tick in stale {
        assert!(engine.apply_tick(tick).is_empty());
    }
    assert_eq!(engine.state().time_remaining, 15);

    clock.advance_secs(30);
    assert!(engine.pump().is_empty());
}

#[test]
fn replayed_or_reordered_ticks_never_add_time() {
    let (mut engine, clock, _) = session(GameMode::Classic);

    clock.advance_secs(10);
    let mut ticks = engine.poll_ticks();
    assert_eq!(ticks.len(), 10);
    ticks.reverse();

    // Newest first: only the first tick lands, the older ones are behind it.
    let applied: usize = ticks.iter().map(|t| engine.apply_tick(*t).len()).sum();
    assert_eq!(applied, 1);
    assert_eq!(engine.state().time_remaining, 5);

    // Replaying the same tick changes nothing.
    assert!(engine.apply_tick(ticks[0]).is_empty());

    engine.submit_answer(true);
    assert_eq!(engine.state().score, 100);
}

#[test]
fn unconsumed_zero_tick_cannot_time_out_next_round() {
    let (mut engine, clock, sink) = session(GameMode::Classic);

    clock.advance_secs(15);
    let pending = engine.poll_ticks();
    assert_eq!(pending.last().map(|t| t.remaining_secs), Some(0));

    // The answer is processed before the zero tick.
    engine.submit_answer(true);
    engine.next_round();
    for tick in pending {
        assert!(engine.apply_tick(tick).is_empty());
    }
    assert_eq!(engine.phase(), Phase::Playing);
    assert_eq!(engine.state().time_remaining, 15);
    assert!(sink.results().is_empty());
}

#[test]
fn explanation_quota_across_rounds() {
    let (mut engine, _, _) = session(GameMode::Practice);

    for _ in 0..5 {
        engine.submit_answer(true);
        assert!(matches!(
            engine.reveal_explanation(),
            Some(Event::ExplanationRevealed { .. })
        ));
        engine.next_round();
    }
    engine.submit_answer(true);
    assert!(matches!(
        engine.reveal_explanation(),
        Some(Event::QuotaExhausted { daily_limit: 5, .. })
    ));

    engine.set_subscribed(true);
    match engine.reveal_explanation() {
        Some(Event::ExplanationRevealed {
            remaining_today,
            user_answer,
            ..
        }) => {
            assert_eq!(remaining_today, None);
            assert_eq!(user_answer, Some(true));
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(engine.quota().state().explanations_viewed_today, 5);
}

#[test]
fn quota_resets_on_next_local_day() {
    let clock = clock();
    let mut quota = ExplanationQuota::new(5);
    for _ in 0..5 {
        assert!(quota.record_reveal(clock.now()));
    }
    let mut engine = SessionEngine::builder(deck())
        .clock(clock.clone())
        .quota(quota)
        .start()
        .unwrap();

    engine.quit();
    assert!(matches!(
        engine.reveal_explanation(),
        Some(Event::QuotaExhausted { .. })
    ));

    clock.advance_secs(36 * 3600);
    assert!(matches!(
        engine.reveal_explanation(),
        Some(Event::ExplanationRevealed { remaining_today: Some(4), .. })
    ));
}

#[test]
fn reveal_after_game_over_explains_last_round() {
    let (mut engine, _, _) = session(GameMode::Classic);
    engine.submit_answer(false);
    assert_eq!(engine.phase(), Phase::GameOver);

    match engine.reveal_explanation() {
        Some(Event::ExplanationRevealed {
            fact_id,
            correct_answer,
            user_answer,
            source,
            ..
        }) => {
            assert_eq!(fact_id, "a");
            assert!(correct_answer);
            assert_eq!(user_answer, Some(false));
            assert_eq!(source.as_deref(), Some("Test source"));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn speed_bonus_preview_tracks_countdown() {
    let (mut engine, clock, _) = session(GameMode::Classic);
    assert_eq!(engine.speed_bonus_now(), 50);
    clock.advance_secs(5);
    engine.pump();
    assert_eq!(engine.speed_bonus_now(), 25);
    clock.advance_secs(5);
    engine.pump();
    assert_eq!(engine.speed_bonus_now(), 0);

    engine.submit_answer(true);
    assert_eq!(engine.speed_bonus_now(), 0);
    assert_eq!(engine.state().score, 100);
}

#[test]
fn empty_fact_set_cannot_start() {
    let empty = InMemoryFacts::new(Vec::new()).unwrap();
    let err = FactDeck::new(Box::new(empty), FactOrder::Sequential, None).unwrap_err();
    assert!(matches!(err, truedose_core::CoreError::NoContentAvailable));
}

#[tokio::test]
async fn results_reach_the_profile_store_in_the_background() {
    let store = Arc::new(SqliteProfileStore::new(Database::open_memory().unwrap()));
    let (sink, worker) = spawn_profile_sync(store.clone());

    let mut engine = SessionEngine::builder(deck())
        .clock(clock())
        .results(sink)
        .user(Some("user-1".to_string()))
        .start()
        .unwrap();

    engine.submit_answer(true);
    engine.next_round();
    engine.submit_answer(true);
    assert_eq!(engine.phase(), Phase::GameOver);
    drop(engine);

    let report = worker.await.unwrap();
    assert_eq!(report.delivered, 1);
    assert!(report.is_clean());
    assert_eq!(
        BestStreak::lookup(store.as_ref(), Some("user-1")),
        BestStreak::Known(1)
    );
    assert_eq!(BestStreak::lookup(store.as_ref(), None), BestStreak::Unknown);
}
