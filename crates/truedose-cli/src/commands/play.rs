//! Interactive session.
//!
//! Reads one command per line from stdin and prints every engine event as
//! a JSON line on stdout. The countdown is pumped on a short interval; the
//! engine itself decides when a whole second has passed.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use truedose_core::{
    spawn_profile_sync, BestStreak, Config, Database, Event, ExplanationQuota, FactDeck, FactOrder,
    GameMode, GameOverSummary, InMemoryFacts, Phase, SessionEngine, SqliteProfileStore,
};

const HELP: &str =
    "t/f answer | n next | e explain | b bookmark | p pause/resume | s status | r restart | q quit";

const PUMP_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Args)]
pub struct PlayArgs {
    /// Practice mode: misses never end the session
    #[arg(long)]
    practice: bool,
    /// JSON fact file to play instead of the bundled deck
    #[arg(long)]
    facts: Option<PathBuf>,
    /// Shuffle the facts
    #[arg(long)]
    shuffle: bool,
    /// Seed for the shuffled order
    #[arg(long)]
    seed: Option<u64>,
    /// Signed-in user id the result is recorded for
    #[arg(long)]
    user: Option<String>,
}

pub fn run(args: PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(play(args))
}

fn emit<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

async fn play(args: PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    let facts_path = args
        .facts
        .or_else(|| config.content.facts_path.as_ref().map(PathBuf::from));
    let facts = match facts_path {
        Some(path) => InMemoryFacts::load(&path)?,
        None => InMemoryFacts::bundled()?,
    };
    let order = if args.shuffle {
        FactOrder::Shuffled
    } else {
        config.content.order
    };
    let deck = FactDeck::new(Box::new(facts), order, args.seed.or(config.content.seed))?;

    let state_db = Database::open()?;
    let quota = ExplanationQuota::from_state(
        state_db.load_quota()?,
        config.quota.daily_explanation_limit,
    );

    let store = Arc::new(SqliteProfileStore::new(Database::open()?));
    let (sink, worker) = spawn_profile_sync(store.clone());

    let mode = if args.practice {
        GameMode::Practice
    } else {
        GameMode::Classic
    };
    let mut engine = SessionEngine::builder(deck)
        .mode(mode)
        .config(&config)
        .quota(quota)
        .results(sink)
        .bookmarks(Database::open()?)
        .user(args.user.clone())
        .start()?;

    eprintln!("{HELP}");
    emit(&engine.snapshot())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(PUMP_INTERVAL);

    loop {
        let events = tokio::select! {
            _ = ticker.tick() => engine.pump(),
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed: end the session and leave.
                    for event in engine.quit() {
                        emit(&event)?;
                    }
                    break;
                };
                let events: Vec<Event> = match line.trim() {
                    "t" | "true" => engine.submit_answer(true),
                    "f" | "false" => engine.submit_answer(false),
                    "n" | "next" => engine.next_round().into_iter().collect(),
                    "e" | "explain" => engine.reveal_explanation().into_iter().collect(),
                    "b" | "bookmark" => match engine.toggle_bookmark() {
                        Ok(event) => vec![event],
                        Err(e) => {
                            eprintln!("warning: bookmark not saved: {e}");
                            Vec::new()
                        }
                    },
                    "p" | "pause" if engine.state().paused => engine.resume().into_iter().collect(),
                    "p" | "pause" => engine.pause().into_iter().collect(),
                    "s" | "status" => vec![engine.snapshot()],
                    "r" | "restart" => engine.restart().into_iter().collect(),
                    "q" | "quit" if engine.phase() == Phase::GameOver => break,
                    "q" | "quit" => engine.quit().into_iter().collect(),
                    "" => Vec::new(),
                    other => {
                        eprintln!("unknown command: {other} ({HELP})");
                        Vec::new()
                    }
                };
                state_db.save_quota(engine.quota().state())?;
                events
            }
        };

        for event in events {
            emit(&event)?;
            if let Event::GameOver { result, .. } = &event {
                let best = BestStreak::lookup(store.as_ref(), args.user.as_deref());
                emit(&GameOverSummary::new(result, best))?;
            }
        }
    }

    state_db.save_quota(engine.quota().state())?;
    drop(engine);

    let report = worker.await?;
    if report.is_clean() {
        tracing::info!(delivered = report.delivered, "session results saved");
    } else {
        for (session_id, err) in &report.failed {
            eprintln!("warning: result for session {session_id} was not saved: {err}");
        }
    }
    Ok(())
}
