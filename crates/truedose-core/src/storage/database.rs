//! SQLite-based storage.
//!
//! Provides persistent storage for:
//! - Finished session results and per-user best streaks
//! - Bookmarked facts
//! - Key-value store for application state (quota counters)

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{CoreError, DatabaseError};
use crate::profile::SessionResult;
use crate::quota::QuotaState;
use crate::session::GameMode;

const QUOTA_KEY: &str = "explanation_quota";

/// A session result as read back from storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResult {
    pub id: i64,
    pub session_id: String,
    pub mode: String,
    pub final_streak: u32,
    pub final_score: u32,
    pub rounds_played: u32,
    pub end_reason: String,
    pub user_id: Option<String>,
    pub ended_at: DateTime<Utc>,
}

/// SQLite database for results, profiles, bookmarks and app state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/truedose/truedose.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("truedose.db");
        Ok(Self::open_at(&path)?)
    }

    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS session_results (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id    TEXT NOT NULL UNIQUE,
                mode          TEXT NOT NULL,
                final_streak  INTEGER NOT NULL,
                final_score   INTEGER NOT NULL,
                rounds_played INTEGER NOT NULL,
                end_reason    TEXT NOT NULL,
                user_id       TEXT,
                ended_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS profiles (
                user_id        TEXT PRIMARY KEY,
                highest_streak INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS bookmarks (
                fact_id    TEXT PRIMARY KEY,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
    }

    // ── Results and profiles ─────────────────────────────────────────

    /// Store a finished session. Classic results from a signed-in user also
    /// raise that user's best streak. Re-recording the same session is a
    /// no-op.
    pub fn record_result(&self, result: &SessionResult) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO session_results
                (session_id, mode, final_streak, final_score, rounds_played, end_reason, user_id, ended_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                result.session_id.to_string(),
                result.mode.as_str(),
                result.final_streak,
                result.final_score,
                result.rounds_played,
                result.end_reason.as_str(),
                result.user_id,
                result.ended_at.to_rfc3339(),
            ],
        )?;

        if let (Some(user_id), GameMode::Classic) = (&result.user_id, result.mode) {
            self.conn.execute(
                "INSERT INTO profiles (user_id, highest_streak) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE
                 SET highest_streak = MAX(highest_streak, excluded.highest_streak)",
                params![user_id, result.final_streak],
            )?;
        }
        Ok(())
    }

    pub fn highest_streak(&self, user_id: &str) -> Result<Option<u32>, DatabaseError> {
        let streak = self
            .conn
            .query_row(
                "SELECT highest_streak FROM profiles WHERE user_id = ?1",
                params![user_id],
                |row| row.get::<_, u32>(0),
            )
            .optional()?;
        Ok(streak)
    }

    /// Most recent results first.
    pub fn recent_results(&self, limit: usize) -> Result<Vec<StoredResult>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, mode, final_streak, final_score, rounds_played,
                    end_reason, user_id, ended_at
             FROM session_results ORDER BY ended_at DESC, id DESC LIMIT ?1",
        )?;
        let mut rows = stmt.query(params![limit as i64])?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let session_id: String = row.get(1)?;
            let ended_at: String = row.get(8)?;
            let ended_at = DateTime::parse_from_rfc3339(&ended_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| DatabaseError::CorruptValue {
                    key: format!("session_results.ended_at ({session_id})"),
                    message: e.to_string(),
                })?;
            results.push(StoredResult {
                id: row.get(0)?,
                session_id,
                mode: row.get(2)?,
                final_streak: row.get(3)?,
                final_score: row.get(4)?,
                rounds_played: row.get(5)?,
                end_reason: row.get(6)?,
                user_id: row.get(7)?,
                ended_at,
            });
        }
        Ok(results)
    }

    // ── Bookmarks ────────────────────────────────────────────────────

    pub fn add_bookmark(&self, fact_id: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO bookmarks (fact_id, created_at) VALUES (?1, ?2)",
            params![fact_id, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn remove_bookmark(&self, fact_id: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM bookmarks WHERE fact_id = ?1", params![fact_id])?;
        Ok(())
    }

    pub fn is_bookmarked(&self, fact_id: &str) -> Result<bool, DatabaseError> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM bookmarks WHERE fact_id = ?1",
                params![fact_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Bookmarked fact ids in the order they were added.
    pub fn bookmarks(&self) -> Result<Vec<String>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT fact_id FROM bookmarks ORDER BY created_at, rowid")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // ── Quota ────────────────────────────────────────────────────────

    pub fn load_quota(&self) -> Result<QuotaState, DatabaseError> {
        match self.kv_get(QUOTA_KEY)? {
            Some(json) => serde_json::from_str(&json).map_err(|e| DatabaseError::CorruptValue {
                key: QUOTA_KEY.into(),
                message: e.to_string(),
            }),
            None => Ok(QuotaState::default()),
        }
    }

    pub fn save_quota(&self, state: &QuotaState) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(state).map_err(|e| DatabaseError::CorruptValue {
            key: QUOTA_KEY.into(),
            message: e.to_string(),
        })?;
        self.kv_set(QUOTA_KEY, &json)
    }

    // ── Key-value ────────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}
