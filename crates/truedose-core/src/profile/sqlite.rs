//! Local profile store backed by the application database.

use std::sync::Mutex;

use super::{ProfileSync, SessionResult};
use crate::error::SyncError;
use crate::storage::Database;

pub struct SqliteProfileStore {
    db: Mutex<Database>,
}

impl SqliteProfileStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }
}

impl ProfileSync for SqliteProfileStore {
    fn record_result(&self, result: &SessionResult) -> Result<(), SyncError> {
        let db = self
            .db
            .lock()
            .map_err(|e| SyncError::Store(e.to_string()))?;
        Ok(db.record_result(result)?)
    }

    fn highest_streak(&self, user_id: Option<&str>) -> Result<Option<u32>, SyncError> {
        let Some(user_id) = user_id else {
            return Ok(None);
        };
        let db = self
            .db
            .lock()
            .map_err(|e| SyncError::Store(e.to_string()))?;
        Ok(db.highest_streak(user_id)?)
    }
}
