//! Bookmarked facts.
//!
//! The engine owns its bookmark store, so there is no ambient list shared
//! between sessions unless the caller injects a shared backing store.

use crate::error::{CoreError, DatabaseError};
use crate::storage::Database;

pub trait BookmarkStore: Send {
    fn is_bookmarked(&self, fact_id: &str) -> Result<bool, CoreError>;

    fn set_bookmarked(&mut self, fact_id: &str, bookmarked: bool) -> Result<(), CoreError>;

    fn list(&self) -> Result<Vec<String>, CoreError>;

    /// Flip the bookmark and return the new state.
    fn toggle(&mut self, fact_id: &str) -> Result<bool, CoreError> {
        let bookmarked = !self.is_bookmarked(fact_id)?;
        self.set_bookmarked(fact_id, bookmarked)?;
        Ok(bookmarked)
    }
}

/// Bookmarks that live as long as the engine.
#[derive(Debug, Clone, Default)]
pub struct MemoryBookmarks {
    ids: Vec<String>,
}

impl MemoryBookmarks {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BookmarkStore for MemoryBookmarks {
    fn is_bookmarked(&self, fact_id: &str) -> Result<bool, CoreError> {
        Ok(self.ids.iter().any(|id| id == fact_id))
    }

    fn set_bookmarked(&mut self, fact_id: &str, bookmarked: bool) -> Result<(), CoreError> {
        let present = self.ids.iter().any(|id| id == fact_id);
        match (bookmarked, present) {
            (true, false) => self.ids.push(fact_id.to_string()),
            (false, true) => self.ids.retain(|id| id != fact_id),
            _ => {}
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.ids.clone())
    }
}

impl BookmarkStore for Database {
    fn is_bookmarked(&self, fact_id: &str) -> Result<bool, CoreError> {
        Ok(Database::is_bookmarked(self, fact_id)?)
    }

    fn set_bookmarked(&mut self, fact_id: &str, bookmarked: bool) -> Result<(), CoreError> {
        let outcome: Result<(), DatabaseError> = if bookmarked {
            self.add_bookmark(fact_id)
        } else {
            self.remove_bookmark(fact_id)
        };
        Ok(outcome?)
    }

    fn list(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.bookmarks()?)
    }
}
