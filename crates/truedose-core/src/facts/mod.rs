//! Fact records and the read-only providers that supply them.

mod deck;

pub use deck::{FactDeck, FactOrder};

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

const BUNDLED_FACTS: &str = include_str!("../../data/facts.json");

/// A single true/false statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub id: String,
    pub statement: String,
    /// Ground truth for the statement.
    pub correct: bool,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// Read-only source of facts, addressed by position.
pub trait FactProvider: Send + Sync {
    fn fact_count(&self) -> usize;

    fn fact_at(&self, index: usize) -> Option<&Fact>;
}

/// Facts held in memory, in load order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFacts {
    facts: Vec<Fact>,
}

impl InMemoryFacts {
    /// Rejects duplicate ids.
    pub fn new(facts: Vec<Fact>) -> Result<Self, ContentError> {
        let mut seen = HashSet::new();
        for fact in &facts {
            if !seen.insert(fact.id.as_str()) {
                return Err(ContentError::DuplicateId(fact.id.clone()));
            }
        }
        Ok(Self { facts })
    }

    /// Load a JSON array of facts from disk.
    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let content = std::fs::read_to_string(path).map_err(|source| ContentError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let facts: Vec<Fact> =
            serde_json::from_str(&content).map_err(|source| ContentError::ParseFailed {
                path: path.to_path_buf(),
                source,
            })?;
        Self::new(facts)
    }

    /// The deck shipped with the crate, held to the same checks as a
    /// loaded file.
    pub fn bundled() -> Result<Self, ContentError> {
        let facts: Vec<Fact> =
            serde_json::from_str(BUNDLED_FACTS).map_err(ContentError::BundledMalformed)?;
        Self::new(facts)
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }
}

impl FactProvider for InMemoryFacts {
    fn fact_count(&self) -> usize {
        self.facts.len()
    }

    fn fact_at(&self, index: usize) -> Option<&Fact> {
        self.facts.get(index)
    }
}

#[cfg(test)]
pub(crate) fn sample_facts(n: usize) -> InMemoryFacts {
    let facts = (0..n)
        .map(|i| Fact {
            id: format!("fact-{i}"),
            statement: format!("Statement {i}"),
            correct: i % 2 == 0,
            category: "Test".into(),
            explanation: format!("Explanation {i}"),
            source: None,
        })
        .collect();
    InMemoryFacts { facts }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_deck_passes_the_loader_checks() {
        let bundled = InMemoryFacts::bundled().unwrap();
        assert!(bundled.fact_count() > 0);
        let ids: HashSet<&str> = bundled.facts().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids.len(), bundled.fact_count());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut facts = sample_facts(2).facts;
        facts[1].id = facts[0].id.clone();
        assert!(matches!(
            InMemoryFacts::new(facts),
            Err(ContentError::DuplicateId(id)) if id == "fact-0"
        ));
    }

    #[test]
    fn load_reads_json_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("facts.json");
        std::fs::write(
            &path,
            r#"[{"id": "a", "statement": "Water boils at 100C at sea level", "correct": true}]"#,
        )
        .unwrap();

        let provider = InMemoryFacts::load(&path).unwrap();
        assert_eq!(provider.fact_count(), 1);
        let fact = provider.fact_at(0).unwrap();
        assert!(fact.correct);
        assert_eq!(fact.source, None);
        assert!(provider.fact_at(1).is_none());
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("facts.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            InMemoryFacts::load(&path),
            Err(ContentError::ParseFailed { .. })
        ));
        assert!(matches!(
            InMemoryFacts::load(&dir.path().join("missing.json")),
            Err(ContentError::ReadFailed { .. })
        ));
    }
}
