//! Ordering policy over a fact provider.
//!
//! The deck makes a finite provider look infinite. `Sequential` walks the
//! provider in order and wraps to the start. `Shuffled` walks a seeded
//! permutation and draws a new one each time it runs out, never opening a
//! new pass with the fact that closed the previous one.

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use super::{Fact, FactProvider};
use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactOrder {
    #[default]
    Sequential,
    Shuffled,
}

pub struct FactDeck {
    provider: Box<dyn FactProvider>,
    order: FactOrder,
    rng: Mcg128Xsl64,
    /// Provider indices in presentation order for the current pass.
    sequence: Vec<usize>,
    cursor: usize,
    passes: u32,
}

impl FactDeck {
    /// # Errors
    /// Returns [`CoreError::NoContentAvailable`] if the provider is empty.
    pub fn new(provider: Box<dyn FactProvider>, order: FactOrder, seed: Option<u64>) -> Result<Self> {
        if provider.fact_count() == 0 {
            return Err(CoreError::NoContentAvailable);
        }
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        let mut deck = Self {
            provider,
            order,
            rng,
            sequence: Vec::new(),
            cursor: 0,
            passes: 0,
        };
        deck.reset();
        Ok(deck)
    }

    pub fn order(&self) -> FactOrder {
        self.order
    }

    pub fn len(&self) -> usize {
        self.provider.fact_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Completed passes over the whole deck.
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Provider index of the fact on show.
    pub fn current_index(&self) -> usize {
        self.sequence[self.cursor]
    }

    pub fn current(&self) -> Result<&Fact> {
        self.provider
            .fact_at(self.current_index())
            .ok_or(CoreError::NoContentAvailable)
    }

    /// Move to the next fact, wrapping or reshuffling at the end of a pass.
    pub fn advance(&mut self) -> Result<&Fact> {
        self.cursor += 1;
        if self.cursor >= self.sequence.len() {
            let last = self.sequence.last().copied();
            self.passes += 1;
            self.cursor = 0;
            self.build_sequence();
            if let Some(last) = last {
                self.avoid_immediate_repeat(last);
            }
        }
        self.current()
    }

    /// Back to the policy's starting point.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.passes = 0;
        self.build_sequence();
    }

    fn build_sequence(&mut self) {
        self.sequence = (0..self.provider.fact_count()).collect();
        if self.order == FactOrder::Shuffled {
            self.sequence.shuffle(&mut self.rng);
        }
    }

    fn avoid_immediate_repeat(&mut self, last: usize) {
        let n = self.sequence.len();
        if self.order == FactOrder::Shuffled && n > 1 && self.sequence[0] == last {
            let swap_with = self.rng.gen_range(1..n);
            self.sequence.swap(0, swap_with);
        }
    }
}

impl std::fmt::Debug for FactDeck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactDeck")
            .field("order", &self.order)
            .field("len", &self.len())
            .field("cursor", &self.cursor)
            .field("passes", &self.passes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{sample_facts, InMemoryFacts};
    use std::collections::HashSet;

    fn deck(n: usize, order: FactOrder) -> FactDeck {
        FactDeck::new(Box::new(sample_facts(n)), order, Some(7)).unwrap()
    }

    #[test]
    fn empty_provider_is_no_content() {
        let result = FactDeck::new(Box::new(InMemoryFacts::default()), FactOrder::Sequential, None);
        assert!(matches!(result, Err(CoreError::NoContentAvailable)));
    }

    #[test]
    fn sequential_wraps_to_start() {
        let mut deck = deck(3, FactOrder::Sequential);
        assert_eq!(deck.current().unwrap().id, "fact-0");
        assert_eq!(deck.advance().unwrap().id, "fact-1");
        assert_eq!(deck.advance().unwrap().id, "fact-2");
        assert_eq!(deck.advance().unwrap().id, "fact-0");
        assert_eq!(deck.passes(), 1);
    }

    #[test]
    fn shuffled_pass_visits_every_fact_once() {
        let mut deck = deck(10, FactOrder::Shuffled);
        let mut seen = HashSet::new();
        seen.insert(deck.current_index());
        for _ in 0..9 {
            deck.advance().unwrap();
            seen.insert(deck.current_index());
        }
        assert_eq!(seen.len(), 10);
        assert_eq!(deck.passes(), 0);
    }

    #[test]
    fn reshuffle_never_repeats_across_pass_boundary() {
        let mut deck = deck(2, FactOrder::Shuffled);
        let mut previous = deck.current_index();
        for _ in 0..50 {
            deck.advance().unwrap();
            assert_ne!(deck.current_index(), previous);
            previous = deck.current_index();
        }
    }

    #[test]
    fn single_fact_deck_repeats() {
        let mut deck = deck(1, FactOrder::Shuffled);
        assert_eq!(deck.advance().unwrap().id, "fact-0");
        assert_eq!(deck.advance().unwrap().id, "fact-0");
    }

    #[test]
    fn same_seed_same_order() {
        let mut a = deck(8, FactOrder::Shuffled);
        let mut b = deck(8, FactOrder::Shuffled);
        for _ in 0..20 {
            assert_eq!(a.current_index(), b.current_index());
            a.advance().unwrap();
            b.advance().unwrap();
        }
    }

    #[test]
    fn reset_returns_sequential_deck_to_first_fact() {
        let mut deck = deck(4, FactOrder::Sequential);
        deck.advance().unwrap();
        deck.advance().unwrap();
        deck.reset();
        assert_eq!(deck.current_index(), 0);
        assert_eq!(deck.passes(), 0);
    }
}
