//! Direct-mapped transposition table.
//!
//! One slot per index, no chaining, always-replace. At shallow search
//! depths the simplicity beats smarter replacement schemes; the policy is a
//! documented extension point.

use crate::eval::Score;
use crate::turn::Turn;

/// How a stored score relates to the true score of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The stored score is the real negamax value.
    Exact,
    /// A cutoff occurred; the real value is at least the stored score.
    Lower,
    /// The full window was never reached; the real value is at most the
    /// stored score.
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranspositionEntry {
    pub hash: u64,
    pub turn: Turn,
    pub score: Score,
    /// Plies of search below the position this entry summarizes.
    pub depth: usize,
    pub bound: Bound,
}

pub struct TranspositionTable {
    entries: Vec<Option<TranspositionEntry>>,
}

impl TranspositionTable {
    pub const DEFAULT_SLOTS: usize = 1 << 20;

    pub fn new() -> TranspositionTable {
        TranspositionTable::with_slots(Self::DEFAULT_SLOTS)
    }

    pub fn with_slots(slots: usize) -> TranspositionTable {
        TranspositionTable {
            entries: vec![None; slots.max(1)],
        }
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash % self.entries.len() as u64) as usize
    }

    /// Entry stored for the hash, or `None` when the slot holds a
    /// different position.
    pub fn lookup(&self, hash: u64) -> Option<&TranspositionEntry> {
        self.entries[self.index(hash)]
            .as_ref()
            .filter(|entry| entry.hash == hash)
    }

    /// Stores the entry, replacing whatever occupied its slot.
    pub fn maybe_store(&mut self, entry: TranspositionEntry) {
        let index = self.index(entry.hash);
        self.entries[index] = Some(entry);
    }

    /// Drops every entry; a cleared table makes a fresh search
    /// deterministic again.
    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            *entry = None;
        }
    }

    pub fn slots(&self) -> usize {
        self.entries.len()
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        TranspositionTable::new()
    }
}
