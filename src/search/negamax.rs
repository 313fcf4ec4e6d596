//! Negamax search with alpha-beta pruning, move ordering and
//! transposition-table lookups.
//!
//! The search never mutates the caller's state: every candidate move is
//! applied to a value copy. Alpha-beta pruning, move ordering and table use
//! are three independent toggles; disabling any of them changes performance
//! only, never the score of the chosen line.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::table::{Bound, TranspositionEntry, TranspositionTable};
use crate::eval::{Score, MAX_SCORE, MIN_SCORE, WIN_SCORE_THRESHOLD};
use crate::game::GameState;
use crate::turn::Turn;

/// Outcome of a search: the achievable score and the turn leading towards
/// it. The turn is absent for terminal positions and aborted searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub score: Score,
    pub turn: Option<Turn>,
}

impl SearchResult {
    fn negated(self) -> SearchResult {
        SearchResult {
            score: -self.score,
            turn: self.turn,
        }
    }

    /// True if the search proved a forced win.
    pub fn is_victory_certain(&self) -> bool {
        self.score > WIN_SCORE_THRESHOLD
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.turn {
            Some(turn) => write!(f, "Result(score={}, turn={})", self.score, turn),
            None => write!(f, "Result(score={}, turn=None)", self.score),
        }
    }
}

/// Performance counters of the last search.
#[derive(Debug, Clone, Default)]
pub struct PerfCounters {
    /// Nodes visited.
    pub nodes: u64,
    /// Branches cut off by alpha-beta.
    pub cutoffs: u64,
    /// Best-result updates.
    pub updates: u64,
    /// Transposition-table hits deep enough to use.
    pub table_hits: u64,
    /// Wall-clock time of the search.
    pub duration: Duration,
}

impl fmt::Display for PerfCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.duration.as_millis().max(1) as u64;
        writeln!(f, "search took:     {}ms", self.duration.as_millis())?;
        writeln!(
            f,
            "nodes visited:   {} (~{} nodes/ms)",
            self.nodes,
            self.nodes / ms
        )?;
        writeln!(f, "no. of cutoffs:  {}", self.cutoffs)?;
        writeln!(f, "result updates:  {}", self.updates)?;
        write!(f, "table hits:      {}", self.table_hits)
    }
}

/// Shared cancellation flag. Clone it out of the search and flip it from
/// any thread; the search observes it within one recursion step.
#[derive(Debug, Clone)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

pub struct Negamax {
    table: TranspositionTable,
    abort: Arc<AtomicBool>,
    counters: PerfCounters,
    pruning_enabled: bool,
    ordering_enabled: bool,
    table_enabled: bool,
}

impl Negamax {
    /// Search instance with all features enabled.
    pub fn new() -> Negamax {
        Negamax::with_features(true, true, true)
    }

    /// Search instance with alpha-beta pruning, move ordering and
    /// transposition-table usage toggled independently.
    pub fn with_features(pruning: bool, ordering: bool, table: bool) -> Negamax {
        Negamax {
            table: TranspositionTable::new(),
            abort: Arc::new(AtomicBool::new(false)),
            counters: PerfCounters::default(),
            pruning_enabled: pruning,
            ordering_enabled: ordering,
            table_enabled: table,
        }
    }

    pub fn counters(&self) -> &PerfCounters {
        &self.counters
    }

    /// Handle for aborting this search from another thread.
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle(Arc::clone(&self.abort))
    }

    /// Aborts the currently running search. The pending call returns a
    /// sentinel result that the caller must discard.
    pub fn abort(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }

    /// Drops all cached table entries, making the next search reproducible
    /// from a cold start.
    pub fn clear_table(&mut self) {
        self.table.clear();
    }

    /// Searches the state `max_depth` plies deep and returns the best
    /// found turn with its score.
    pub fn search(&mut self, state: &GameState, max_depth: usize) -> SearchResult {
        self.abort.store(false, Ordering::Relaxed);
        self.counters = PerfCounters::default();
        let start = Instant::now();

        let result = self.recurse(state.clone(), 0, max_depth, MIN_SCORE, MAX_SCORE);

        self.counters.duration = start.elapsed();
        result
    }

    fn recurse(
        &mut self,
        mut state: GameState,
        depth: usize,
        max_depth: usize,
        mut alpha: Score,
        mut beta: Score,
    ) -> SearchResult {
        if self.abort.load(Ordering::Relaxed) {
            return SearchResult {
                score: 0,
                turn: None,
            };
        }

        let plies_left = max_depth - depth;
        if state.is_game_over() || plies_left == 0 {
            return SearchResult {
                score: state.score(depth),
                turn: None,
            };
        }

        let initial_alpha = alpha;

        if self.table_enabled {
            if let Some(entry) = self.table.lookup(state.hash()) {
                if entry.depth >= plies_left {
                    self.counters.table_hits += 1;
                    match entry.bound {
                        Bound::Exact => {
                            return SearchResult {
                                score: entry.score,
                                turn: Some(entry.turn),
                            }
                        }
                        Bound::Lower => alpha = alpha.max(entry.score),
                        Bound::Upper => beta = beta.min(entry.score),
                    }
                    if self.pruning_enabled && alpha >= beta {
                        // a known bound already closes the window
                        self.counters.cutoffs += 1;
                        return SearchResult {
                            score: entry.score,
                            turn: Some(entry.turn),
                        };
                    }
                }
            }
        }

        // Apply every candidate up front so the successor states can drive
        // move ordering; the recursion then reuses the same states.
        let turns = state.moves().to_vec();
        debug_assert!(!turns.is_empty(), "no moves in a non-terminal position");
        let mut options: Vec<(Turn, GameState, Score)> = turns
            .into_iter()
            .map(|turn| {
                let mut successor = state.apply(&turn);
                let estimate = self.estimate_score(&mut successor, depth + 1);
                (turn, successor, estimate)
            })
            .collect();

        if self.ordering_enabled {
            // best estimate first
            options.sort_by(|a, b| b.2.cmp(&a.2));
        }

        let mut best = SearchResult {
            score: MIN_SCORE,
            turn: None,
        };

        for (turn, successor, _) in options {
            self.counters.nodes += 1;

            let result = self
                .recurse(successor, depth + 1, max_depth, -beta, -alpha)
                .negated();

            if result.score > best.score {
                self.counters.updates += 1;
                best = SearchResult {
                    score: result.score,
                    turn: Some(turn),
                };
            }

            alpha = alpha.max(result.score);

            if self.pruning_enabled && alpha >= beta {
                // the opponent never allows this line; siblings are moot
                self.counters.cutoffs += 1;
                break;
            }

            if self.abort.load(Ordering::Relaxed) {
                return SearchResult {
                    score: 0,
                    turn: None,
                };
            }
        }

        if self.table_enabled {
            if let Some(turn) = best.turn {
                let bound = if best.score <= initial_alpha {
                    // lines below the original window may have been pruned
                    Bound::Upper
                } else if best.score >= beta {
                    Bound::Lower
                } else {
                    Bound::Exact
                };
                self.table.maybe_store(TranspositionEntry {
                    hash: state.hash(),
                    turn,
                    score: best.score,
                    depth: plies_left,
                    bound,
                });
            }
        }

        best
    }

    /// Shallow score estimate of a successor state for move ordering. The
    /// successor has the opponent to move, so scores are negated back.
    fn estimate_score(&self, successor: &mut GameState, depth: usize) -> Score {
        if self.table_enabled {
            if let Some(entry) = self.table.lookup(successor.hash()) {
                return -entry.score;
            }
        }
        -successor.score(depth)
    }
}

impl Default for Negamax {
    fn default() -> Self {
        Negamax::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::WIN_SCORE;

    #[test]
    fn finds_the_hanging_queen() {
        let state = GameState::from_fen("k7/8/8/3q4/8/8/3R4/K7 w - - 0 1").unwrap();
        let mut search = Negamax::new();
        let result = search.search(&state, 2);
        assert_eq!(result.turn.unwrap().to_string(), "d2d5");
        assert!(result.score > 0);
        assert!(search.counters().nodes > 0);
    }

    #[test]
    fn prefers_the_faster_mate() {
        // back-rank mate in one
        let state = GameState::from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
        let mut search = Negamax::new();
        let result = search.search(&state, 3);
        assert_eq!(result.turn.unwrap().to_string(), "a1a8");
        assert!(result.is_victory_certain());
        assert_eq!(result.score, WIN_SCORE - 1);
    }

    #[test]
    fn terminal_position_returns_no_turn() {
        // fool's mate position, white already checkmated
        let state = GameState::from_fen(
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        )
        .unwrap();
        let mut search = Negamax::new();
        let result = search.search(&state, 4);
        assert_eq!(result.turn, None);
        assert!(result.score < -WIN_SCORE_THRESHOLD);
    }

    #[test]
    fn search_resets_a_stale_abort_flag() {
        let state = GameState::new();
        let mut search = Negamax::new();
        search.abort_handle().abort();
        // an abort raised before the call must not poison the next search
        let result = search.search(&state, 1);
        assert!(result.turn.is_some());
    }
}
