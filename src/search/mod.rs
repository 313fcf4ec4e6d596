//! Game-tree search.
//!
//! - `negamax`: recursive alpha-beta negamax with move ordering and
//!   cooperative cancellation
//! - `table`: direct-mapped transposition table

pub mod negamax;
pub mod table;

pub use self::negamax::{AbortHandle, Negamax, PerfCounters, SearchResult};
pub use self::table::{Bound, TranspositionEntry, TranspositionTable};
