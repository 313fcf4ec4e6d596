//! Thin facade over the board and the move generator.
//!
//! A `GameState` owns a board plus a lazily generated move list. Queries
//! that depend on generator side effects (game over, winner, score) force a
//! generation pass first, so the flags they read are always fresh for the
//! current position. Applying a turn yields a new value; the original state
//! is never mutated.

use crate::board::{ChessBoard, FenError};
use crate::eval::{Score, LOSE_SCORE, WIN_SCORE};
use crate::movegen;
use crate::turn::Turn;
use crate::types::{parse_square, Color, PieceType, Square};

#[derive(Debug, Clone)]
pub struct GameState {
    board: ChessBoard,
    turns: Option<Vec<Turn>>,
}

impl GameState {
    /// State in the standard starting position.
    pub fn new() -> GameState {
        GameState {
            board: ChessBoard::new(),
            turns: None,
        }
    }

    pub fn from_fen(fen: &str) -> Result<GameState, FenError> {
        Ok(GameState {
            board: ChessBoard::from_fen(fen)?,
            turns: None,
        })
    }

    pub fn to_fen(&self) -> String {
        self.board.to_fen()
    }

    #[inline]
    pub fn board(&self) -> &ChessBoard {
        &self.board
    }

    #[inline]
    pub fn next_player(&self) -> Color {
        self.board.next_player()
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.board.hash()
    }

    fn ensure_generated(&mut self) {
        if self.turns.is_none() {
            self.turns = Some(movegen::generate_turns(&mut self.board));
        }
    }

    /// Legal moves of the side to move. Generated once per position and
    /// cached.
    pub fn moves(&mut self) -> &[Turn] {
        self.ensure_generated();
        self.turns.as_deref().unwrap_or(&[])
    }

    /// Applies a turn, producing the successor state. The turn must come
    /// from [`moves`](Self::moves) of this state.
    pub fn apply(&self, turn: &Turn) -> GameState {
        let mut board = self.board.clone();
        board.apply_turn(turn);
        GameState { board, turns: None }
    }

    pub fn is_game_over(&mut self) -> bool {
        self.ensure_generated();
        self.board.checkmate(Color::White)
            || self.board.checkmate(Color::Black)
            || self.board.stalemate()
            || self.is_draw_by_fifty_move_rule()
    }

    /// True once fifty full moves passed without a capture or pawn move.
    #[inline]
    pub fn is_draw_by_fifty_move_rule(&self) -> bool {
        self.board.half_move_clock() >= 100
    }

    /// Winner of a finished game; `None` while running or on a draw.
    pub fn winner(&mut self) -> Option<Color> {
        self.ensure_generated();
        if self.board.checkmate(Color::White) {
            Some(Color::Black)
        } else if self.board.checkmate(Color::Black) {
            Some(Color::White)
        } else {
            None
        }
    }

    /// Score from the view of the side to move. Terminal positions are
    /// depth-adjusted so earlier wins and later losses score better;
    /// everything else is the incremental evaluator's estimate.
    pub fn score(&mut self, depth: usize) -> Score {
        self.ensure_generated();
        let me = self.board.next_player();
        if self.board.checkmate(me) {
            return LOSE_SCORE + depth as Score;
        }
        if self.board.checkmate(me.other()) {
            return WIN_SCORE - depth as Score;
        }
        if self.board.stalemate() || self.is_draw_by_fifty_move_rule() {
            return 0;
        }
        self.board.score_for(me)
    }

    /// Resolves an algebraic move string ("e2e4", "a7a8q") against the
    /// current legal move list.
    pub fn parse_move(&mut self, text: &str) -> Option<Turn> {
        if !text.is_ascii() || text.len() < 4 {
            return None;
        }
        let from = parse_square(&text[0..2])?;
        let to = parse_square(&text[2..4])?;
        let promotion = match &text[4..] {
            "" => None,
            "q" => Some(PieceType::Queen),
            "b" => Some(PieceType::Bishop),
            "r" => Some(PieceType::Rook),
            "n" => Some(PieceType::Knight),
            _ => return None,
        };
        self.find_turn(from, to, promotion)
    }

    /// Legal turn matching the given squares and promotion target, if any.
    pub fn find_turn(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> Option<Turn> {
        self.moves()
            .iter()
            .find(|t| t.from == from && t.to == to && t.promotion_target() == promotion)
            .copied()
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new()
    }
}

impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        // the cached move list is derived data
        self.board == other.board
    }
}

impl Eq for GameState {}

/// Counts the leaf nodes of the legal move tree to the given depth.
pub fn perft(state: &GameState, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut state = state.clone();
    let turns = state.moves().to_vec();
    if depth == 1 {
        return turns.len() as u64;
    }
    let mut nodes = 0;
    for turn in &turns {
        nodes += perft(&state.apply(turn), depth - 1);
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_a_fresh_game() {
        let mut state = GameState::new();
        assert_eq!(state.next_player(), Color::White);
        assert!(!state.is_game_over());
        assert_eq!(state.winner(), None);
        assert_eq!(state.score(0), 0);
    }

    #[test]
    fn apply_leaves_the_source_untouched() {
        let mut a = GameState::new();
        let b = a.clone();
        let turn = a.parse_move("e2e4").unwrap();
        let c = a.apply(&turn);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a.hash(), c.hash());
        assert_eq!(c.next_player(), Color::Black);
    }

    #[test]
    fn equal_positions_compare_equal() {
        let mut a = GameState::new();
        let mut b = GameState::new();
        assert_eq!(a, b);
        let turn = a.parse_move("b2b4").unwrap();
        let a = a.apply(&turn);
        assert_ne!(a, b);
        let turn = b.parse_move("b2b4").unwrap();
        let b = b.apply(&turn);
        assert_eq!(a, b);
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn parse_move_rejects_illegal_moves() {
        let mut state = GameState::new();
        assert!(state.parse_move("e2e5").is_none());
        assert!(state.parse_move("e2").is_none());
        assert!(state.parse_move("zzzz").is_none());
        assert!(state.parse_move("e2e4").is_some());
    }

    #[test]
    fn perft_counts_the_opening_tree() {
        let state = GameState::new();
        assert_eq!(perft(&state, 0), 1);
        assert_eq!(perft(&state, 1), 20);
        assert_eq!(perft(&state, 2), 400);
    }
}
