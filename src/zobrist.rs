//! Incremental Zobrist hashing.
//!
//! Key tables are generated once per process from a fixed seed so that two
//! runs hash identical positions identically, which keeps transposition
//! table behaviour reproducible across games.

use std::sync::OnceLock;

use crate::board::ChessBoard;
use crate::types::{file_of, Color, Piece, Square};

struct ZobristKeys {
    piece_square: [[[u64; 64]; 6]; 2],
    black_to_move: u64,
    short_castle: [u64; 2],
    long_castle: [u64; 2],
    en_passant_file: [u64; 8],
}

static KEYS: OnceLock<ZobristKeys> = OnceLock::new();

const ZOBRIST_SEED: u64 = 0x5bf0_3a3c_e4d2_6c1f;

#[inline]
fn keys() -> &'static ZobristKeys {
    KEYS.get_or_init(build_keys)
}

// splitmix64
#[inline]
fn next_random(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn build_keys() -> ZobristKeys {
    let mut seed = ZOBRIST_SEED;

    let mut piece_square = [[[0u64; 64]; 6]; 2];
    for color in &mut piece_square {
        for kind in color.iter_mut() {
            for sq in kind.iter_mut() {
                *sq = next_random(&mut seed);
            }
        }
    }

    let black_to_move = next_random(&mut seed);
    let short_castle = [next_random(&mut seed), next_random(&mut seed)];
    let long_castle = [next_random(&mut seed), next_random(&mut seed)];

    let mut en_passant_file = [0u64; 8];
    for key in &mut en_passant_file {
        *key = next_random(&mut seed);
    }

    ZobristKeys {
        piece_square,
        black_to_move,
        short_castle,
        long_castle,
        en_passant_file,
    }
}

/// Incrementally maintained position hash. Embedded by value in the board;
/// every bit-level board change is mirrored by exactly one XOR here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ZobristHasher {
    hash: u64,
}

impl ZobristHasher {
    #[inline]
    pub fn value(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn toggle_piece(&mut self, piece: Piece, sq: Square) {
        self.hash ^= keys().piece_square[piece.color.index()][piece.kind.index()][sq];
    }

    #[inline]
    pub fn toggle_black_to_move(&mut self) {
        self.hash ^= keys().black_to_move;
    }

    #[inline]
    pub fn toggle_short_castle(&mut self, color: Color) {
        self.hash ^= keys().short_castle[color.index()];
    }

    #[inline]
    pub fn toggle_long_castle(&mut self, color: Color) {
        self.hash ^= keys().long_castle[color.index()];
    }

    #[inline]
    pub fn toggle_en_passant_file(&mut self, file: usize) {
        self.hash ^= keys().en_passant_file[file];
    }

    /// Hasher seeded with a from-scratch recomputation of the board.
    pub fn from_board(board: &ChessBoard) -> ZobristHasher {
        ZobristHasher {
            hash: full_hash(board),
        }
    }
}

/// From-scratch Zobrist hash of a board. The incrementally maintained value
/// must always equal this recomputation.
pub fn full_hash(board: &ChessBoard) -> u64 {
    let mut hash = 0u64;
    for (piece, sq) in board.pieces() {
        hash ^= keys().piece_square[piece.color.index()][piece.kind.index()][sq];
    }
    if board.next_player() == Color::Black {
        hash ^= keys().black_to_move;
    }
    for color in Color::BOTH {
        if board.short_castle_right(color) {
            hash ^= keys().short_castle[color.index()];
        }
        if board.long_castle_right(color) {
            hash ^= keys().long_castle[color.index()];
        }
    }
    if let Some(sq) = board.en_passant_square() {
        hash ^= keys().en_passant_file[file_of(sq)];
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceType;

    #[test]
    fn toggles_cancel() {
        let mut hasher = ZobristHasher::default();
        let piece = Piece::new(Color::White, PieceType::Knight);
        hasher.toggle_piece(piece, 6);
        hasher.toggle_black_to_move();
        hasher.toggle_short_castle(Color::Black);
        hasher.toggle_en_passant_file(4);
        hasher.toggle_en_passant_file(4);
        hasher.toggle_short_castle(Color::Black);
        hasher.toggle_black_to_move();
        hasher.toggle_piece(piece, 6);
        assert_eq!(hasher.value(), 0);
    }

    #[test]
    fn keys_are_deterministic_and_distinct() {
        let a = keys().piece_square[0][0][0];
        let b = keys().piece_square[0][0][1];
        assert_ne!(a, 0);
        assert_ne!(a, b);
        assert_ne!(keys().short_castle[0], keys().short_castle[1]);
        assert_ne!(keys().short_castle[0], keys().long_castle[0]);
    }
}
