//! Bitboard kernel: masks, scans, direction rays and the precomputed
//! knight/king attack tables.
//!
//! Every helper here is a pure function of its arguments; the lazily built
//! lookup tables are immutable after initialization.

use std::sync::OnceLock;

use crate::types::{file_of, rank_of, Square, SQUARE_COUNT};

pub type Bitboard = u64;

// File masks (A is column 0, H column 7)
pub const FILE_A: Bitboard = 0x0101010101010101;
pub const FILE_H: Bitboard = 0x8080808080808080;

pub const NOT_FILE_A: Bitboard = !FILE_A;
pub const NOT_FILE_H: Bitboard = !FILE_H;

// Rank masks (A1 is square 0)
pub const RANK_1: Bitboard = 0x00000000000000FF;
pub const RANK_2: Bitboard = 0x000000000000FF00;
pub const RANK_3: Bitboard = 0x0000000000FF0000;
pub const RANK_4: Bitboard = 0x00000000FF000000;
pub const RANK_5: Bitboard = 0x000000FF00000000;
pub const RANK_6: Bitboard = 0x0000FF0000000000;
pub const RANK_7: Bitboard = 0x00FF000000000000;
pub const RANK_8: Bitboard = 0xFF00000000000000;

#[inline]
pub fn bit(sq: Square) -> Bitboard {
    debug_assert!(sq < SQUARE_COUNT);
    1u64 << sq
}

#[inline]
pub fn set(bb: &mut Bitboard, sq: Square) {
    *bb |= bit(sq);
}

#[inline]
pub fn clear(bb: &mut Bitboard, sq: Square) {
    *bb &= !bit(sq);
}

#[inline]
pub fn toggle(bb: &mut Bitboard, sq: Square) {
    *bb ^= bit(sq);
}

#[inline]
pub fn test(bb: Bitboard, sq: Square) -> bool {
    bb & bit(sq) != 0
}

#[inline]
pub fn mask_file(file: usize) -> Bitboard {
    debug_assert!(file < 8);
    FILE_A << file
}

#[inline]
pub fn mask_rank(rank: usize) -> Bitboard {
    debug_assert!(rank < 8);
    RANK_1 << (rank * 8)
}

#[inline]
pub fn clear_file(file: usize) -> Bitboard {
    !mask_file(file)
}

/// Field of the most significant set bit. Undefined for an empty board
/// (debug assertion).
#[inline]
pub fn scan_msb(bb: Bitboard) -> Square {
    debug_assert!(bb != 0);
    63 - bb.leading_zeros() as Square
}

#[inline]
pub fn scan_lsb(bb: Bitboard) -> Square {
    debug_assert!(bb != 0);
    bb.trailing_zeros() as Square
}

#[inline]
pub fn pop_lsb(bb: &mut Bitboard) -> Option<Square> {
    if *bb == 0 {
        return None;
    }
    let lsb = bb.trailing_zeros() as Square;
    *bb &= *bb - 1;
    Some(lsb)
}

pub struct BitIter {
    bb: Bitboard,
}

impl Iterator for BitIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        pop_lsb(&mut self.bb)
    }
}

#[inline]
pub fn iter_bits(bb: Bitboard) -> BitIter {
    BitIter { bb }
}

/// Ray directions over the square grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North = 0,
    South = 1,
    East = 2,
    West = 3,
    NorthEast = 4,
    NorthWest = 5,
    SouthEast = 6,
    SouthWest = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];
    pub const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// (rank, file) step taken when walking along the direction.
    #[inline]
    pub fn step(self) -> (i8, i8) {
        match self {
            Direction::North => (1, 0),
            Direction::South => (-1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
            Direction::NorthEast => (1, 1),
            Direction::NorthWest => (1, -1),
            Direction::SouthEast => (-1, 1),
            Direction::SouthWest => (-1, -1),
        }
    }

    /// True if square indices increase along the ray. Decides whether the
    /// nearest blocker on a ray is the least or most significant bit.
    #[inline]
    pub fn is_positive(self) -> bool {
        matches!(
            self,
            Direction::North | Direction::East | Direction::NorthEast | Direction::NorthWest
        )
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Direction pointing from `a` to `b`, if the squares share a rank,
    /// file or diagonal.
    pub fn from_to(a: Square, b: Square) -> Option<Direction> {
        if a == b {
            return None;
        }
        let dr = rank_of(b) as i8 - rank_of(a) as i8;
        let df = file_of(b) as i8 - file_of(a) as i8;
        if dr != 0 && df != 0 && dr.abs() != df.abs() {
            return None;
        }
        let step = (dr.signum(), df.signum());
        Direction::ALL.into_iter().find(|d| d.step() == step)
    }
}

struct AttackTables {
    rays: [[Bitboard; 64]; 8],
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
}

static TABLES: OnceLock<AttackTables> = OnceLock::new();

fn tables() -> &'static AttackTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> AttackTables {
    let mut rays = [[0u64; 64]; 8];
    for sq in 0..SQUARE_COUNT {
        for dir in Direction::ALL {
            let (dr, df) = dir.step();
            let mut rank = rank_of(sq) as i8 + dr;
            let mut file = file_of(sq) as i8 + df;
            let mut bb = 0u64;
            while (0..8).contains(&rank) && (0..8).contains(&file) {
                bb |= 1u64 << (rank * 8 + file);
                rank += dr;
                file += df;
            }
            rays[dir.index()][sq] = bb;
        }
    }

    const KNIGHT_STEPS: [(i8, i8); 8] = [
        (2, 1),
        (2, -1),
        (-2, 1),
        (-2, -1),
        (1, 2),
        (1, -2),
        (-1, 2),
        (-1, -2),
    ];
    const KING_STEPS: [(i8, i8); 8] = [
        (1, 0),
        (-1, 0),
        (0, 1),
        (0, -1),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ];

    let leaper = |steps: &[(i8, i8)]| {
        let mut table = [0u64; 64];
        for (sq, entry) in table.iter_mut().enumerate() {
            let mut bb = 0u64;
            for &(dr, df) in steps {
                let rank = rank_of(sq) as i8 + dr;
                let file = file_of(sq) as i8 + df;
                if (0..8).contains(&rank) && (0..8).contains(&file) {
                    bb |= 1u64 << (rank * 8 + file);
                }
            }
            *entry = bb;
        }
        table
    };

    AttackTables {
        rays,
        knight: leaper(&KNIGHT_STEPS),
        king: leaper(&KING_STEPS),
    }
}

/// All squares strictly in the given direction from the square, bounded by
/// the board edge.
#[inline]
pub fn ray(dir: Direction, sq: Square) -> Bitboard {
    tables().rays[dir.index()][sq]
}

#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    tables().knight[sq]
}

#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    tables().king[sq]
}

/// Squares strictly between two aligned squares, empty when the squares do
/// not share a rank, file or diagonal.
pub fn between(a: Square, b: Square) -> Bitboard {
    match Direction::from_to(a, b) {
        Some(dir) => ray(dir, a) & !ray(dir, b) & !bit(b),
        None => 0,
    }
}
