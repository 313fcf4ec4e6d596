//! Core board types: colors, piece types, squares.
//!
//! Square mapping: A1=0, B1=1, ..., H8=63. The same mapping is used for
//! every bitboard operation in the crate.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const COUNT: usize = 2;
    pub const BOTH: [Color; 2] = [Color::White, Color::Black];

    #[inline]
    pub fn other(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Piece types in the order used to index the value and piece-square
/// tables. The generator also iterates this order so king moves come first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
    King = 0,
    Queen = 1,
    Bishop = 2,
    Knight = 3,
    Rook = 4,
    Pawn = 5,
}

impl PieceType {
    pub const COUNT: usize = 6;
    pub const ALL: [PieceType; 6] = [
        PieceType::King,
        PieceType::Queen,
        PieceType::Bishop,
        PieceType::Knight,
        PieceType::Rook,
        PieceType::Pawn,
    ];
    /// Promotion targets in the order the generator emits them.
    pub const PROMOTABLE: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Knight,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn fen_char(self, color: Color) -> char {
        let ch = match self {
            PieceType::King => 'k',
            PieceType::Queen => 'q',
            PieceType::Bishop => 'b',
            PieceType::Knight => 'n',
            PieceType::Rook => 'r',
            PieceType::Pawn => 'p',
        };
        match color {
            Color::White => ch.to_ascii_uppercase(),
            Color::Black => ch,
        }
    }

    pub fn from_fen_char(ch: char) -> Option<(PieceType, Color)> {
        let kind = match ch.to_ascii_lowercase() {
            'k' => PieceType::King,
            'q' => PieceType::Queen,
            'b' => PieceType::Bishop,
            'n' => PieceType::Knight,
            'r' => PieceType::Rook,
            'p' => PieceType::Pawn,
            _ => return None,
        };
        let color = if ch.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some((kind, color))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceType,
}

impl Piece {
    #[inline]
    pub fn new(color: Color, kind: PieceType) -> Piece {
        Piece { color, kind }
    }
}

/// Board square index, 0..64 with A1=0 and H8=63.
pub type Square = usize;

pub const SQUARE_COUNT: usize = 64;

pub const A1: Square = 0;
pub const B1: Square = 1;
pub const C1: Square = 2;
pub const D1: Square = 3;
pub const E1: Square = 4;
pub const F1: Square = 5;
pub const G1: Square = 6;
pub const H1: Square = 7;
pub const A8: Square = 56;
pub const B8: Square = 57;
pub const C8: Square = 58;
pub const D8: Square = 59;
pub const E8: Square = 60;
pub const F8: Square = 61;
pub const G8: Square = 62;
pub const H8: Square = 63;

#[inline]
pub fn rank_of(sq: Square) -> usize {
    sq / 8
}

#[inline]
pub fn file_of(sq: Square) -> usize {
    sq % 8
}

#[inline]
pub fn square_at(rank: usize, file: usize) -> Square {
    rank * 8 + file
}

/// Mirrors a square across the board midline (A2 <-> A7 and so on). Used to
/// index white pieces into the black-oriented piece-square tables.
#[inline]
pub fn flip_horizontal(sq: Square) -> Square {
    sq ^ 56
}

/// Algebraic name of a square ("a1" .. "h8").
pub fn square_name(sq: Square) -> String {
    debug_assert!(sq < SQUARE_COUNT);
    let file = (b'a' + file_of(sq) as u8) as char;
    let rank = (b'1' + rank_of(sq) as u8) as char;
    format!("{file}{rank}")
}

/// Parses an algebraic square name ("e3" -> 20).
pub fn parse_square(text: &str) -> Option<Square> {
    let bytes = text.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = bytes[0];
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    Some(square_at((rank - b'1') as usize, (file - b'a') as usize))
}
