//! Full position representation and the single mutation entry point
//! [`ChessBoard::apply_turn`].
//!
//! The board keeps one bitboard per (color, piece type) plus a redundant
//! per-color union, and embeds the incremental evaluator and Zobrist
//! hasher, which observe every mutation through explicit increment calls.

use std::fmt;

use thiserror::Error;

use crate::bitboard::{self, Bitboard};
use crate::eval::{IncrementalEvaluator, Score};
use crate::turn::{Turn, TurnAction};
use crate::types::{
    file_of, parse_square, rank_of, square_at, square_name, Color, Piece, PieceType, Square, A1,
    A8, D1, D8, F1, F8, H1, H8, SQUARE_COUNT,
};
use crate::zobrist::ZobristHasher;

/// Index of the per-color union bitboard in the piece table.
pub const ALL_PIECES: usize = PieceType::COUNT;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("invalid piece character '{0}'")]
    InvalidPiece(char),
    #[error("piece placement leaves rank {0}")]
    InvalidPlacement(usize),
    #[error("invalid side to move '{0}'")]
    InvalidSide(String),
    #[error("invalid castling availability '{0}'")]
    InvalidCastling(char),
    #[error("invalid en passant target '{0}'")]
    InvalidEnPassant(String),
    #[error("invalid clock value '{0}'")]
    InvalidClock(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChessBoard {
    /// Bitboards per color per piece type, plus the union at [`ALL_PIECES`].
    bb: [[Bitboard; PieceType::COUNT + 1]; Color::COUNT],
    next_player: Color,
    short_castle_right: [bool; Color::COUNT],
    long_castle_right: [bool; Color::COUNT],
    /// Square behind a pawn that just double-stepped.
    en_passant_square: Option<Square>,
    /// Plies since the last capture or pawn move.
    half_move_clock: u32,
    full_move_clock: u32,
    // Flags maintained by the move generator as generation side effects.
    king_in_check: [bool; Color::COUNT],
    checkmate: [bool; Color::COUNT],
    stalemate: bool,
    last_captured_piece: Option<Piece>,
    captured_pieces: Vec<Piece>,
    evaluator: IncrementalEvaluator,
    hasher: ZobristHasher,
}

impl ChessBoard {
    /// Board in the standard starting position.
    pub fn new() -> ChessBoard {
        let mut board = ChessBoard::empty();
        const BACK_RANK: [PieceType; 8] = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];
        for (file, &kind) in BACK_RANK.iter().enumerate() {
            board.put_piece(Piece::new(Color::White, kind), square_at(0, file));
            board.put_piece(Piece::new(Color::White, PieceType::Pawn), square_at(1, file));
            board.put_piece(Piece::new(Color::Black, PieceType::Pawn), square_at(6, file));
            board.put_piece(Piece::new(Color::Black, kind), square_at(7, file));
        }
        board.short_castle_right = [true, true];
        board.long_castle_right = [true, true];
        board.reseed();
        board
    }

    fn empty() -> ChessBoard {
        ChessBoard {
            bb: [[0; PieceType::COUNT + 1]; Color::COUNT],
            next_player: Color::White,
            short_castle_right: [false, false],
            long_castle_right: [false, false],
            en_passant_square: None,
            half_move_clock: 0,
            full_move_clock: 1,
            king_in_check: [false, false],
            checkmate: [false, false],
            stalemate: false,
            last_captured_piece: None,
            captured_pieces: Vec::new(),
            evaluator: IncrementalEvaluator::default(),
            hasher: ZobristHasher::default(),
        }
    }

    // Accessors ---------------------------------------------------------

    #[inline]
    pub fn piece_bb(&self, color: Color, kind: PieceType) -> Bitboard {
        self.bb[color.index()][kind.index()]
    }

    /// Union of all pieces of one color.
    #[inline]
    pub fn all_pieces(&self, color: Color) -> Bitboard {
        self.bb[color.index()][ALL_PIECES]
    }

    #[inline]
    pub fn occupancy(&self) -> Bitboard {
        self.all_pieces(Color::White) | self.all_pieces(Color::Black)
    }

    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        let mask = bitboard::bit(sq);
        for color in Color::BOTH {
            if self.all_pieces(color) & mask == 0 {
                continue;
            }
            for kind in PieceType::ALL {
                if self.piece_bb(color, kind) & mask != 0 {
                    return Some(Piece::new(color, kind));
                }
            }
        }
        None
    }

    /// All pieces with their squares, in square order.
    pub fn pieces(&self) -> impl Iterator<Item = (Piece, Square)> + '_ {
        (0..SQUARE_COUNT).filter_map(move |sq| self.piece_on(sq).map(|p| (p, sq)))
    }

    #[inline]
    pub fn next_player(&self) -> Color {
        self.next_player
    }

    #[inline]
    pub fn short_castle_right(&self, color: Color) -> bool {
        self.short_castle_right[color.index()]
    }

    #[inline]
    pub fn long_castle_right(&self, color: Color) -> bool {
        self.long_castle_right[color.index()]
    }

    #[inline]
    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant_square
    }

    #[inline]
    pub fn half_move_clock(&self) -> u32 {
        self.half_move_clock
    }

    #[inline]
    pub fn full_move_clock(&self) -> u32 {
        self.full_move_clock
    }

    #[inline]
    pub fn king_in_check(&self, color: Color) -> bool {
        self.king_in_check[color.index()]
    }

    #[inline]
    pub fn checkmate(&self, color: Color) -> bool {
        self.checkmate[color.index()]
    }

    #[inline]
    pub fn stalemate(&self) -> bool {
        self.stalemate
    }

    #[inline]
    pub fn last_captured_piece(&self) -> Option<Piece> {
        self.last_captured_piece
    }

    /// Captured pieces in capture order.
    pub fn captured_pieces(&self) -> &[Piece] {
        &self.captured_pieces
    }

    pub fn has_pieces(&self, color: Color) -> bool {
        self.all_pieces(color) != 0
    }

    /// Square of the king of the given color. Exactly one king per color is
    /// a board invariant while a game is running.
    pub fn king_square(&self, color: Color) -> Square {
        bitboard::scan_msb(self.piece_bb(color, PieceType::King))
    }

    /// Current estimate of the embedded evaluator for `color`.
    #[inline]
    pub fn score_for(&self, color: Color) -> Score {
        self.evaluator.score_for(color)
    }

    /// Incrementally maintained Zobrist hash of the position.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hasher.value()
    }

    // Generator flag hooks ---------------------------------------------

    pub(crate) fn set_king_in_check(&mut self, color: Color, value: bool) {
        self.king_in_check[color.index()] = value;
    }

    pub(crate) fn set_checkmate(&mut self, color: Color, value: bool) {
        self.checkmate[color.index()] = value;
    }

    pub(crate) fn set_stalemate(&mut self, value: bool) {
        self.stalemate = value;
    }

    // Mutation ----------------------------------------------------------

    /// Applies a turn received from the move generator. The turn is trusted;
    /// feeding an illegal one leaves the board in an undefined state.
    pub fn apply_turn(&mut self, turn: &Turn) {
        let mover = turn.piece.color;
        debug_assert_eq!(mover, self.next_player, "turn applied out of order");
        let enemy = mover.other();

        // 1. en-passant bookkeeping, hash mirrors the file component
        let previous_ep = self.en_passant_square;
        if let Some(sq) = previous_ep {
            self.hasher.toggle_en_passant_file(file_of(sq));
        }
        self.en_passant_square = if turn.piece.kind == PieceType::Pawn
            && rank_of(turn.to).abs_diff(rank_of(turn.from)) == 2
        {
            Some((turn.from + turn.to) / 2)
        } else {
            None
        };
        if let Some(sq) = self.en_passant_square {
            self.hasher.toggle_en_passant_file(file_of(sq));
        }

        // 2. detect and perform a capture
        let captured = self.find_capture(turn, previous_ep);
        self.last_captured_piece = captured.map(|(victim, _)| victim);
        if let Some((victim, victim_sq)) = captured {
            debug_assert_eq!(victim.color, enemy);
            bitboard::clear(
                &mut self.bb[enemy.index()][victim.kind.index()],
                victim_sq,
            );
            self.captured_pieces.push(victim);
            self.evaluator.on_capture(victim_sq, victim);
            self.hasher.toggle_piece(victim, victim_sq);
        }

        // 3. dispatch by action
        match turn.action {
            TurnAction::Move => {
                self.move_piece(turn.piece, turn.from, turn.to);
            }
            TurnAction::Castle => {
                self.move_piece(turn.piece, turn.from, turn.to);
                let (rook_from, rook_to) = rook_castle_squares(mover, turn.to);
                self.move_piece(Piece::new(mover, PieceType::Rook), rook_from, rook_to);
            }
            TurnAction::PromotionQueen
            | TurnAction::PromotionBishop
            | TurnAction::PromotionRook
            | TurnAction::PromotionKnight => {
                let target = match turn.promotion_target() {
                    Some(target) => target,
                    None => unreachable!(),
                };
                let promoted = Piece::new(mover, target);
                bitboard::clear(
                    &mut self.bb[mover.index()][PieceType::Pawn.index()],
                    turn.from,
                );
                bitboard::set(&mut self.bb[mover.index()][target.index()], turn.to);
                self.evaluator.on_move(turn.piece, turn.from, turn.to);
                self.evaluator.on_promotion(mover, turn.to, target);
                self.hasher.toggle_piece(turn.piece, turn.from);
                self.hasher.toggle_piece(promoted, turn.to);
            }
            TurnAction::Pass | TurnAction::Forfeit => {}
        }

        // 4. castling rights can only be lost, never regained
        self.update_castling_rights(turn, captured);

        // 5. move clocks
        if turn.piece.kind == PieceType::Pawn || captured.is_some() {
            self.half_move_clock = 0;
        } else {
            self.half_move_clock += 1;
        }
        if mover == Color::Black {
            self.full_move_clock += 1;
        }

        // 6. redundant unions
        self.refresh_unions();

        // 7. hand the move over
        self.next_player = enemy;
        self.hasher.toggle_black_to_move();
    }

    fn find_capture(&self, turn: &Turn, previous_ep: Option<Square>) -> Option<(Piece, Square)> {
        if let Some(victim) = self.piece_on(turn.to) {
            if victim.color != turn.piece.color {
                return Some((victim, turn.to));
            }
            return None;
        }
        // en passant: a pawn changing file onto the vacated square captures
        // the pawn one rank behind the destination
        if turn.piece.kind == PieceType::Pawn
            && file_of(turn.from) != file_of(turn.to)
            && previous_ep == Some(turn.to)
        {
            let victim_sq = match turn.piece.color {
                Color::White => turn.to - 8,
                Color::Black => turn.to + 8,
            };
            return Some((
                Piece::new(turn.piece.color.other(), PieceType::Pawn),
                victim_sq,
            ));
        }
        None
    }

    fn move_piece(&mut self, piece: Piece, from: Square, to: Square) {
        let bb = &mut self.bb[piece.color.index()][piece.kind.index()];
        bitboard::clear(bb, from);
        bitboard::set(bb, to);
        self.evaluator.on_move(piece, from, to);
        self.hasher.toggle_piece(piece, from);
        self.hasher.toggle_piece(piece, to);
    }

    fn update_castling_rights(&mut self, turn: &Turn, captured: Option<(Piece, Square)>) {
        let mover = turn.piece.color;
        if turn.piece.kind == PieceType::King {
            self.drop_short_right(mover);
            self.drop_long_right(mover);
        }
        if turn.piece.kind == PieceType::Rook {
            let (short_corner, long_corner) = rook_corners(mover);
            if turn.from == short_corner {
                self.drop_short_right(mover);
            } else if turn.from == long_corner {
                self.drop_long_right(mover);
            }
        }
        // capturing a rook on its starting corner removes the enemy's right
        if let Some((victim, victim_sq)) = captured {
            if victim.kind == PieceType::Rook {
                let (short_corner, long_corner) = rook_corners(victim.color);
                if victim_sq == short_corner {
                    self.drop_short_right(victim.color);
                } else if victim_sq == long_corner {
                    self.drop_long_right(victim.color);
                }
            }
        }
    }

    fn drop_short_right(&mut self, color: Color) {
        if self.short_castle_right[color.index()] {
            self.short_castle_right[color.index()] = false;
            self.hasher.toggle_short_castle(color);
        }
    }

    fn drop_long_right(&mut self, color: Color) {
        if self.long_castle_right[color.index()] {
            self.long_castle_right[color.index()] = false;
            self.hasher.toggle_long_castle(color);
        }
    }

    fn refresh_unions(&mut self) {
        for color in Color::BOTH {
            let mut union = 0;
            for kind in PieceType::ALL {
                union |= self.piece_bb(color, kind);
            }
            self.bb[color.index()][ALL_PIECES] = union;
        }
    }

    /// Places a piece during board setup. Does not touch the evaluator or
    /// hasher; call [`reseed`](Self::reseed) once the position is complete.
    fn put_piece(&mut self, piece: Piece, sq: Square) {
        bitboard::set(&mut self.bb[piece.color.index()][piece.kind.index()], sq);
    }

    fn reseed(&mut self) {
        self.refresh_unions();
        self.evaluator = IncrementalEvaluator::seeded(self.pieces());
        self.hasher = ZobristHasher::from_board(self);
    }

    // FEN ---------------------------------------------------------------

    /// Parses a Forsyth-Edwards Notation string. Parsing is permissive and
    /// performs no legality validation; syntactic trouble fails fast
    /// without producing a board.
    pub fn from_fen(fen: &str) -> Result<ChessBoard, FenError> {
        let mut parts = fen.split_whitespace();
        let placement = parts.next().ok_or(FenError::MissingField("placement"))?;
        let side = parts.next().ok_or(FenError::MissingField("side"))?;
        let castling = parts.next().ok_or(FenError::MissingField("castling"))?;
        let en_passant = parts.next().ok_or(FenError::MissingField("en passant"))?;
        let half_move = parts.next().ok_or(FenError::MissingField("half-move clock"))?;
        let full_move = parts.next().ok_or(FenError::MissingField("full-move number"))?;

        let mut board = ChessBoard::empty();

        let mut rank = 7usize;
        let mut file = 0usize;
        for ch in placement.chars() {
            match ch {
                '/' => {
                    if rank == 0 {
                        return Err(FenError::InvalidPlacement(rank));
                    }
                    rank -= 1;
                    file = 0;
                }
                '1'..='8' => file += ch as usize - '0' as usize,
                _ => {
                    let (kind, color) =
                        PieceType::from_fen_char(ch).ok_or(FenError::InvalidPiece(ch))?;
                    if file > 7 {
                        return Err(FenError::InvalidPlacement(rank));
                    }
                    board.put_piece(Piece::new(color, kind), square_at(rank, file));
                    file += 1;
                }
            }
        }

        board.next_player = match side {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidSide(other.to_string())),
        };

        for ch in castling.chars() {
            match ch {
                'K' => board.short_castle_right[Color::White.index()] = true,
                'Q' => board.long_castle_right[Color::White.index()] = true,
                'k' => board.short_castle_right[Color::Black.index()] = true,
                'q' => board.long_castle_right[Color::Black.index()] = true,
                '-' => {}
                other => return Err(FenError::InvalidCastling(other)),
            }
        }

        board.en_passant_square = match en_passant {
            "-" => None,
            text => Some(
                parse_square(text).ok_or_else(|| FenError::InvalidEnPassant(text.to_string()))?,
            ),
        };

        board.half_move_clock = half_move
            .parse()
            .map_err(|_| FenError::InvalidClock(half_move.to_string()))?;
        board.full_move_clock = full_move
            .parse()
            .map_err(|_| FenError::InvalidClock(full_move.to_string()))?;

        board.reseed();
        Ok(board)
    }

    /// Emits the position as a six-field FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(80);
        for rank in (0..8).rev() {
            let mut empty_run = 0;
            for file in 0..8 {
                match self.piece_on(square_at(rank, file)) {
                    Some(piece) => {
                        if empty_run > 0 {
                            fen.push((b'0' + empty_run) as char);
                            empty_run = 0;
                        }
                        fen.push(piece.kind.fen_char(piece.color));
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                fen.push((b'0' + empty_run) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.next_player {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        let rights_start = fen.len();
        if self.short_castle_right(Color::White) {
            fen.push('K');
        }
        if self.long_castle_right(Color::White) {
            fen.push('Q');
        }
        if self.short_castle_right(Color::Black) {
            fen.push('k');
        }
        if self.long_castle_right(Color::Black) {
            fen.push('q');
        }
        if fen.len() == rights_start {
            fen.push('-');
        }

        fen.push(' ');
        match self.en_passant_square {
            Some(sq) => fen.push_str(&square_name(sq)),
            None => fen.push('-'),
        }

        fen.push_str(&format!(
            " {} {}",
            self.half_move_clock, self.full_move_clock
        ));
        fen
    }
}

impl Default for ChessBoard {
    fn default() -> Self {
        ChessBoard::new()
    }
}

impl fmt::Display for ChessBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            for file in 0..8 {
                match self.piece_on(square_at(rank, file)) {
                    Some(piece) => write!(f, "{} ", piece.kind.fen_char(piece.color))?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Rook source and destination squares for a castle described by the king's
/// destination square.
fn rook_castle_squares(color: Color, king_to: Square) -> (Square, Square) {
    match (color, file_of(king_to)) {
        (Color::White, 6) => (H1, F1),
        (Color::White, 2) => (A1, D1),
        (Color::Black, 6) => (H8, F8),
        (Color::Black, 2) => (A8, D8),
        _ => unreachable!("castle destination must be on file C or G"),
    }
}

/// (short, long) rook starting corners for a color.
pub(crate) fn rook_corners(color: Color) -> (Square, Square) {
    match color {
        Color::White => (H1, A1),
        Color::Black => (H8, A8),
    }
}
