//! Legal move generation.
//!
//! The generator is a pure function of the board apart from the check,
//! checkmate and stalemate flags it maintains on it as generation side
//! effects. Generation first builds the opponent's attack map (with the
//! friendly king transparent to sliders, so squares behind the king stay
//! unsafe), then produces evasions or ordinary moves, and finally verifies
//! every candidate on a scratch copy so pins and en-passant discoveries
//! never leak through.

use crate::bitboard::{
    self, bit, iter_bits, Bitboard, Direction, NOT_FILE_A, NOT_FILE_H, RANK_3, RANK_6,
};
use crate::board::{rook_corners, ChessBoard};
use crate::turn::Turn;
use crate::types::{
    rank_of, Color, Piece, PieceType, Square, B1, B8, C1, C8, D1, D8, E1, E8, F1, F8, G1, G8,
};

/// Generates all legal moves for the side to move and refreshes the check,
/// checkmate and stalemate flags on the board.
pub fn generate_turns(board: &mut ChessBoard) -> Vec<Turn> {
    let player = board.next_player();
    let opponent = player.other();
    let opp_attacks = all_opponent_attacks(board, opponent);
    let in_check = board.piece_bb(player, PieceType::King) & opp_attacks != 0;

    // The opponent cannot be in check when it is our move; the flag may
    // still be set from the previous half-move.
    board.set_king_in_check(opponent, false);
    board.set_king_in_check(player, in_check);

    let mut turns = Vec::with_capacity(64);

    if in_check {
        // Non-king pieces may only capture the checker or interpose on the
        // check ray; king moves avoid the attack map instead.
        let evasion_mask = uncheck_fields(board, opponent);
        for kind in PieceType::ALL {
            let piece = Piece::new(player, kind);
            for from in iter_bits(board.piece_bb(player, kind)) {
                let mut targets = move_targets(board, piece, from, opp_attacks);
                if kind != PieceType::King {
                    targets &= evasion_mask;
                }
                push_turns(piece, from, targets, &mut turns);
            }
        }
    } else {
        let king = Piece::new(player, PieceType::King);
        if board.short_castle_right(player) && short_castle_possible(board, player, opp_attacks) {
            turns.push(Turn::castle(king, king_home(player), short_castle_target(player)));
        }
        if board.long_castle_right(player) && long_castle_possible(board, player, opp_attacks) {
            turns.push(Turn::castle(king, king_home(player), long_castle_target(player)));
        }
        for kind in PieceType::ALL {
            let piece = Piece::new(player, kind);
            for from in iter_bits(board.piece_bb(player, kind)) {
                let targets = move_targets(board, piece, from, opp_attacks);
                push_turns(piece, from, targets, &mut turns);
            }
        }
    }

    // A pseudo-legal move may still expose its own king (absolute pins,
    // en-passant discoveries, king takes a defended piece); verify each
    // candidate on a scratch copy.
    turns.retain(|turn| {
        let mut next = board.clone();
        next.apply_turn(turn);
        !is_field_attacked(&next, next.king_square(player), opponent)
    });

    board.set_checkmate(player, in_check && turns.is_empty());
    board.set_stalemate(!in_check && turns.is_empty());
    turns
}

/// Nearest occupied square to `sq` along `dir`, if any.
fn nearest_on_ray(dir: Direction, sq: Square, occupied: Bitboard) -> Option<Square> {
    let blockers = bitboard::ray(dir, sq) & occupied;
    if blockers == 0 {
        None
    } else if dir.is_positive() {
        Some(bitboard::scan_lsb(blockers))
    } else {
        Some(bitboard::scan_msb(blockers))
    }
}

/// True if any piece of `by` attacks `sq` on the given board.
pub fn is_field_attacked(board: &ChessBoard, sq: Square, by: Color) -> bool {
    let target = bit(sq);
    if pawn_attack_set(board.piece_bb(by, PieceType::Pawn), by) & target != 0 {
        return true;
    }
    if bitboard::knight_attacks(sq) & board.piece_bb(by, PieceType::Knight) != 0 {
        return true;
    }
    if bitboard::king_attacks(sq) & board.piece_bb(by, PieceType::King) != 0 {
        return true;
    }
    let occupied = board.occupancy();
    let orthogonal = board.piece_bb(by, PieceType::Rook) | board.piece_bb(by, PieceType::Queen);
    if orthogonal != 0 {
        for dir in Direction::ORTHOGONAL {
            if let Some(blocker) = nearest_on_ray(dir, sq, occupied) {
                if orthogonal & bit(blocker) != 0 {
                    return true;
                }
            }
        }
    }
    let diagonal = board.piece_bb(by, PieceType::Bishop) | board.piece_bb(by, PieceType::Queen);
    if diagonal != 0 {
        for dir in Direction::DIAGONAL {
            if let Some(blocker) = nearest_on_ray(dir, sq, occupied) {
                if diagonal & bit(blocker) != 0 {
                    return true;
                }
            }
        }
    }
    false
}

/// Every square the attacker currently attacks. Pawn diagonals count even
/// without a capture target, pawn pushes do not. Sliding attacks treat the
/// defender's king as transparent. Castle destinations contribute through a
/// no-cutoff castle computation.
fn all_opponent_attacks(board: &ChessBoard, attacker: Color) -> Bitboard {
    let defender = attacker.other();
    let occupied = board.occupancy();
    let transparent_king = occupied & !board.piece_bb(defender, PieceType::King);
    let own = board.all_pieces(attacker);

    let mut attacks = 0;

    if board.short_castle_right(attacker) && short_castle_possible(board, attacker, 0) {
        attacks |= bit(short_castle_target(attacker));
    }
    if board.long_castle_right(attacker) && long_castle_possible(board, attacker, 0) {
        attacks |= bit(long_castle_target(attacker));
    }

    attacks |= pawn_attack_set(board.piece_bb(attacker, PieceType::Pawn), attacker);
    for from in iter_bits(board.piece_bb(attacker, PieceType::Knight)) {
        attacks |= bitboard::knight_attacks(from);
    }
    for from in iter_bits(board.piece_bb(attacker, PieceType::King)) {
        attacks |= bitboard::king_attacks(from);
    }
    for from in iter_bits(board.piece_bb(attacker, PieceType::Rook)) {
        attacks |= sliding_targets(from, transparent_king, own, &Direction::ORTHOGONAL);
    }
    for from in iter_bits(board.piece_bb(attacker, PieceType::Bishop)) {
        attacks |= sliding_targets(from, transparent_king, own, &Direction::DIAGONAL);
    }
    for from in iter_bits(board.piece_bb(attacker, PieceType::Queen)) {
        attacks |= sliding_targets(from, transparent_king, own, &Direction::ALL);
    }

    attacks
}

/// Squares onto which a non-king defender piece may move to resolve a
/// check: the checker's square, plus the squares strictly between checker
/// and king for a sliding checker. With two checkers the first one found
/// wins; no interposition resolves both, so the scratch-copy filter leaves
/// king moves only.
fn uncheck_fields(board: &ChessBoard, attacker: Color) -> Bitboard {
    let defender = attacker.other();
    let king_bb = board.piece_bb(defender, PieceType::King);
    let king_sq = board.king_square(defender);
    for kind in PieceType::ALL {
        let piece = Piece::new(attacker, kind);
        for from in iter_bits(board.piece_bb(attacker, kind)) {
            let targets = move_targets(board, piece, from, 0);
            if targets & king_bb == 0 {
                continue;
            }
            let mut fields = bit(from);
            if matches!(
                kind,
                PieceType::Queen | PieceType::Bishop | PieceType::Rook
            ) {
                fields |= bitboard::between(from, king_sq);
            }
            return fields;
        }
    }
    0
}

/// Pseudo-legal target squares of one piece.
fn move_targets(board: &ChessBoard, piece: Piece, from: Square, opp_attacks: Bitboard) -> Bitboard {
    let own = board.all_pieces(piece.color);
    let occupied = board.occupancy();
    match piece.kind {
        PieceType::King => bitboard::king_attacks(from) & !own & !opp_attacks,
        PieceType::Knight => bitboard::knight_attacks(from) & !own,
        PieceType::Pawn => pawn_targets(board, piece.color, from),
        PieceType::Rook => sliding_targets(from, occupied, own, &Direction::ORTHOGONAL),
        PieceType::Bishop => sliding_targets(from, occupied, own, &Direction::DIAGONAL),
        PieceType::Queen => sliding_targets(from, occupied, own, &Direction::ALL),
    }
}

/// Slider targets: along each ray every empty square up to the first
/// blocker, plus the blocker itself when it is capturable.
fn sliding_targets(from: Square, occupied: Bitboard, own: Bitboard, dirs: &[Direction]) -> Bitboard {
    let mut targets = 0;
    for &dir in dirs {
        let ray = bitboard::ray(dir, from);
        let blockers = ray & occupied;
        if blockers == 0 {
            targets |= ray;
        } else {
            let first = if dir.is_positive() {
                bitboard::scan_lsb(blockers)
            } else {
                bitboard::scan_msb(blockers)
            };
            // keep the ray up to and including the first blocker
            targets |= ray & !bitboard::ray(dir, first);
        }
    }
    targets & !own
}

fn pawn_targets(board: &ChessBoard, color: Color, from: Square) -> Bitboard {
    let occupied = board.occupancy();
    let empty = !occupied;
    let pawn = bit(from);
    let mut capture_mask = board.all_pieces(color.other());
    if let Some(ep) = board.en_passant_square() {
        capture_mask |= bit(ep);
    }
    match color {
        Color::White => {
            let one = (pawn << 8) & empty;
            let two = ((one & RANK_3) << 8) & empty;
            one | two | (pawn_attack_set(pawn, Color::White) & capture_mask)
        }
        Color::Black => {
            let one = (pawn >> 8) & empty;
            let two = ((one & RANK_6) >> 8) & empty;
            one | two | (pawn_attack_set(pawn, Color::Black) & capture_mask)
        }
    }
}

/// Squares attacked by a set of pawns, regardless of occupancy.
fn pawn_attack_set(pawns: Bitboard, color: Color) -> Bitboard {
    match color {
        Color::White => ((pawns & NOT_FILE_A) << 7) | ((pawns & NOT_FILE_H) << 9),
        Color::Black => ((pawns & NOT_FILE_A) >> 9) | ((pawns & NOT_FILE_H) >> 7),
    }
}

fn king_home(color: Color) -> Square {
    match color {
        Color::White => E1,
        Color::Black => E8,
    }
}

fn short_castle_target(color: Color) -> Square {
    match color {
        Color::White => G1,
        Color::Black => G8,
    }
}

fn long_castle_target(color: Color) -> Square {
    match color {
        Color::White => C1,
        Color::Black => C8,
    }
}

/// Short castle precondition: king and rook at home, the two squares
/// between them empty, and neither the king square, the crossed square nor
/// the destination attacked. Pass an empty attack map for the no-cutoff
/// variant used while building the attack map itself.
fn short_castle_possible(board: &ChessBoard, color: Color, opp_attacks: Bitboard) -> bool {
    let occupied = board.occupancy();
    let (e, f, g) = match color {
        Color::White => (E1, F1, G1),
        Color::Black => (E8, F8, G8),
    };
    let (short_corner, _) = rook_corners(color);
    board.piece_bb(color, PieceType::King) & bit(e) != 0
        && board.piece_bb(color, PieceType::Rook) & bit(short_corner) != 0
        && occupied & (bit(f) | bit(g)) == 0
        && opp_attacks & (bit(e) | bit(f) | bit(g)) == 0
}

fn long_castle_possible(board: &ChessBoard, color: Color, opp_attacks: Bitboard) -> bool {
    let occupied = board.occupancy();
    let (e, d, c, b) = match color {
        Color::White => (E1, D1, C1, B1),
        Color::Black => (E8, D8, C8, B8),
    };
    let (_, long_corner) = rook_corners(color);
    board.piece_bb(color, PieceType::King) & bit(e) != 0
        && board.piece_bb(color, PieceType::Rook) & bit(long_corner) != 0
        && occupied & (bit(b) | bit(c) | bit(d)) == 0
        && opp_attacks & (bit(e) | bit(d) | bit(c)) == 0
}

/// Expands a target bitboard into turns; pawn moves onto the last rank
/// become four promotions, emitted queen, bishop, rook, knight.
fn push_turns(piece: Piece, from: Square, targets: Bitboard, out: &mut Vec<Turn>) {
    for to in iter_bits(targets) {
        if piece.kind == PieceType::Pawn && (rank_of(to) == 7 || rank_of(to) == 0) {
            for target in PieceType::PROMOTABLE {
                out.push(Turn::promotion(piece, from, to, target));
            }
        } else {
            out.push(Turn::normal(piece, from, to));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::TurnAction;

    fn moves_from(fen: &str) -> (ChessBoard, Vec<Turn>) {
        let mut board = ChessBoard::from_fen(fen).unwrap();
        let turns = generate_turns(&mut board);
        (board, turns)
    }

    #[test]
    fn starting_position_has_twenty_moves() {
        let mut board = ChessBoard::new();
        let turns = generate_turns(&mut board);
        assert_eq!(turns.len(), 20);
        assert!(!board.king_in_check(Color::White));
        assert!(!board.checkmate(Color::White));
        assert!(!board.stalemate());
    }

    #[test]
    fn pinned_piece_may_not_move() {
        // knight on e2 shields its king from the e8 rook
        let (_, turns) = moves_from("4r3/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(turns.iter().all(|t| t.piece.kind == PieceType::King));
        assert!(!turns.is_empty());
    }

    #[test]
    fn double_check_allows_king_moves_only() {
        // rook on e8 and bishop on b4 both give check
        let (board, turns) = moves_from("4r3/8/8/8/1b6/8/8/4K2R w K - 0 1");
        assert!(board.king_in_check(Color::White));
        assert!(!turns.is_empty());
        assert!(turns.iter().all(|t| t.piece.kind == PieceType::King));
    }

    #[test]
    fn check_can_only_be_blocked_on_the_ray() {
        // rook e8 gives check; the d2 rook may interpose on e2 and nothing else
        let (board, turns) = moves_from("4r3/8/8/8/8/8/3R4/4K3 w - - 0 1");
        assert!(board.king_in_check(Color::White));
        let rook_moves: Vec<String> = turns
            .iter()
            .filter(|t| t.piece.kind == PieceType::Rook)
            .map(|t| t.to_string())
            .collect();
        assert_eq!(rook_moves, vec!["d2e2".to_string()]);
    }

    #[test]
    fn checker_can_be_captured() {
        // knight b6 checks the a8 king; the b8 rook may take it, and the
        // mask allows the rook no other move
        let (board, turns) = moves_from("kr6/8/1N6/8/8/8/8/K7 b - - 0 1");
        assert!(board.king_in_check(Color::Black));
        let rook_moves: Vec<String> = turns
            .iter()
            .filter(|t| t.piece.kind == PieceType::Rook)
            .map(|t| t.to_string())
            .collect();
        assert_eq!(rook_moves, vec!["b8b6".to_string()]);
    }

    #[test]
    fn promotions_expand_in_fixed_order() {
        let (_, turns) = moves_from("8/P7/8/8/8/8/8/k6K w - - 0 1");
        let promotions: Vec<TurnAction> = turns
            .iter()
            .filter(|t| t.from == 48)
            .map(|t| t.action)
            .collect();
        assert_eq!(
            promotions,
            vec![
                TurnAction::PromotionQueen,
                TurnAction::PromotionBishop,
                TurnAction::PromotionRook,
                TurnAction::PromotionKnight,
            ]
        );
    }
}
