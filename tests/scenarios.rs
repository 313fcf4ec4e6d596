//! Literal rule scenarios: opening legality, fool's mate, the fifty-move
//! rule, en passant, castling restrictions and promotion expansion.

use arrocco::types::{Color, Piece, PieceType};
use arrocco::{GameState, TurnAction};

#[test]
fn starting_position_has_twenty_legal_moves() {
    let mut state = GameState::new();
    assert_eq!(state.next_player(), Color::White);
    assert!(!state.is_game_over());

    let turns = state.moves().to_vec();
    assert_eq!(turns.len(), 20);
    let pawn_moves = turns
        .iter()
        .filter(|t| t.piece.kind == PieceType::Pawn)
        .count();
    let knight_moves = turns
        .iter()
        .filter(|t| t.piece.kind == PieceType::Knight)
        .count();
    assert_eq!(pawn_moves, 16);
    assert_eq!(knight_moves, 4);
}

#[test]
fn fools_mate_ends_the_game() {
    let mut state = GameState::new();
    for text in ["f2f3", "e7e5", "g2g4", "d8h4"] {
        let turn = state
            .parse_move(text)
            .unwrap_or_else(|| panic!("{text} should be legal"));
        state = state.apply(&turn);
    }
    assert!(state.is_game_over());
    assert_eq!(state.winner(), Some(Color::Black));
    assert!(state.board().checkmate(Color::White));
    assert!(state.board().king_in_check(Color::White));
    assert!(!state.board().checkmate(Color::Black));
}

#[test]
fn fifty_move_rule_draws_the_game() {
    let mut state = GameState::from_fen("8/k7/8/8/8/8/K7/8 b - - 99 90").unwrap();
    assert!(!state.is_game_over());
    assert!(!state.is_draw_by_fifty_move_rule());

    let turn = state.parse_move("a7a6").expect("king move is legal");
    let mut state = state.apply(&turn);
    assert!(state.is_game_over());
    assert!(state.is_draw_by_fifty_move_rule());
    assert_eq!(state.winner(), None);
}

#[test]
fn en_passant_capture_is_generated_and_applied() {
    let mut state =
        GameState::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
            .unwrap();
    let capture = state
        .parse_move("e5d6")
        .expect("en passant capture must be in the move list");
    assert_eq!(capture.piece.kind, PieceType::Pawn);

    let state = state.apply(&capture);
    let board = state.board();
    // the captured pawn sat on d5, not d6
    assert_eq!(board.piece_on(35), None);
    assert_eq!(
        board.piece_on(43),
        Some(Piece::new(Color::White, PieceType::Pawn))
    );
    assert_eq!(board.en_passant_square(), None);
    assert_eq!(
        board.last_captured_piece(),
        Some(Piece::new(Color::Black, PieceType::Pawn))
    );
}

#[test]
fn castling_through_an_attacked_square_is_forbidden() {
    // the f8 rook covers f1, so the white king may not cross it
    let mut state = GameState::from_fen("r3kr1r/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
    let turns = state.moves().to_vec();
    assert!(
        turns.iter().all(|t| t.action != TurnAction::Castle),
        "castle through an attacked square was generated"
    );
    assert!(state.find_turn(4, 6, None).is_none());

    // control: without the f8 rook the same castle is available
    let mut state = GameState::from_fen("r3k2r/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
    let castle = state
        .moves()
        .iter()
        .find(|t| t.action == TurnAction::Castle)
        .copied()
        .expect("short castle should be available");
    assert_eq!(castle.to_string(), "e1g1");

    let state = state.apply(&castle);
    let board = state.board();
    assert_eq!(
        board.piece_on(6),
        Some(Piece::new(Color::White, PieceType::King))
    );
    assert_eq!(
        board.piece_on(5),
        Some(Piece::new(Color::White, PieceType::Rook))
    );
}

#[test]
fn blocked_or_lost_rights_suppress_castling() {
    // rights present but the b1 square is occupied: long castle illegal
    let mut state = GameState::from_fen("4k3/8/8/8/8/8/8/RN2K3 w Q - 0 1").unwrap();
    assert!(state
        .moves()
        .iter()
        .all(|t| t.action != TurnAction::Castle));

    // no rights at all: nothing generated even with a free path
    let mut state = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1").unwrap();
    assert!(state
        .moves()
        .iter()
        .all(|t| t.action != TurnAction::Castle));
}

#[test]
fn promotion_expands_into_four_tagged_turns() {
    let mut state = GameState::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").unwrap();
    let turns = state.moves().to_vec();

    let promotions: Vec<_> = turns.iter().filter(|t| t.from == 48).collect();
    assert_eq!(promotions.len(), 4);
    assert_eq!(
        promotions.iter().map(|t| t.action).collect::<Vec<_>>(),
        vec![
            TurnAction::PromotionQueen,
            TurnAction::PromotionBishop,
            TurnAction::PromotionRook,
            TurnAction::PromotionKnight,
        ]
    );
    assert!(promotions.iter().all(|t| t.to == 56));
    // the rest of the list is king moves
    assert!(turns
        .iter()
        .filter(|t| t.from != 48)
        .all(|t| t.piece.kind == PieceType::King));

    let queen_promotion = state
        .parse_move("a7a8q")
        .expect("queen promotion parses against the move list");
    let state = state.apply(&queen_promotion);
    let board = state.board();
    assert_eq!(
        board.piece_on(56),
        Some(Piece::new(Color::White, PieceType::Queen))
    );
    assert_eq!(board.piece_on(48), None);
}
