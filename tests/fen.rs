//! FEN round trips and parse failure behaviour.

use arrocco::types::Color;
use arrocco::{ChessBoard, FenError, GameState, START_FEN};

#[test]
fn canonical_fens_round_trip() {
    for fen in [
        START_FEN,
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 1 1",
        "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/k7/8/8/8/8/K7/8 b - - 99 90",
        "8/P7/8/8/8/8/8/k6K w - - 0 1",
        "4k3/8/8/8/8/8/8/4K2R w K - 12 34",
        "8/8/8/8/8/8/8/KQkq4 w - - 0 1",
    ] {
        let board = ChessBoard::from_fen(fen).expect("valid FEN");
        assert_eq!(board.to_fen(), fen, "round trip broke for '{fen}'");
    }
}

#[test]
fn surrounding_whitespace_is_tolerated() {
    let board = ChessBoard::from_fen("  8/k7/8/8/8/8/K7/8   b - - 99 90 ").unwrap();
    assert_eq!(board.to_fen(), "8/k7/8/8/8/8/K7/8 b - - 99 90");
    assert_eq!(board.next_player(), Color::Black);
    assert_eq!(board.half_move_clock(), 99);
    assert_eq!(board.full_move_clock(), 90);
}

#[test]
fn parsing_is_permissive_about_legality() {
    // nine queens and no black king: syntactically fine, accepted as-is
    let board = ChessBoard::from_fen("QQQQQQQQ/Q7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    assert_eq!(board.piece_bb(Color::White, arrocco::PieceType::Queen).count_ones(), 9);
    assert!(!board.has_pieces(Color::Black));
}

#[test]
fn syntactic_failures_are_reported() {
    assert!(matches!(
        ChessBoard::from_fen(""),
        Err(FenError::MissingField(_))
    ));
    assert!(matches!(
        ChessBoard::from_fen("8/8/8/8/8/8/8/4K3 w KQkq -"),
        Err(FenError::MissingField(_))
    ));
    assert!(matches!(
        ChessBoard::from_fen("8/8/8/8/8/8/8/4X3 w - - 0 1"),
        Err(FenError::InvalidPiece('X'))
    ));
    assert!(matches!(
        ChessBoard::from_fen("8/8/8/8/8/8/8/4K3 white - - 0 1"),
        Err(FenError::InvalidSide(_))
    ));
    assert!(matches!(
        ChessBoard::from_fen("8/8/8/8/8/8/8/4K3 w KQxq - 0 1"),
        Err(FenError::InvalidCastling('x'))
    ));
    assert!(matches!(
        ChessBoard::from_fen("8/8/8/8/8/8/8/4K3 w - j9 0 1"),
        Err(FenError::InvalidEnPassant(_))
    ));
    assert!(matches!(
        ChessBoard::from_fen("8/8/8/8/8/8/8/4K3 w - - many 1"),
        Err(FenError::InvalidClock(_))
    ));
}

#[test]
fn a_parse_failure_leaves_existing_states_alone() {
    let state = GameState::new();
    let before = state.to_fen();
    assert!(GameState::from_fen("garbage").is_err());
    assert_eq!(state.to_fen(), before);
    assert_eq!(before, START_FEN);
}

#[test]
fn game_state_round_trips_through_fen() {
    let mut state = GameState::new();
    for text in ["e2e4", "c7c5", "g1f3"] {
        let turn = state.parse_move(text).expect("legal");
        state = state.apply(&turn);
    }
    let reparsed = GameState::from_fen(&state.to_fen()).unwrap();
    assert_eq!(state, reparsed);
    assert_eq!(state.hash(), reparsed.hash());
    assert_eq!(
        state.to_fen(),
        "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
    );
}
