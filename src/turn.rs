//! Move representation.
//!
//! A turn is one ply: the moving piece, its source and destination squares
//! and a tag describing what kind of move it is. A pawn double step and an
//! en-passant capture are both plain `Move`s; the board reconstructs the
//! en-passant state from the squares involved.

use std::fmt;

use crate::types::{Piece, PieceType, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnAction {
    Move,
    Castle,
    PromotionQueen,
    PromotionBishop,
    PromotionRook,
    PromotionKnight,
    Pass,
    Forfeit,
}

impl TurnAction {
    /// The piece type a promotion action produces, if any.
    pub fn promotion_target(self) -> Option<PieceType> {
        match self {
            TurnAction::PromotionQueen => Some(PieceType::Queen),
            TurnAction::PromotionBishop => Some(PieceType::Bishop),
            TurnAction::PromotionRook => Some(PieceType::Rook),
            TurnAction::PromotionKnight => Some(PieceType::Knight),
            _ => None,
        }
    }

    fn for_promotion_to(target: PieceType) -> TurnAction {
        match target {
            PieceType::Queen => TurnAction::PromotionQueen,
            PieceType::Bishop => TurnAction::PromotionBishop,
            PieceType::Rook => TurnAction::PromotionRook,
            PieceType::Knight => TurnAction::PromotionKnight,
            // kings and pawns are not promotion targets
            PieceType::King | PieceType::Pawn => unreachable!("invalid promotion target"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Turn {
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
    pub action: TurnAction,
}

impl Turn {
    pub fn normal(piece: Piece, from: Square, to: Square) -> Turn {
        Turn {
            piece,
            from,
            to,
            action: TurnAction::Move,
        }
    }

    /// Castling, described by the king's source and destination squares.
    pub fn castle(piece: Piece, from: Square, to: Square) -> Turn {
        Turn {
            piece,
            from,
            to,
            action: TurnAction::Castle,
        }
    }

    pub fn promotion(piece: Piece, from: Square, to: Square, target: PieceType) -> Turn {
        Turn {
            piece,
            from,
            to,
            action: TurnAction::for_promotion_to(target),
        }
    }

    #[inline]
    pub fn promotion_target(&self) -> Option<PieceType> {
        self.action.promotion_target()
    }

    #[inline]
    pub fn is_promotion(&self) -> bool {
        self.promotion_target().is_some()
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            TurnAction::Pass => write!(f, "0000"),
            TurnAction::Forfeit => write!(f, "forfeit"),
            _ => {
                write!(
                    f,
                    "{}{}",
                    crate::types::square_name(self.from),
                    crate::types::square_name(self.to)
                )?;
                if let Some(target) = self.promotion_target() {
                    // promotion letter is always lowercase
                    write!(f, "{}", target.fen_char(crate::types::Color::Black))?;
                }
                Ok(())
            }
        }
    }
}
