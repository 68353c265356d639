//! Pawn promotion.

use crate::Board;
use chess_core::{Piece, PieceKind, Square};

/// The piece a pawn always promotes to.
pub const PROMOTION_KIND: PieceKind = PieceKind::Queen;

/// Promotes a pawn standing on its promotion row at `to`.
///
/// Called after a move landing on `to` was applied. Returns true if a pawn
/// was replaced; no other square is touched.
pub fn apply_promotion(board: &mut Board, to: Square) -> bool {
    match board.get(to) {
        Some(piece) if piece.kind == PieceKind::Pawn && to.row() == piece.color.promotion_row() => {
            board.set(to, Some(Piece::new(piece.color, PROMOTION_KIND)));
            true
        }
        _ => false,
    }
}
