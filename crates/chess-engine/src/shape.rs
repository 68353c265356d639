//! Geometric move rules per piece kind.
//!
//! These rules answer "can this piece travel from here to there" on the
//! given board: direction, distance and path blocking. They deliberately
//! ignore whose turn it is, what stands on the destination (beyond what a
//! pawn needs), and king safety; see [`crate::Game::validate`] for the full
//! local-move check.

use crate::Board;
use chess_core::{Color, PieceKind, Square};

/// Returns true if the piece on `from` may move to `to` by its shape rule.
///
/// An empty source square, or `from == to`, is never legal.
pub fn is_legal_shape(board: &Board, from: Square, to: Square) -> bool {
    let Some(piece) = board.get(from) else {
        return false;
    };
    if from == to {
        return false;
    }

    match piece.kind {
        PieceKind::Pawn => pawn_shape(board, piece.color, from, to),
        PieceKind::Rook => rook_shape(board, from, to),
        PieceKind::Knight => knight_shape(from, to),
        PieceKind::Bishop => bishop_shape(board, from, to),
        PieceKind::Queen => rook_shape(board, from, to) || bishop_shape(board, from, to),
        PieceKind::King => king_shape(from, to),
    }
}

#[inline]
fn deltas(from: Square, to: Square) -> (i8, i8) {
    (
        to.row() as i8 - from.row() as i8,
        to.col() as i8 - from.col() as i8,
    )
}

fn pawn_shape(board: &Board, color: Color, from: Square, to: Square) -> bool {
    let dir = color.pawn_direction();
    let (dr, dc) = deltas(from, to);

    if dc == 0 && board.is_empty(to) {
        if dr == dir {
            return true;
        }
        if dr == 2 * dir && from.row() == color.pawn_row() {
            return from
                .offset(dir, 0)
                .is_some_and(|between| board.is_empty(between));
        }
    }

    // Diagonal steps only capture; there is no en passant.
    dc.abs() == 1 && dr == dir && !board.is_empty(to)
}

fn rook_shape(board: &Board, from: Square, to: Square) -> bool {
    (from.row() == to.row() || from.col() == to.col()) && path_clear(board, from, to)
}

fn bishop_shape(board: &Board, from: Square, to: Square) -> bool {
    let (dr, dc) = deltas(from, to);
    dr.abs() == dc.abs() && path_clear(board, from, to)
}

fn knight_shape(from: Square, to: Square) -> bool {
    let (dr, dc) = deltas(from, to);
    matches!((dr.abs(), dc.abs()), (2, 1) | (1, 2))
}

fn king_shape(from: Square, to: Square) -> bool {
    let (dr, dc) = deltas(from, to);
    dr.abs() <= 1 && dc.abs() <= 1
}

/// Returns true if every square strictly between `from` and `to` is empty.
///
/// The squares must share a rank, file or diagonal.
pub(crate) fn path_clear(board: &Board, from: Square, to: Square) -> bool {
    let (dr, dc) = deltas(from, to);
    let (step_r, step_c) = (dr.signum(), dc.signum());

    let mut current = from.offset(step_r, step_c);
    while let Some(sq) = current {
        if sq == to {
            return true;
        }
        if !board.is_empty(sq) {
            return false;
        }
        current = sq.offset(step_r, step_c);
    }
    true
}
