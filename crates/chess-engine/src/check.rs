//! Check and checkmate detection.

use crate::shape::is_legal_shape;
use crate::Board;
use chess_core::{Color, Move, Piece, PieceKind, Square};

/// Returns true if `color`'s king is attacked by any enemy piece.
///
/// A board without that king counts as in check; it should never arise
/// from legal play.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    let Some(king) = board.king_square(color) else {
        return true;
    };
    board
        .pieces_of(color.opposite())
        .any(|(from, _)| is_legal_shape(board, from, king))
}

/// Returns true if a piece of color `by` attacks `target`, whether or not
/// the square is occupied.
///
/// Differs from the shape rule only for pawns, which attack diagonally
/// even onto an empty square.
pub fn is_square_attacked(board: &Board, target: Square, by: Color) -> bool {
    board.pieces_of(by).any(|(from, piece)| {
        if piece.kind == PieceKind::Pawn {
            let dr = target.row() as i8 - from.row() as i8;
            let dc = target.col() as i8 - from.col() as i8;
            dr == by.pawn_direction() && dc.abs() == 1
        } else {
            let mut probe = *board;
            // Occupy the target so sliders and kings see it like a capture.
            if probe.is_empty(target) {
                probe.set(target, Some(Piece::new(by.opposite(), PieceKind::Pawn)));
            }
            is_legal_shape(&probe, from, target)
        }
    })
}

/// Iterates over the shape-legal moves of `color` that do not land on a
/// friendly piece.
///
/// King safety is not considered; castling is not included.
pub fn candidate_moves(board: &Board, color: Color) -> impl Iterator<Item = Move> + '_ {
    board.pieces_of(color).flat_map(move |(from, _)| {
        Square::all()
            .filter(move |&to| {
                board.get(to).map_or(true, |target| target.color != color)
                    && is_legal_shape(board, from, to)
            })
            .map(move |to| Move::new(from, to))
    })
}

/// Returns true if `color` is in check and no candidate move gets it out.
///
/// Every candidate is tried on a copy of the board; the original is never
/// touched.
pub fn is_checkmate(board: &Board, color: Color) -> bool {
    if !is_in_check(board, color) {
        return false;
    }

    !candidate_moves(board, color).any(|mv| {
        let mut next = *board;
        next.apply(mv, None);
        !is_in_check(&next, color)
    })
}
