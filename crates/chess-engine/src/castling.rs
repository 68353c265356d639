//! Castling rights bookkeeping and the castling move itself.
//!
//! The king's shape rule only allows single steps, so a two-square king
//! move is recognised here instead: [`is_castling_legal`] decides whether
//! it may be played locally, and [`apply_castling`] moves the rook once
//! the king has been committed.

use crate::check::{is_in_check, is_square_attacked};
use crate::shape::path_clear;
use crate::Board;
use chess_core::{Color, Move, Piece, PieceKind, Square};

const KING_COL: u8 = 4;

/// The wing a king castles towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CastleSide {
    Queenside = 0,
    Kingside = 1,
}

impl CastleSide {
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Column the rook starts on.
    pub const fn rook_col(self) -> u8 {
        match self {
            CastleSide::Queenside => 0,
            CastleSide::Kingside => 7,
        }
    }

    /// Column the king lands on.
    pub const fn king_target_col(self) -> u8 {
        match self {
            CastleSide::Queenside => 2,
            CastleSide::Kingside => 6,
        }
    }

    /// Column the rook lands on: the square the king crosses.
    pub const fn rook_target_col(self) -> u8 {
        match self {
            CastleSide::Queenside => 3,
            CastleSide::Kingside => 5,
        }
    }

    /// Recognises a two-square king move along `color`'s home row.
    pub fn from_king_move(color: Color, mv: Move) -> Option<Self> {
        let home = color.home_row();
        if mv.from().row() != home || mv.to().row() != home || mv.from().col() != KING_COL {
            return None;
        }
        [CastleSide::Queenside, CastleSide::Kingside]
            .into_iter()
            .find(|side| side.king_target_col() == mv.to().col())
    }

    fn rook_square(self, color: Color) -> Option<Square> {
        Square::new(color.home_row(), self.rook_col())
    }
}

/// Per-color record of whether the king and each rook have moved.
///
/// Flags only ever go from `false` to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights {
    king_moved: [bool; 2],
    rook_moved: [[bool; 2]; 2],
}

impl CastlingRights {
    /// Rights at the start of a game: nothing has moved.
    pub const fn new() -> Self {
        CastlingRights {
            king_moved: [false; 2],
            rook_moved: [[false; 2]; 2],
        }
    }

    #[inline]
    pub const fn king_moved(&self, color: Color) -> bool {
        self.king_moved[color.index()]
    }

    #[inline]
    pub const fn rook_moved(&self, color: Color, side: CastleSide) -> bool {
        self.rook_moved[color.index()][side.index()]
    }

    /// Returns true if neither the king nor the rook on `side` has moved.
    #[inline]
    pub const fn can_castle(&self, color: Color, side: CastleSide) -> bool {
        !self.king_moved(color) && !self.rook_moved(color, side)
    }

    pub fn set_king_moved(&mut self, color: Color) {
        self.king_moved[color.index()] = true;
    }

    pub fn set_rook_moved(&mut self, color: Color, side: CastleSide) {
        self.rook_moved[color.index()][side.index()] = true;
    }

    /// Updates the flags for a committed move of `piece`.
    ///
    /// Any king move marks the king; a move leaving or landing on a rook's
    /// home corner marks that rook, which also covers rooks being captured.
    pub fn record_move(&mut self, piece: Piece, mv: Move) {
        if piece.kind == PieceKind::King {
            self.set_king_moved(piece.color);
        }
        for color in Color::ALL {
            for side in [CastleSide::Queenside, CastleSide::Kingside] {
                let corner = side.rook_square(color);
                if corner == Some(mv.from()) || corner == Some(mv.to()) {
                    self.set_rook_moved(color, side);
                }
            }
        }
    }
}

/// Returns true if `mv` is a castling move `color` may play right now.
///
/// Requires the king on its home square with the matching rook beside the
/// empty squares in between, both unmoved, and the king neither in check
/// nor crossing or landing on an attacked square.
pub fn is_castling_legal(board: &Board, rights: &CastlingRights, mv: Move) -> bool {
    let Some(king) = board.get(mv.from()) else {
        return false;
    };
    if king.kind != PieceKind::King {
        return false;
    }
    let color = king.color;
    let Some(side) = CastleSide::from_king_move(color, mv) else {
        return false;
    };
    if !rights.can_castle(color, side) {
        return false;
    }
    let Some(rook_sq) = side.rook_square(color) else {
        return false;
    };
    if board.get(rook_sq) != Some(Piece::new(color, PieceKind::Rook)) {
        return false;
    }
    if !path_clear(board, mv.from(), rook_sq) || is_in_check(board, color) {
        return false;
    }

    let home = color.home_row();
    let crossed = Square::new(home, side.rook_target_col());
    let landing = Square::new(home, side.king_target_col());
    [crossed, landing]
        .into_iter()
        .flatten()
        .all(|sq| !is_square_attacked(board, sq, color.opposite()))
}

/// Moves the rook for a king that has just castled.
///
/// Called after the king's move was applied. Does nothing unless `piece`
/// is a king and `mv` is a two-square move along its home row. Returns the
/// side castled to.
pub fn apply_castling(
    board: &mut Board,
    rights: &mut CastlingRights,
    piece: Piece,
    mv: Move,
) -> Option<CastleSide> {
    if piece.kind != PieceKind::King {
        return None;
    }
    let side = CastleSide::from_king_move(piece.color, mv)?;
    let home = piece.color.home_row();
    let rook_from = Square::new(home, side.rook_col())?;
    let rook_to = Square::new(home, side.rook_target_col())?;

    board.apply(Move::new(rook_from, rook_to), None);
    rights.set_king_moved(piece.color);
    rights.set_rook_moved(piece.color, side);
    Some(side)
}
