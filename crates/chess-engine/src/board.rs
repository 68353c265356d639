//! Mailbox board representation.

use chess_core::{Color, Move, Piece, PieceKind, Square};
use std::fmt;

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// An 8x8 grid of optional pieces.
///
/// `Board` is a plain value: copying it yields a fully independent
/// snapshot, which is how moves are simulated without touching the live
/// game. No legality is checked at this level.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Option<Piece>; 64],
}

impl Board {
    /// Creates a board with no pieces.
    pub const fn empty() -> Self {
        Board { cells: [None; 64] }
    }

    /// Creates the standard starting position. Black occupies rows 0-1,
    /// White rows 6-7.
    pub fn standard() -> Self {
        let mut board = Board::empty();
        for color in Color::ALL {
            for (col, kind) in BACK_RANK.iter().enumerate() {
                board.put_at(color.home_row(), col as u8, Piece::new(color, *kind));
                board.put_at(color.pawn_row(), col as u8, Piece::new(color, PieceKind::Pawn));
            }
        }
        board
    }

    /// Builds a board from eight rows of piece symbols, row 0 first.
    ///
    /// Uppercase letters are White, lowercase Black, `.` is an empty square.
    /// Returns `None` if a row is not exactly eight known symbols.
    pub fn from_rows(rows: [&str; 8]) -> Option<Self> {
        let mut board = Board::empty();
        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != 8 {
                return None;
            }
            for (col, c) in line.chars().enumerate() {
                if c == '.' {
                    continue;
                }
                board.put_at(row as u8, col as u8, Piece::from_symbol(c)?);
            }
        }
        Some(board)
    }

    fn put_at(&mut self, row: u8, col: u8, piece: Piece) {
        self.cells[(row * 8 + col) as usize] = Some(piece);
    }

    /// Returns the piece on a square, if any.
    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.index() as usize]
    }

    /// Places (or clears, with `None`) a square.
    #[inline]
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.cells[sq.index() as usize] = piece;
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.get(sq).is_none()
    }

    /// Relocates whatever stands on `from` to `to`, clearing the source.
    ///
    /// Anything on the destination is overwritten and returned as the
    /// captured piece. With `promotion` set, the arriving piece becomes that
    /// kind (keeping its color). An empty source clears the destination.
    pub fn apply(&mut self, mv: Move, promotion: Option<PieceKind>) -> Option<Piece> {
        let moving = self.get(mv.from()).map(|piece| match promotion {
            Some(kind) => Piece::new(piece.color, kind),
            None => piece,
        });
        let captured = self.get(mv.to());
        self.set(mv.from(), None);
        self.set(mv.to(), moving);
        captured
    }

    /// Iterates over every occupied square.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.get(sq).map(|piece| (sq, piece)))
    }

    /// Iterates over the squares holding pieces of one color.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.color == color)
    }

    /// Returns the square of `color`'s king, if it is on the board.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    /// Counts the pieces equal to `piece`.
    pub fn count(&self, piece: Piece) -> usize {
        self.cells.iter().filter(|cell| **cell == Some(piece)).count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..8u8 {
            for col in 0..8u8 {
                let c = Square::new(row, col)
                    .and_then(|sq| self.get(sq))
                    .map_or('.', Piece::symbol);
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board(\n{})", self)
    }
}
