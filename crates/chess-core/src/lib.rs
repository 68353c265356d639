//! Core types for networked chess.
//!
//! This crate provides the fundamental types shared by the engine and the
//! network layer:
//! - [`Piece`], [`PieceKind`] and [`Color`] for piece representation
//! - [`Square`] for `(row, col)` board coordinates
//! - [`Move`] and its line-oriented wire format

mod color;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use mov::{Move, WireError, MAX_WIRE_LEN};
pub use piece::{Piece, PieceKind};
pub use square::Square;
