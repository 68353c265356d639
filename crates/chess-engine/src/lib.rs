//! Rules engine for two-player networked chess.
//!
//! This crate provides:
//! - [`Board`] - 8x8 mailbox board, copied freely to simulate moves
//! - [`is_legal_shape`] - per-piece geometric move rules
//! - [`is_in_check`] / [`is_checkmate`] - king safety
//! - [`CastlingRights`] and the castling / promotion handlers
//! - [`TurnClock`] - per-turn countdown
//! - [`Game`] - the side to move, rights and result around a board
//!
//! # Example
//!
//! ```
//! use chess_core::{Move, Square};
//! use chess_engine::Game;
//!
//! let mut game = Game::new();
//! let e2 = Square::from_algebraic("e2").unwrap();
//! let e4 = Square::from_algebraic("e4").unwrap();
//! game.play_local(Move::new(e2, e4)).unwrap();
//! assert!(!game.is_check());
//! ```

mod board;
pub mod castling;
pub mod check;
pub mod clock;
mod game;
pub mod promotion;
pub mod shape;

pub use board::Board;
pub use castling::{CastleSide, CastlingRights};
pub use check::{is_checkmate, is_in_check};
pub use clock::{Tick, TurnClock, DEFAULT_TURN_SECONDS};
pub use game::{Commit, Game, GameResult, MoveError, RemoteMoveError, WinReason};
pub use shape::is_legal_shape;
