//! Turn-aware game state.
//!
//! [`Game`] owns the board, the side to move, castling rights and the
//! result. It is the only place a committed move mutates the board:
//! - [`Game::play_local`] fully validates a move before committing it
//! - [`Game::play_remote`] commits a move from the trusted peer as-is
//!
//! Both paths run the same commit step, so castling, promotion and the
//! checkmate test behave identically on the two peers.

use crate::castling::{apply_castling, is_castling_legal, CastleSide, CastlingRights};
use crate::check::{is_checkmate, is_in_check};
use crate::promotion::apply_promotion;
use crate::shape::is_legal_shape;
use crate::Board;
use chess_core::{Color, Move, Piece, Square};
use std::fmt;
use thiserror::Error;

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinReason {
    Checkmate,
    /// The loser's turn clock ran out.
    Timeout,
}

/// Outcome of a finished game. There are no draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub winner: Color,
    pub reason: WinReason,
}

impl GameResult {
    #[inline]
    pub const fn loser(self) -> Color {
        self.winner.opposite()
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            WinReason::Checkmate => write!(f, "Checkmate! {} wins!", self.winner),
            WinReason::Timeout => {
                write!(f, "{}'s time is up! {} wins!", self.loser(), self.winner)
            }
        }
    }
}

/// Reasons a locally attempted move is refused.
///
/// None of these change the game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("game has already ended")]
    GameOver,

    #[error("no piece on {0}")]
    EmptySquare(Square),

    #[error("the piece on {square} is not {turn}'s")]
    NotYourPiece { square: Square, turn: Color },

    #[error("cannot capture your own piece on {0}")]
    OwnPieceCapture(Square),

    #[error("illegal move: {0}")]
    IllegalShape(Move),

    #[error("cannot move into check: {0}")]
    LeavesKingInCheck(Move),
}

/// Reasons a move from the peer cannot be applied.
///
/// The peer is trusted, so any of these means the two boards have diverged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteMoveError {
    #[error("game has already ended")]
    GameOver,

    #[error("peer moved from empty square {0}")]
    EmptySquare(Square),

    #[error("peer moved a piece on {square} while it is {turn}'s turn")]
    OutOfTurn { square: Square, turn: Color },
}

/// Everything a committed move did to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commit {
    pub mv: Move,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub castled: Option<CastleSide>,
    pub promoted: bool,
    /// The side now to move is in check.
    pub check: bool,
    /// Set when the move delivered checkmate.
    pub result: Option<GameResult>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    turn: Color,
    rights: CastlingRights,
    result: Option<GameResult>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a game in the standard starting position, White to move.
    pub fn new() -> Self {
        Self::from_board(Board::standard(), Color::White)
    }

    /// Creates a game from an arbitrary board with untouched castling rights.
    pub fn from_board(board: Board, turn: Color) -> Self {
        Game {
            board,
            turn,
            rights: CastlingRights::new(),
            result: None,
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The side to move.
    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    #[inline]
    pub fn castling_rights(&self) -> &CastlingRights {
        &self.rights
    }

    #[inline]
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.result.is_some()
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        is_in_check(&self.board, self.turn)
    }

    /// Checks a local move without committing it.
    ///
    /// The move must move a piece of the side to move, must not land on a
    /// friendly piece, must match the piece's shape (or be a legal castle),
    /// and must not leave the mover's king in check.
    pub fn validate(&self, mv: Move) -> Result<(), MoveError> {
        if self.is_game_over() {
            return Err(MoveError::GameOver);
        }
        let piece = self
            .board
            .get(mv.from())
            .ok_or(MoveError::EmptySquare(mv.from()))?;
        if piece.color != self.turn {
            return Err(MoveError::NotYourPiece {
                square: mv.from(),
                turn: self.turn,
            });
        }
        if self
            .board
            .get(mv.to())
            .is_some_and(|target| target.color == piece.color)
        {
            return Err(MoveError::OwnPieceCapture(mv.to()));
        }
        if !is_legal_shape(&self.board, mv.from(), mv.to())
            && !is_castling_legal(&self.board, &self.rights, mv)
        {
            return Err(MoveError::IllegalShape(mv));
        }

        let mut simulated = self.board;
        simulated.apply(mv, None);
        if is_in_check(&simulated, piece.color) {
            return Err(MoveError::LeavesKingInCheck(mv));
        }
        Ok(())
    }

    /// Lists the squares the piece on `from` may legally move to.
    pub fn legal_targets(&self, from: Square) -> Vec<Square> {
        Square::all()
            .filter(|&to| self.validate(Move::new(from, to)).is_ok())
            .collect()
    }

    /// Validates and commits a move made by the local player.
    pub fn play_local(&mut self, mv: Move) -> Result<Commit, MoveError> {
        self.validate(mv)?;
        let piece = self
            .board
            .get(mv.from())
            .ok_or(MoveError::EmptySquare(mv.from()))?;
        Ok(self.commit(piece, mv))
    }

    /// Commits a move received from the peer without checking its legality.
    ///
    /// Only the bookkeeping a commit cannot do without is checked: the game
    /// is still on, and the source holds a piece of the side to move.
    pub fn play_remote(&mut self, mv: Move) -> Result<Commit, RemoteMoveError> {
        if self.is_game_over() {
            return Err(RemoteMoveError::GameOver);
        }
        let piece = self
            .board
            .get(mv.from())
            .ok_or(RemoteMoveError::EmptySquare(mv.from()))?;
        if piece.color != self.turn {
            return Err(RemoteMoveError::OutOfTurn {
                square: mv.from(),
                turn: self.turn,
            });
        }
        Ok(self.commit(piece, mv))
    }

    /// Ends the game because `loser`'s clock ran out.
    ///
    /// An already finished game keeps its result.
    pub fn declare_timeout(&mut self, loser: Color) -> GameResult {
        *self.result.get_or_insert(GameResult {
            winner: loser.opposite(),
            reason: WinReason::Timeout,
        })
    }

    fn commit(&mut self, piece: Piece, mv: Move) -> Commit {
        let captured = self.board.apply(mv, None);
        self.rights.record_move(piece, mv);
        let castled = apply_castling(&mut self.board, &mut self.rights, piece, mv);
        let promoted = apply_promotion(&mut self.board, mv.to());
        self.turn = self.turn.opposite();

        let check = is_in_check(&self.board, self.turn);
        if check && is_checkmate(&self.board, self.turn) {
            self.result = Some(GameResult {
                winner: piece.color,
                reason: WinReason::Checkmate,
            });
        }

        Commit {
            mv,
            piece,
            captured,
            castled,
            promoted,
            check,
            result: self.result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::PieceKind;
    use proptest::prelude::*;

    fn sq(row: u8, col: u8) -> Square {
        Square::new(row, col).unwrap()
    }

    fn mv(fr: u8, fc: u8, tr: u8, tc: u8) -> Move {
        Move::new(sq(fr, fc), sq(tr, tc))
    }

    fn assert_one_king_each(game: &Game) {
        for color in Color::ALL {
            assert_eq!(
                game.board().count(Piece::new(color, PieceKind::King)),
                1,
                "{} must have exactly one king",
                color
            );
        }
    }

    #[test]
    fn new_game() {
        let game = Game::new();
        assert_eq!(game.turn(), Color::White);
        assert!(!game.is_game_over());
        assert!(!game.is_check());
        assert_eq!(game.castling_rights(), &CastlingRights::new());
        assert_one_king_each(&game);
    }

    #[test]
    fn opening_pawn_push() {
        let mut game = Game::new();
        let commit = game.play_local(mv(6, 4, 4, 4)).unwrap();
        assert_eq!(commit.captured, None);
        assert!(!commit.check);
        assert!(!is_in_check(game.board(), Color::White));
        assert_eq!(game.turn(), Color::Black);
        assert_eq!(
            game.board().get(sq(4, 4)),
            Some(Piece::new(Color::White, PieceKind::Pawn))
        );
    }

    #[test]
    fn turn_alternates_and_survives_rejections() {
        let mut game = Game::new();
        assert!(game.play_local(mv(6, 4, 3, 4)).is_err());
        assert_eq!(game.turn(), Color::White);
        game.play_local(mv(6, 4, 4, 4)).unwrap();
        assert_eq!(game.turn(), Color::Black);
        // White cannot move twice.
        assert!(matches!(
            game.play_local(mv(6, 3, 4, 3)),
            Err(MoveError::NotYourPiece { .. })
        ));
        assert_eq!(game.turn(), Color::Black);
        game.play_local(mv(1, 4, 3, 4)).unwrap();
        assert_eq!(game.turn(), Color::White);
    }

    #[test]
    fn own_piece_capture_rejected_for_every_kind() {
        let game = Game::new();
        let attempts = [
            mv(6, 0, 7, 0), // pawn onto rook
            mv(7, 0, 6, 0), // rook onto pawn
            mv(7, 1, 6, 3), // knight onto pawn
            mv(7, 2, 6, 1), // bishop onto pawn
            mv(7, 3, 7, 4), // queen onto king
            mv(7, 4, 7, 5), // king onto bishop
        ];
        for attempt in attempts {
            assert_eq!(
                game.validate(attempt),
                Err(MoveError::OwnPieceCapture(attempt.to())),
                "{:?}",
                attempt
            );
        }
    }

    #[test]
    fn empty_square_rejected() {
        let mut game = Game::new();
        assert_eq!(
            game.play_local(mv(4, 4, 3, 4)),
            Err(MoveError::EmptySquare(sq(4, 4)))
        );
    }

    #[test]
    fn move_into_check_rejected_and_board_unchanged() {
        // The e2 pawn is pinned against the king by the rook on e8.
        let board = Board::from_rows([
            "....r..k", "........", "........", "........", "........", "...p....", "....P...",
            "....K...",
        ])
        .unwrap();
        let mut game = Game::from_board(board, Color::White);
        let before = game.clone();

        let pinned_capture = mv(6, 4, 5, 3);
        assert_eq!(
            game.play_local(pinned_capture),
            Err(MoveError::LeavesKingInCheck(pinned_capture))
        );
        assert_eq!(game, before);

        // Pushing the pinned pawn along the file keeps the king covered.
        let mut game = Game::from_board(board, Color::White);
        game.play_local(mv(6, 4, 5, 4)).unwrap();
        assert_eq!(game.board().get(sq(5, 4)).map(|p| p.kind), Some(PieceKind::Pawn));
    }

    #[test]
    fn fools_mate() {
        let mut game = Game::new();
        game.play_local(mv(6, 5, 5, 5)).unwrap();
        game.play_local(mv(1, 4, 3, 4)).unwrap();
        game.play_local(mv(6, 6, 4, 6)).unwrap();
        let commit = game.play_local(mv(0, 3, 4, 7)).unwrap();

        let expected = GameResult {
            winner: Color::Black,
            reason: WinReason::Checkmate,
        };
        assert!(commit.check);
        assert_eq!(commit.result, Some(expected));
        assert_eq!(game.result(), Some(expected));
        assert!(is_checkmate(game.board(), Color::White));
        assert_eq!(game.play_local(mv(6, 0, 5, 0)), Err(MoveError::GameOver));
        assert_eq!(expected.to_string(), "Checkmate! Black wins!");
    }

    #[test]
    fn promotion_in_same_commit() {
        let board = Board::from_rows([
            "....k...", "P.......", "........", "........", "........", "........", "........",
            "....K...",
        ])
        .unwrap();
        let mut game = Game::from_board(board, Color::White);
        let commit = game.play_local(mv(1, 0, 0, 0)).unwrap();
        assert!(commit.promoted);
        assert_eq!(
            game.board().get(sq(0, 0)),
            Some(Piece::new(Color::White, PieceKind::Queen))
        );

        let mut expected = board;
        expected.set(sq(1, 0), None);
        expected.set(sq(0, 0), Some(Piece::new(Color::White, PieceKind::Queen)));
        assert_eq!(game.board(), &expected);
        // The new queen checks along the back rank.
        assert!(commit.check);
        assert_one_king_each(&game);
    }

    #[test]
    fn castling_through_local_path() {
        let board = Board::from_rows([
            "r...k..r", "pppppppp", "........", "........", "........", "........", "PPPPPPPP",
            "R...K..R",
        ])
        .unwrap();
        let mut game = Game::from_board(board, Color::White);
        let commit = game.play_local(mv(7, 4, 7, 6)).unwrap();
        assert_eq!(commit.castled, Some(CastleSide::Kingside));
        assert_eq!(
            game.board().get(sq(7, 5)),
            Some(Piece::new(Color::White, PieceKind::Rook))
        );
        assert!(game.board().is_empty(sq(7, 7)));
        assert!(game.castling_rights().king_moved(Color::White));

        let commit = game.play_local(mv(0, 4, 0, 2)).unwrap();
        assert_eq!(commit.castled, Some(CastleSide::Queenside));
        assert_eq!(
            game.board().get(sq(0, 3)),
            Some(Piece::new(Color::Black, PieceKind::Rook))
        );
    }

    #[test]
    fn castling_refused_after_king_returns_home() {
        let board = Board::from_rows([
            "....k...", "........", "........", "........", "........", "........", "........",
            "R...K..R",
        ])
        .unwrap();
        let mut game = Game::from_board(board, Color::White);
        game.play_local(mv(7, 4, 7, 5)).unwrap();
        game.play_local(mv(0, 4, 0, 3)).unwrap();
        game.play_local(mv(7, 5, 7, 4)).unwrap();
        game.play_local(mv(0, 3, 0, 4)).unwrap();
        assert!(game.castling_rights().king_moved(Color::White));
        assert_eq!(
            game.play_local(mv(7, 4, 7, 6)),
            Err(MoveError::IllegalShape(mv(7, 4, 7, 6)))
        );
    }

    #[test]
    fn remote_move_skips_validation() {
        let mut game = Game::new();
        // A pawn jumping three squares would be refused locally.
        let commit = game.play_remote(mv(6, 0, 3, 0)).unwrap();
        assert_eq!(commit.piece, Piece::new(Color::White, PieceKind::Pawn));
        assert_eq!(game.turn(), Color::Black);
        assert!(game.board().is_empty(sq(6, 0)));
    }

    #[test]
    fn remote_move_desync_errors() {
        let mut game = Game::new();
        assert_eq!(
            game.play_remote(mv(4, 4, 3, 4)),
            Err(RemoteMoveError::EmptySquare(sq(4, 4)))
        );
        assert_eq!(
            game.play_remote(mv(1, 4, 3, 4)),
            Err(RemoteMoveError::OutOfTurn {
                square: sq(1, 4),
                turn: Color::White
            })
        );
        assert_eq!(game, Game::new());
    }

    #[test]
    fn remote_move_castles() {
        let board = Board::from_rows([
            "r...k..r", "pppppppp", "........", "........", "........", "........", "PPPPPPPP",
            "R...K..R",
        ])
        .unwrap();
        let mut game = Game::from_board(board, Color::White);

        let commit = game.play_remote(mv(7, 4, 7, 6)).unwrap();
        assert_eq!(commit.castled, Some(CastleSide::Kingside));
        assert_eq!(
            game.board().get(sq(7, 5)),
            Some(Piece::new(Color::White, PieceKind::Rook))
        );
        assert!(game.board().is_empty(sq(7, 7)));
        assert!(game.castling_rights().king_moved(Color::White));
        assert!(game
            .castling_rights()
            .rook_moved(Color::White, CastleSide::Kingside));

        let commit = game.play_remote(mv(0, 4, 0, 2)).unwrap();
        assert_eq!(commit.castled, Some(CastleSide::Queenside));
        assert_eq!(
            game.board().get(sq(0, 3)),
            Some(Piece::new(Color::Black, PieceKind::Rook))
        );
        assert!(game.board().is_empty(sq(0, 0)));
        assert_one_king_each(&game);
    }

    #[test]
    fn remote_move_promotes() {
        let board = Board::from_rows([
            "....k...", ".P......", "........", "........", "........", "........", "........",
            "....K...",
        ])
        .unwrap();
        let mut game = Game::from_board(board, Color::White);

        let commit = game.play_remote(mv(1, 1, 0, 1)).unwrap();
        assert!(commit.promoted);
        let expected = Board::from_rows([
            ".Q..k...", "........", "........", "........", "........", "........", "........",
            "....K...",
        ])
        .unwrap();
        assert_eq!(game.board(), &expected);
        // The queen checks along the back rank; the king can still step away.
        assert!(commit.check);
        assert_eq!(commit.result, None);
    }

    #[test]
    fn remote_move_detects_checkmate() {
        let mut game = Game::new();
        game.play_remote(mv(6, 5, 5, 5)).unwrap();
        game.play_remote(mv(1, 4, 3, 4)).unwrap();
        game.play_remote(mv(6, 6, 4, 6)).unwrap();
        let commit = game.play_remote(mv(0, 3, 4, 7)).unwrap();
        assert_eq!(
            commit.result,
            Some(GameResult {
                winner: Color::Black,
                reason: WinReason::Checkmate
            })
        );
        assert_eq!(game.play_remote(mv(6, 0, 5, 0)), Err(RemoteMoveError::GameOver));
    }

    #[test]
    fn timeout_result() {
        let mut game = Game::new();
        let result = game.declare_timeout(Color::White);
        assert_eq!(result.winner, Color::Black);
        assert_eq!(result.reason, WinReason::Timeout);
        assert_eq!(result.to_string(), "White's time is up! Black wins!");
        assert!(game.is_game_over());
        assert_eq!(game.play_local(mv(6, 4, 4, 4)), Err(MoveError::GameOver));

        // The first result sticks.
        assert_eq!(game.declare_timeout(Color::Black), result);
    }

    #[test]
    fn legal_targets_from_start() {
        let game = Game::new();
        assert_eq!(game.legal_targets(sq(6, 4)), vec![sq(4, 4), sq(5, 4)]);
        assert_eq!(game.legal_targets(sq(7, 6)), vec![sq(5, 5), sq(5, 7)]);
        assert!(game.legal_targets(sq(7, 0)).is_empty());
        assert!(game.legal_targets(sq(1, 0)).is_empty());
    }

    #[test]
    fn castling_rights_never_reset() {
        let mut game = Game::new();
        let moves = [
            mv(6, 7, 4, 7),
            mv(1, 0, 3, 0),
            mv(7, 7, 5, 7),
            mv(0, 0, 2, 0),
            mv(5, 7, 7, 7),
            mv(2, 0, 0, 0),
        ];
        let mut seen = CastlingRights::new();
        for m in moves {
            game.play_local(m).unwrap();
            let now = *game.castling_rights();
            for color in Color::ALL {
                for side in [CastleSide::Queenside, CastleSide::Kingside] {
                    if seen.rook_moved(color, side) {
                        assert!(now.rook_moved(color, side));
                    }
                }
            }
            seen = now;
        }
        assert!(seen.rook_moved(Color::White, CastleSide::Kingside));
        assert!(seen.rook_moved(Color::Black, CastleSide::Queenside));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn random_games_keep_invariants(
            turns in proptest::collection::vec(
                (any::<u16>(), any::<u16>(), 0u8..64, 0u8..64),
                1..150,
            )
        ) {
            let mut game = Game::new();
            let mut rights = *game.castling_rights();
            for (piece_pick, target_pick, raw_from, raw_to) in turns {
                // An arbitrary attempt that fails validation changes nothing.
                let raw = Move::new(
                    Square::from_index(raw_from).unwrap(),
                    Square::from_index(raw_to).unwrap(),
                );
                if game.validate(raw).is_err() {
                    let before = game.clone();
                    prop_assert!(game.play_local(raw).is_err());
                    prop_assert_eq!(&game, &before);
                }

                let movers: Vec<Square> = game
                    .board()
                    .pieces_of(game.turn())
                    .map(|(sq, _)| sq)
                    .collect();
                let start = piece_pick as usize % movers.len();
                let choice = (0..movers.len())
                    .map(|i| movers[(start + i) % movers.len()])
                    .find_map(|from| {
                        let targets = game.legal_targets(from);
                        let to = *targets.get(target_pick as usize % targets.len().max(1))?;
                        Some(Move::new(from, to))
                    });
                // No legal move left: stalemate, which is not scored.
                let Some(mv) = choice else { break };

                let mover = game.turn();
                prop_assert!(game.play_local(mv).is_ok(), "{} was listed as legal", mv);
                prop_assert_eq!(game.turn(), mover.opposite());
                prop_assert!(!is_in_check(game.board(), mover));
                assert_one_king_each(&game);

                let now = *game.castling_rights();
                for color in Color::ALL {
                    prop_assert!(!rights.king_moved(color) || now.king_moved(color));
                    for side in [CastleSide::Queenside, CastleSide::Kingside] {
                        let was = rights.rook_moved(color, side);
                        prop_assert!(!was || now.rook_moved(color, side));
                    }
                }
                rights = now;

                if game.is_game_over() {
                    break;
                }
            }
        }
    }
}
