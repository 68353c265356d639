//! Notifications from the controller to a presentation layer.

use chess_core::Square;
use chess_engine::{Board, GameResult};
use tokio::sync::mpsc;

/// Receives everything a front-end needs to render the game.
///
/// The controller calls these while it holds the game, right after the
/// change they describe; implementations should return quickly.
pub trait GameObserver: Send {
    /// The board changed (a move was committed), or the game started.
    fn on_board_changed(&mut self, board: &Board);

    /// A user-facing message: turn line, check notice or a refused move.
    fn on_status_changed(&mut self, message: &str);

    /// The game ended. Called exactly once.
    fn on_game_over(&mut self, result: &GameResult);

    /// Remaining seconds for each side.
    fn on_clock_changed(&mut self, _white: u32, _black: u32) {}

    /// The local selection changed; `targets` are the legal destinations.
    fn on_selection_changed(&mut self, _selected: Option<Square>, _targets: &[Square]) {}
}

/// An owned copy of one observer notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    BoardChanged(Board),
    StatusChanged(String),
    GameOver(GameResult),
    ClockChanged { white: u32, black: u32 },
    SelectionChanged {
        selected: Option<Square>,
        targets: Vec<Square>,
    },
}

/// Forwards notifications to another task, e.g. a UI event loop.
///
/// A closed receiver is ignored: the game goes on without a display.
impl GameObserver for mpsc::UnboundedSender<GameEvent> {
    fn on_board_changed(&mut self, board: &Board) {
        self.send(GameEvent::BoardChanged(*board)).ok();
    }

    fn on_status_changed(&mut self, message: &str) {
        self.send(GameEvent::StatusChanged(message.to_string())).ok();
    }

    fn on_game_over(&mut self, result: &GameResult) {
        self.send(GameEvent::GameOver(*result)).ok();
    }

    fn on_clock_changed(&mut self, white: u32, black: u32) {
        self.send(GameEvent::ClockChanged { white, black }).ok();
    }

    fn on_selection_changed(&mut self, selected: Option<Square>, targets: &[Square]) {
        self.send(GameEvent::SelectionChanged {
            selected,
            targets: targets.to_vec(),
        })
        .ok();
    }
}
