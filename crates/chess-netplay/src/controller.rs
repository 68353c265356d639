//! The single owner of the game.
//!
//! Local square selections, moves from the peer and clock ticks all arrive
//! as [`ControllerEvent`]s on one queue. [`GameController::run`] handles
//! them one at a time, so a move is validated, committed, post-processed
//! (castling, promotion), replicated and the clock reset before the next
//! event is looked at.

use crate::observer::GameObserver;
use crate::session::{Role, SessionError};
use chess_core::{Color, Move, Square};
use chess_engine::{Commit, Game, GameResult, MoveError, RemoteMoveError, Tick, TurnClock};
use std::ops::ControlFlow;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Work items for the controller.
#[derive(Debug)]
pub enum ControllerEvent {
    /// The local player picked a square.
    SquareSelected(Square),
    /// The peer committed a move.
    RemoteMove(Move),
    /// One clock period elapsed.
    Tick,
    /// The connection to the peer is gone.
    Disconnected(SessionError),
    /// The local player left.
    Quit,
}

pub struct GameController<O> {
    role: Role,
    game: Game,
    clock: TurnClock,
    selected: Option<Square>,
    outbound: mpsc::UnboundedSender<Move>,
    observer: O,
}

impl<O: GameObserver> GameController<O> {
    /// Creates a controller for a fresh game.
    ///
    /// Committed local moves are sent on `outbound`.
    pub fn new(
        role: Role,
        turn_seconds: u32,
        outbound: mpsc::UnboundedSender<Move>,
        observer: O,
    ) -> Self {
        GameController {
            role,
            game: Game::new(),
            clock: TurnClock::new(turn_seconds),
            selected: None,
            outbound,
            observer,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn clock(&self) -> &TurnClock {
        &self.clock
    }

    pub fn selected(&self) -> Option<Square> {
        self.selected
    }

    /// Publishes the initial board, clock and status.
    pub fn start(&mut self) {
        self.observer.on_board_changed(self.game.board());
        self.publish_clock();
        self.publish_turn();
    }

    /// Processes events until the local player quits or the queue closes.
    ///
    /// A transport failure, malformed record or desync ends the loop with
    /// an error; a peer that leaves after the game ended does not.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<ControllerEvent>,
    ) -> Result<(), SessionError> {
        self.start();
        while let Some(event) = events.recv().await {
            if self.handle(event)?.is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Handles one event.
    pub fn handle(&mut self, event: ControllerEvent) -> Result<ControlFlow<()>, SessionError> {
        match event {
            ControllerEvent::SquareSelected(sq) => self.on_square_selected(sq),
            ControllerEvent::RemoteMove(mv) => self.apply_remote(mv)?,
            ControllerEvent::Tick => self.on_tick(),
            ControllerEvent::Disconnected(err) => return self.on_disconnected(err),
            ControllerEvent::Quit => return Ok(ControlFlow::Break(())),
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Drives the local selection: first pick a piece, then its destination.
    pub fn on_square_selected(&mut self, sq: Square) {
        if let Some(result) = self.game.result() {
            self.observer.on_status_changed(&result.to_string());
            return;
        }
        let me = self.role.color();
        let turn = self.game.turn();
        if turn != me {
            self.observer.on_status_changed(&format!("Not your turn! Wait for {} to move.", turn));
            return;
        }

        let Some(from) = self.selected.take() else {
            if self.game.board().get(sq).is_some_and(|p| p.color == me) {
                self.selected = Some(sq);
                let targets = self.game.legal_targets(sq);
                self.observer.on_selection_changed(Some(sq), &targets);
            }
            return;
        };

        self.observer.on_selection_changed(None, &[]);
        if from == sq {
            return;
        }

        let mv = Move::new(from, sq);
        match self.game.play_local(mv) {
            Ok(commit) => {
                tracing::info!("{} played {}", me, mv);
                if self.outbound.send(mv).is_err() {
                    tracing::warn!("Connection writer is gone, {} was not sent", mv);
                }
                self.after_commit(commit);
            }
            Err(err) => {
                tracing::debug!("Rejected {}: {}", mv, err);
                let notice = match err {
                    MoveError::LeavesKingInCheck(_) => "Cannot move into check!".to_string(),
                    other => format!("Illegal move: {}", other),
                };
                self.observer.on_status_changed(&notice);
            }
        }
    }

    /// Commits a move from the peer without re-validating it.
    ///
    /// Moves arriving after the game ended are dropped. A move sent while
    /// it is our turn, or one that cannot be applied at all, means the
    /// boards diverged and is returned as an error.
    pub fn apply_remote(&mut self, mv: Move) -> Result<(), SessionError> {
        if self.game.is_game_over() {
            tracing::warn!("Ignoring {} received after the game ended", mv);
            return Ok(());
        }
        let turn = self.game.turn();
        if turn == self.role.color() {
            tracing::error!("Peer sent {} while it is our turn", mv);
            return Err(RemoteMoveError::OutOfTurn {
                square: mv.from(),
                turn,
            }
            .into());
        }
        let commit = self.game.play_remote(mv).map_err(|err| {
            tracing::error!("Cannot apply {} from peer: {}", mv, err);
            SessionError::from(err)
        })?;
        tracing::info!("{} played {}", commit.piece.color, mv);
        self.selected = None;
        self.after_commit(commit);
        Ok(())
    }

    /// Counts one second off the side to move and ends the game at zero.
    pub fn on_tick(&mut self) {
        match self.clock.tick() {
            Tick::Stopped => {}
            Tick::Running { .. } => self.publish_clock(),
            Tick::Expired { loser } => {
                let result = self.game.declare_timeout(loser);
                tracing::info!("{}'s clock ran out", loser);
                self.selected = None;
                self.publish_clock();
                self.finish(result);
            }
        }
    }

    fn on_disconnected(&mut self, err: SessionError) -> Result<ControlFlow<()>, SessionError> {
        self.clock.stop();
        if self.game.is_game_over() && matches!(err, SessionError::Closed) {
            tracing::info!("Peer left after the game ended");
            return Ok(ControlFlow::Break(()));
        }
        tracing::error!("Session ended: {}", err);
        self.observer.on_status_changed(&format!("Connection lost: {}", err));
        Err(err)
    }

    fn after_commit(&mut self, commit: Commit) {
        self.clock.on_commit(commit.piece.color);
        self.observer.on_board_changed(self.game.board());
        self.publish_clock();

        if let Some(result) = commit.result {
            self.clock.stop();
            self.finish(result);
        } else if commit.check {
            let turn = self.game.turn();
            tracing::info!("{} is in check", turn);
            self.observer.on_status_changed(&format!("Check to {}!", turn));
        } else {
            self.publish_turn();
        }
    }

    fn finish(&mut self, result: GameResult) {
        tracing::info!("Game over: {}", result);
        self.observer.on_game_over(&result);
        self.observer.on_status_changed(&result.to_string());
    }

    fn publish_clock(&mut self) {
        self.observer.on_clock_changed(
            self.clock.remaining(Color::White),
            self.clock.remaining(Color::Black),
        );
    }

    fn publish_turn(&mut self) {
        let status = format!(
            "You are playing as {} | Current turn: {}",
            self.role.color(),
            self.game.turn()
        );
        self.observer.on_status_changed(&status);
    }
}

/// Sends [`ControllerEvent::Tick`] once per clock period until the
/// controller goes away.
pub fn spawn_ticker(events: mpsc::Sender<ControllerEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = chess_engine::clock::TICK_PERIOD;
        let mut ticks = interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticks.tick().await;
            if events.send(ControllerEvent::Tick).await.is_err() {
                break;
            }
        }
    })
}
