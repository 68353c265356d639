//! Two-player chess over a single TCP connection.
//!
//! One peer hosts (White), the other joins (Black). Each side validates
//! its own moves with [`chess_engine::Game`], then sends them to the other
//! side as a `fr,fc,tr,tc` line; received moves are applied as-is.
//!
//! - [`config`] - `netplay.toml` and command-line overrides
//! - [`session`] - connection setup and the line reader/writer tasks
//! - [`controller`] - the task that owns the game and the clock
//! - [`observer`] - notifications to a front-end
//! - [`console`] - a terminal front-end

pub mod config;
pub mod console;
pub mod controller;
pub mod observer;
pub mod session;

pub use config::{Config, ConfigError};
pub use controller::{spawn_ticker, ControllerEvent, GameController};
pub use observer::{GameEvent, GameObserver};
pub use session::{Connection, Role, SessionError, SessionTasks};
