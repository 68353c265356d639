//! Per-turn countdown clock.
//!
//! Each side has its own counter of whole seconds. Only the side on turn
//! counts down; a committed move refills the mover's counter and hands the
//! countdown to the opponent. The clock is driven by an external one-second
//! tick so it stays deterministic under test.

use chess_core::Color;
use std::time::Duration;

/// Seconds each side gets per turn unless configured otherwise.
pub const DEFAULT_TURN_SECONDS: u32 = 20;

/// Period between ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// `color`'s counter went down and still has `remaining` seconds.
    Running { color: Color, remaining: u32 },
    /// `loser`'s counter reached zero; the clock is now stopped for good.
    Expired { loser: Color },
    /// The clock was already stopped.
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnClock {
    budget: u32,
    remaining: [u32; 2],
    active: Color,
    running: bool,
}

impl TurnClock {
    /// Creates a running clock with White to move and both counters full.
    pub fn new(budget: u32) -> Self {
        TurnClock {
            budget,
            remaining: [budget; 2],
            active: Color::White,
            running: true,
        }
    }

    #[inline]
    pub fn remaining(&self, color: Color) -> u32 {
        self.remaining[color.index()]
    }

    /// The color currently counting down.
    #[inline]
    pub fn active(&self) -> Color {
        self.active
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Counts one second off the active side.
    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Stopped;
        }
        let color = self.active;
        let counter = &mut self.remaining[color.index()];
        *counter = counter.saturating_sub(1);
        if *counter == 0 {
            self.running = false;
            Tick::Expired { loser: color }
        } else {
            Tick::Running {
                color,
                remaining: *counter,
            }
        }
    }

    /// Refills `mover`'s counter and starts the opponent's countdown.
    ///
    /// Has no effect once the clock has stopped.
    pub fn on_commit(&mut self, mover: Color) {
        if !self.running {
            return;
        }
        self.remaining[mover.index()] = self.budget;
        self.active = mover.opposite();
    }

    /// Stops the clock permanently.
    pub fn stop(&mut self) {
        self.running = false;
    }
}

impl Default for TurnClock {
    fn default() -> Self {
        Self::new(DEFAULT_TURN_SECONDS)
    }
}
