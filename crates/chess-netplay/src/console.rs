//! A terminal front-end: prints the board and reads squares from stdin.

use crate::controller::ControllerEvent;
use crate::observer::GameObserver;
use chess_core::{Color, Square};
use chess_engine::{Board, GameResult};
use std::io::{self, BufRead};
use std::thread;
use tokio::sync::mpsc;

/// Parses a square typed by the player: `e2`, `6,4` or `6 4` (row, col).
pub fn parse_square(input: &str) -> Option<Square> {
    let input = input.trim();
    if let Some(sq) = Square::from_algebraic(&input.to_ascii_lowercase()) {
        return Some(sq);
    }
    let mut parts = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());
    let row = parts.next()?.parse().ok()?;
    let col = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Square::new(row, col)
}

/// Draws `board` from `perspective`'s side, marking the selected square
/// with brackets and its legal targets with `*`.
pub fn render_board(
    board: &Board,
    perspective: Color,
    selected: Option<Square>,
    targets: &[Square],
) -> String {
    // Rows and columns both run backwards when seen from Black's side.
    let order: Vec<u8> = match perspective {
        Color::White => (0..8).collect(),
        Color::Black => (0..8).rev().collect(),
    };
    let (rows, cols) = (&order, &order);

    let files: String = cols
        .iter()
        .map(|&col| format!(" {} ", (b'a' + col) as char))
        .collect();
    let files = format!("   {}", files);

    let mut out = String::new();
    out.push_str(&files);
    out.push('\n');
    for &row in rows {
        let rank = 8 - row;
        out.push_str(&format!(" {} ", rank));
        for sq in cols.iter().filter_map(|&col| Square::new(row, col)) {
            let symbol = board.get(sq).map_or('.', |p| p.symbol());
            let cell = if selected == Some(sq) {
                format!("[{}]", symbol)
            } else if targets.contains(&sq) {
                format!(" {}*", symbol)
            } else {
                format!(" {} ", symbol)
            };
            out.push_str(&cell);
        }
        out.push_str(&format!(" {}\n", rank));
    }
    out.push_str(&files);
    out
}

/// Prints every notification to stdout.
pub struct ConsoleObserver {
    perspective: Color,
    board: Board,
    selected: Option<Square>,
    targets: Vec<Square>,
}

impl ConsoleObserver {
    pub fn new(perspective: Color) -> Self {
        ConsoleObserver {
            perspective,
            board: Board::standard(),
            selected: None,
            targets: Vec::new(),
        }
    }

    fn draw(&self) {
        println!(
            "\n{}",
            render_board(&self.board, self.perspective, self.selected, &self.targets)
        );
    }
}

impl GameObserver for ConsoleObserver {
    fn on_board_changed(&mut self, board: &Board) {
        self.board = *board;
        self.selected = None;
        self.targets.clear();
        self.draw();
    }

    fn on_status_changed(&mut self, message: &str) {
        println!("{}", message);
    }

    fn on_game_over(&mut self, result: &GameResult) {
        let outcome = if result.winner == self.perspective {
            "You win."
        } else {
            "You lose."
        };
        println!("*** {} Type 'quit' to leave. ***", outcome);
    }

    fn on_clock_changed(&mut self, white: u32, black: u32) {
        tracing::trace!("Clock: White {}s, Black {}s", white, black);
        let mine = match self.perspective {
            Color::White => white,
            Color::Black => black,
        };
        // Only nag near the end of the budget.
        if mine > 0 && mine <= 5 {
            println!("{}s left!", mine);
        }
    }

    fn on_selection_changed(&mut self, selected: Option<Square>, targets: &[Square]) {
        self.selected = selected;
        self.targets = targets.to_vec();
        if let Some(sq) = selected {
            let list: Vec<String> = targets.iter().map(|t| t.to_string()).collect();
            println!("Selected {}: {}", sq, list.join(" "));
            self.draw();
        }
    }
}

/// Reads squares from stdin on a dedicated thread and forwards them as
/// selections.
///
/// `quit` (or end of input) sends [`ControllerEvent::Quit`].
pub fn spawn_input(events: mpsc::Sender<ControllerEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let event = match line {
                Ok(line) => match line.trim() {
                    "" => continue,
                    "quit" | "exit" => ControllerEvent::Quit,
                    input => match parse_square(input) {
                        Some(sq) => ControllerEvent::SquareSelected(sq),
                        None => {
                            println!("Enter a square like e2 or 6,4 (row,col), or 'quit'.");
                            continue;
                        }
                    },
                },
                Err(e) => {
                    tracing::error!("Failed to read stdin: {}", e);
                    ControllerEvent::Quit
                }
            };
            let quit = matches!(event, ControllerEvent::Quit);
            if events.blocking_send(event).is_err() || quit {
                return;
            }
        }
        events.blocking_send(ControllerEvent::Quit).ok();
    })
}
