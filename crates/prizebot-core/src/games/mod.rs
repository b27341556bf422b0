//! Turn-based single-player game engines.

pub mod minesweeper;
pub mod tictactoe;

pub use minesweeper::Minesweeper;
pub use tictactoe::TicTacToe;

/// Zero-based `(row, column)` on a board.
pub type Coord = (usize, usize);

/// Result of a single move.
///
/// `Continue` covers both "move applied, game goes on" and every ignored
/// move (occupied cell, out of range, game already over).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Continue,
    Win,
    Lose,
    Draw,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Continue)
    }
}

/// Which game a session, button or event belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameKind {
    TicTacToe,
    Minesweeper,
}

impl GameKind {
    pub fn title(self) -> &'static str {
        match self {
            GameKind::TicTacToe => "Tic-tac-toe",
            GameKind::Minesweeper => "Minesweeper",
        }
    }
}
