//! Inline-keyboard callback payloads.
//!
//! Wire format (kept compatible with keyboards already sent to users):
//! `ttt_<row>_<col>`, `mine_<row>_<col>`, `game_ttt`, `game_mines`, `my_coupons`.

use crate::games::{Coord, GameKind};

pub const CHOOSE_TICTACTOE: &str = "game_ttt";
pub const CHOOSE_MINESWEEPER: &str = "game_mines";
pub const MY_COUPONS: &str = "my_coupons";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    ChooseGame(GameKind),
    Move(GameKind, Coord),
    MyCoupons,
}

impl CallbackAction {
    /// Parse a button payload; `None` for anything unrecognised.
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            CHOOSE_TICTACTOE => return Some(Self::ChooseGame(GameKind::TicTacToe)),
            CHOOSE_MINESWEEPER => return Some(Self::ChooseGame(GameKind::Minesweeper)),
            MY_COUPONS => return Some(Self::MyCoupons),
            _ => {}
        }

        let (prefix, rest) = data.split_once('_')?;
        let kind = match prefix {
            "ttt" => GameKind::TicTacToe,
            "mine" => GameKind::Minesweeper,
            _ => return None,
        };
        let (row, col) = rest.split_once('_')?;
        Some(Self::Move(kind, (parse_index(row)?, parse_index(col)?)))
    }

    pub fn encode(&self) -> String {
        match self {
            Self::ChooseGame(GameKind::TicTacToe) => CHOOSE_TICTACTOE.to_string(),
            Self::ChooseGame(GameKind::Minesweeper) => CHOOSE_MINESWEEPER.to_string(),
            Self::MyCoupons => MY_COUPONS.to_string(),
            Self::Move(kind, (row, col)) => format!("{}_{row}_{col}", move_prefix(*kind)),
        }
    }
}

fn move_prefix(kind: GameKind) -> &'static str {
    match kind {
        GameKind::TicTacToe => "ttt",
        GameKind::Minesweeper => "mine",
    }
}

// Digits only: `usize::from_str` would also accept a leading `+`.
fn parse_index(s: &str) -> Option<usize> {
    if s.is_empty() || s.len() > 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
