//! Text and keyboards the bot shows; all output is Telegram HTML.

use crate::{
    callback::{CallbackAction, CHOOSE_MINESWEEPER, CHOOSE_TICTACTOE, MY_COUPONS},
    formatting::{escape_html, pre},
    games::{
        minesweeper::CellView, tictactoe::Cell, GameKind, Minesweeper, TicTacToe,
    },
    messaging::types::{InlineButton, InlineKeyboard},
    registry::ActiveGame,
    store::CouponRecord,
};

const HIDDEN: &str = "⬜";

/// Render directive handed back to the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Send a new message.
    Send {
        html: String,
        keyboard: Option<InlineKeyboard>,
    },
    /// Edit the message whose button was pressed.
    Edit {
        html: String,
        keyboard: Option<InlineKeyboard>,
    },
}

impl Reply {
    pub fn text(html: impl Into<String>) -> Self {
        Reply::Send {
            html: html.into(),
            keyboard: None,
        }
    }

    pub fn with_menu(html: impl Into<String>) -> Self {
        Reply::Send {
            html: html.into(),
            keyboard: Some(main_menu()),
        }
    }

    pub fn html(&self) -> &str {
        match self {
            Reply::Send { html, .. } | Reply::Edit { html, .. } => html,
        }
    }

    pub fn keyboard(&self) -> Option<&InlineKeyboard> {
        match self {
            Reply::Send { keyboard, .. } | Reply::Edit { keyboard, .. } => keyboard.as_ref(),
        }
    }
}

pub fn main_menu() -> InlineKeyboard {
    InlineKeyboard::one_per_row(vec![
        InlineButton::new("🎮 Tic-tac-toe", CHOOSE_TICTACTOE),
        InlineButton::new("💣 Minesweeper", CHOOSE_MINESWEEPER),
        InlineButton::new("🎟 My coupons", MY_COUPONS),
    ])
}

pub fn greeting(display_name: Option<&str>) -> String {
    match display_name {
        Some(name) => format!("👋 Hi, {}! Pick a game:", escape_html(name)),
        None => "👋 Hi! Pick a game:".to_string(),
    }
}

pub fn game_started(kind: GameKind) -> String {
    match kind {
        GameKind::TicTacToe => "🎮 Tic-tac-toe started. You play ❌.".to_string(),
        GameKind::Minesweeper => "💣 Minesweeper started. Open every safe cell.".to_string(),
    }
}

/// Board text and move keyboard for the user's game.
pub fn board(game: &ActiveGame) -> (String, InlineKeyboard) {
    match game {
        ActiveGame::TicTacToe(g) => (tictactoe_text(g), tictactoe_keyboard(g)),
        ActiveGame::Minesweeper(g) => (minesweeper_text(g), minesweeper_keyboard(g)),
    }
}

fn tictactoe_label(cell: Cell) -> &'static str {
    match cell {
        Cell::Empty => HIDDEN,
        Cell::Player => "❌",
        Cell::Opponent => "⭕",
    }
}

pub fn tictactoe_text(game: &TicTacToe) -> String {
    let rows = game
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|&c| tictactoe_label(c))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("<b>{}</b>\n{}", GameKind::TicTacToe.title(), pre(&rows))
}

pub fn tictactoe_keyboard(game: &TicTacToe) -> InlineKeyboard {
    InlineKeyboard::new(
        game.rows()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(|(j, &c)| {
                        InlineButton::new(
                            tictactoe_label(c),
                            CallbackAction::Move(GameKind::TicTacToe, (i, j)).encode(),
                        )
                    })
                    .collect()
            })
            .collect(),
    )
}

fn minesweeper_label(cell: CellView) -> String {
    match cell {
        CellView::Hidden => HIDDEN.to_string(),
        CellView::Revealed(n) => n.to_string(),
        CellView::Mine => "💣".to_string(),
    }
}

pub fn minesweeper_text(game: &Minesweeper) -> String {
    let rows = (0..game.size())
        .map(|i| {
            game.iter_row(i)
                .map(|&c| minesweeper_label(c))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "<b>{}</b> · {} mines, {} of {} safe cells open\n{}",
        GameKind::Minesweeper.title(),
        game.mine_count(),
        game.revealed_count().min(game.size() * game.size() - game.mine_count()),
        game.size() * game.size() - game.mine_count(),
        pre(&rows)
    )
}

pub fn minesweeper_keyboard(game: &Minesweeper) -> InlineKeyboard {
    InlineKeyboard::new(
        (0..game.size())
            .map(|i| {
                game.iter_row(i)
                    .enumerate()
                    .map(|(j, &c)| {
                        InlineButton::new(
                            minesweeper_label(c),
                            CallbackAction::Move(GameKind::Minesweeper, (i, j)).encode(),
                        )
                    })
                    .collect()
            })
            .collect(),
    )
}

pub fn coupon_list(records: &[CouponRecord]) -> String {
    if records.is_empty() {
        return "😢 No coupons yet. Win a game to earn one!".to_string();
    }
    let mut out = String::from("🎟 <b>Your coupons:</b>\n");
    for r in records {
        out.push_str(&format!(
            "• {} (received {})\n",
            escape_html(&r.coupon),
            r.issued_at.format("%Y-%m-%d %H:%M UTC")
        ));
    }
    out
}
