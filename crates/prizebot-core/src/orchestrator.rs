//! Event dispatch: games, rewards and what to show next.

use tracing::info;

use crate::{
    callback::CallbackAction,
    domain::UserId,
    formatting::escape_html,
    games::{Coord, GameKind, Outcome},
    ledger::RewardLedger,
    registry::SessionRegistry,
    render::{self, Reply},
    Result,
};

/// Default number of consecutive tic-tac-toe wins worth a coupon.
pub const DEFAULT_COUPON_THRESHOLD: u32 = 5;

pub(crate) const NO_ACTIVE_GAME: &str = "Start a game first: send /start and pick one.";
const PLAY_AGAIN: &str = "Play again?";

/// Turns user events into engine calls, ledger updates and replies.
///
/// Every event holds the user's session lock until its replies are built, so
/// two quick clicks from one user never interleave.
pub struct Orchestrator {
    registry: SessionRegistry,
    ledger: RewardLedger,
    coupon_threshold: u32,
}

impl Orchestrator {
    pub fn new(registry: SessionRegistry, ledger: RewardLedger, coupon_threshold: u32) -> Self {
        Self {
            registry,
            ledger,
            coupon_threshold: coupon_threshold.max(1),
        }
    }

    /// `/start`: register the user and show the main menu.
    pub async fn start(&self, user_id: UserId, display_name: Option<&str>) -> Result<Vec<Reply>> {
        let _session = self.registry.lock(user_id).await;
        self.ledger.ensure_user(user_id, display_name).await?;
        Ok(vec![Reply::with_menu(render::greeting(display_name))])
    }

    /// Dispatch a parsed button press.
    pub async fn handle_action(&self, user_id: UserId, action: CallbackAction) -> Result<Vec<Reply>> {
        match action {
            CallbackAction::ChooseGame(kind) => self.choose_game(user_id, kind).await,
            CallbackAction::Move(kind, coord) => self.play(user_id, kind, coord).await,
            CallbackAction::MyCoupons => self.my_coupons(user_id).await,
        }
    }

    pub async fn choose_game(&self, user_id: UserId, kind: GameKind) -> Result<Vec<Reply>> {
        let mut session = self.registry.lock(user_id).await;
        let game = session.start_game(kind);
        info!(user_id = user_id.0, game = ?kind, "game started");

        let (html, keyboard) = render::board(game);
        Ok(vec![
            Reply::text(render::game_started(kind)),
            Reply::Send {
                html,
                keyboard: Some(keyboard),
            },
        ])
    }

    pub async fn play(&self, user_id: UserId, kind: GameKind, coord: Coord) -> Result<Vec<Reply>> {
        let mut session = self.registry.lock(user_id).await;
        let Some(game) = session.active_mut().filter(|g| g.kind() == kind) else {
            return Ok(vec![Reply::text(NO_ACTIVE_GAME)]);
        };

        let outcome = game.play(coord);
        let (html, keyboard) = render::board(game);
        let mut replies = vec![Reply::Edit {
            html,
            keyboard: Some(keyboard),
        }];
        if !outcome.is_terminal() {
            return Ok(replies);
        }

        info!(user_id = user_id.0, game = ?kind, ?outcome, "game finished");
        match (kind, outcome) {
            (GameKind::TicTacToe, Outcome::Win) => {
                replies.push(Reply::text(self.reward_tictactoe_win(user_id).await?));
                replies.push(Reply::with_menu(PLAY_AGAIN));
            }
            (GameKind::TicTacToe, Outcome::Lose) => {
                replies.push(Reply::with_menu("❌ You lost."));
            }
            (GameKind::TicTacToe, _) => {
                replies.push(Reply::with_menu("🤝 Draw."));
            }
            (GameKind::Minesweeper, Outcome::Win) => {
                let coupon = self.ledger.issue_coupon(user_id).await?;
                replies.push(Reply::with_menu(format!(
                    "🏆 Field cleared!\n🎉 Coupon: {}",
                    escape_html(&coupon.coupon)
                )));
            }
            (GameKind::Minesweeper, _) => {
                replies.push(Reply::with_menu("💥 Boom! You hit a mine."));
            }
        }
        Ok(replies)
    }

    /// Count the win and turn a full streak into a coupon.
    async fn reward_tictactoe_win(&self, user_id: UserId) -> Result<String> {
        let streak = self.ledger.record_win(user_id).await?;
        if streak < self.coupon_threshold {
            return Ok(format!(
                "🏆 You won!\n✅ Wins in a row: {streak}/{}",
                self.coupon_threshold
            ));
        }

        let coupon = self.ledger.redeem_streak(user_id).await?;
        Ok(format!(
            "🏆 You won {streak} in a row!\n🎉 Coupon: {}",
            escape_html(&coupon.coupon)
        ))
    }

    pub async fn my_coupons(&self, user_id: UserId) -> Result<Vec<Reply>> {
        let _session = self.registry.lock(user_id).await;
        let coupons = self.ledger.list_coupons(user_id).await?;
        Ok(vec![Reply::with_menu(render::coupon_list(&coupons))])
    }
}
