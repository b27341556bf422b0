use prizebot_core::{
    domain::{ChatId, UserId},
    render::Reply,
};

use crate::router::{deliver, AppState};

use super::{log_failure, TRY_AGAIN};

fn help_text(coupon_win_threshold: u32) -> String {
    format!(
        "<b>How to play</b>\n\
         🎮 Tic-tac-toe: you are ❌. Win {coupon_win_threshold} games in a row to earn a coupon.\n\
         💣 Minesweeper: open every safe cell to earn a coupon.\n\n\
         /start shows the menu, /coupons lists your coupons."
    )
}

const UNKNOWN: &str = "Unknown command. Send /start to see the menu.";

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub(super) async fn handle_command(
    state: &AppState,
    chat_id: i64,
    user_id: UserId,
    display_name: Option<&str>,
    text: &str,
) {
    let (cmd, _args) = parse_command(text);
    let _guard = state.chat_locks.lock_chat(chat_id).await;

    let replies = match cmd.as_str() {
        "start" => state.orchestrator.start(user_id, display_name).await,
        "coupons" => state.orchestrator.my_coupons(user_id).await,
        "help" => Ok(vec![Reply::with_menu(help_text(
            state.cfg.coupon_win_threshold,
        ))]),
        _ => Ok(vec![Reply::text(UNKNOWN)]),
    };

    let replies = replies.unwrap_or_else(|e| {
        log_failure(user_id, &e);
        vec![Reply::text(TRY_AGAIN)]
    });
    deliver(state.messenger.as_ref(), ChatId(chat_id), None, replies).await;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use prizebot_core::{
        errors::Error,
        store::{CouponRecord, RewardStore, UserRecord},
        Result,
    };

    use crate::{handlers::test_support, router::tests::Call};

    use super::*;

    #[test]
    fn parses_commands_with_bot_suffix_and_args() {
        assert_eq!(parse_command("/start"), ("start".to_string(), String::new()));
        assert_eq!(
            parse_command("/Start@prize_bot  now "),
            ("start".to_string(), "now".to_string())
        );
        assert_eq!(parse_command("/coupons"), ("coupons".to_string(), String::new()));
    }

    #[test]
    fn help_follows_the_configured_threshold() {
        assert!(help_text(3).contains("Win 3 games in a row"));
        assert!(!help_text(3).contains("Win 5"));
    }

    #[tokio::test]
    async fn start_greets_with_menu_and_registers_user() {
        let (state, messenger) = test_support::state();
        handle_command(&state, 10, UserId(1), Some("ann"), "/start").await;

        let calls = messenger.calls();
        assert_eq!(calls.len(), 1);
        let Call::Send(chat, html, with_keyboard) = &calls[0] else {
            panic!("expected a send, got {calls:?}");
        };
        assert_eq!(*chat, 10);
        assert!(html.contains("ann"));
        assert!(with_keyboard);
    }

    #[tokio::test]
    async fn coupons_and_help_and_unknown() {
        let (state, messenger) = test_support::state();
        handle_command(&state, 10, UserId(1), None, "/coupons").await;
        handle_command(&state, 10, UserId(1), None, "/help").await;
        handle_command(&state, 10, UserId(1), None, "/chess").await;

        let calls = messenger.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(&calls[0], Call::Send(_, h, true) if h.contains("No coupons")));
        assert!(matches!(&calls[1], Call::Send(_, h, true) if h.contains("Win 5 games")));
        assert_eq!(calls[2], Call::Send(10, UNKNOWN.to_string(), false));
    }

    struct BrokenStore;

    #[async_trait]
    impl RewardStore for BrokenStore {
        async fn upsert_user(&self, _: UserId, _: Option<&str>) -> Result<()> {
            Err(Error::Storage("locked".to_string()))
        }
        async fn get_user(&self, _: UserId) -> Result<Option<UserRecord>> {
            Err(Error::Storage("locked".to_string()))
        }
        async fn increment_wins(&self, _: UserId) -> Result<u32> {
            Err(Error::Storage("locked".to_string()))
        }
        async fn reset_wins(&self, _: UserId) -> Result<()> {
            Err(Error::Storage("locked".to_string()))
        }
        async fn append_coupon(&self, _: UserId, _: &str, _: DateTime<Utc>) -> Result<CouponRecord> {
            Err(Error::Storage("locked".to_string()))
        }
        async fn redeem_streak(&self, _: UserId, _: &str, _: DateTime<Utc>) -> Result<CouponRecord> {
            Err(Error::Storage("locked".to_string()))
        }
        async fn list_coupons(&self, _: UserId) -> Result<Vec<CouponRecord>> {
            Err(Error::Storage("locked".to_string()))
        }
    }

    #[tokio::test]
    async fn storage_failure_sends_a_transient_message() {
        let (state, messenger) = test_support::state_with(Arc::new(BrokenStore));
        handle_command(&state, 10, UserId(1), None, "/start").await;
        assert_eq!(
            messenger.calls(),
            vec![Call::Send(10, TRY_AGAIN.to_string(), false)]
        );
    }
}
