use prizebot_core::{
    callback::CallbackAction,
    domain::{ChatId, MessageId, MessageRef, UserId},
    render::Reply,
};
use tracing::{error, warn};

use crate::router::{deliver, AppState};

use super::{log_failure, TRY_AGAIN};

const STALE_BUTTON: &str = "This button is no longer valid. Send /start.";

/// `origin` is `(chat_id, message_id)` of the message carrying the button.
pub(super) async fn handle_callback(
    state: &AppState,
    callback_id: &str,
    user_id: UserId,
    origin: Option<(i64, i32)>,
    data: &str,
) {
    let action = CallbackAction::parse(data);
    // Always answer so the client stops its spinner.
    let toast = action.is_none().then_some(STALE_BUTTON);
    if let Err(e) = state
        .messenger
        .answer_callback_query(callback_id, toast)
        .await
    {
        error!(user_id = user_id.0, "answer_callback_query failed: {e}");
    }

    let Some(action) = action else {
        warn!(user_id = user_id.0, data, "malformed callback payload");
        return;
    };
    let Some((chat_id, message_id)) = origin else {
        warn!(user_id = user_id.0, data, "callback without a message");
        return;
    };

    let _guard = state.chat_locks.lock_chat(chat_id).await;
    let replies = state
        .orchestrator
        .handle_action(user_id, action)
        .await
        .unwrap_or_else(|e| {
            log_failure(user_id, &e);
            vec![Reply::text(TRY_AGAIN)]
        });

    let origin = MessageRef {
        chat_id: ChatId(chat_id),
        message_id: MessageId(message_id),
    };
    deliver(state.messenger.as_ref(), ChatId(chat_id), Some(origin), replies).await;
}

#[cfg(test)]
mod tests {
    use crate::{handlers::test_support, router::tests::Call};

    use super::*;

    const ORIGIN: Option<(i64, i32)> = Some((10, 99));

    #[tokio::test]
    async fn malformed_payload_is_answered_and_ignored() {
        let (state, messenger) = test_support::state();
        for data in ["", "ttt_x_1", "askuser:1:2"] {
            handle_callback(&state, "cb", UserId(1), ORIGIN, data).await;
        }
        assert_eq!(
            messenger.calls(),
            vec![Call::Answer("cb".to_string(), Some(STALE_BUTTON.to_string())); 3]
        );
    }

    #[tokio::test]
    async fn choosing_a_game_then_moving_edits_the_board() {
        let (state, messenger) = test_support::state();
        handle_callback(&state, "a", UserId(1), ORIGIN, "game_ttt").await;
        handle_callback(&state, "b", UserId(1), ORIGIN, "ttt_1_1").await;

        let calls = messenger.calls();
        assert_eq!(calls.len(), 5, "{calls:?}");
        assert_eq!(calls[0], Call::Answer("a".to_string(), None));
        assert!(matches!(&calls[1], Call::Send(10, h, false) if h.contains("Tic-tac-toe started")));
        assert!(matches!(&calls[2], Call::Send(10, _, true)));
        assert_eq!(calls[3], Call::Answer("b".to_string(), None));
        let Call::Edit(99, html) = &calls[4] else {
            panic!("expected an edit of the pressed message, got {:?}", calls[4]);
        };
        assert_eq!(html.matches('❌').count(), 1);
        assert_eq!(html.matches('⭕').count(), 1);
    }

    #[tokio::test]
    async fn move_without_game_prompts_to_start() {
        let (state, messenger) = test_support::state();
        handle_callback(&state, "a", UserId(1), ORIGIN, "mine_0_0").await;

        let calls = messenger.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[1], Call::Send(10, h, false) if h.contains("/start")));
    }
}
