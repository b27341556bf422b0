//! Telegram update handlers.
//!
//! Each handler is a small adapter that:
//! - extracts the user, chat and payload from the update
//! - calls into the `prizebot-core` orchestrator
//! - delivers the returned replies through the messenger

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message, User},
};

use prizebot_core::{domain::UserId, errors::Error};

use crate::router::AppState;

mod callback;
mod commands;

pub(crate) const TRY_AGAIN: &str = "⚠️ Something went wrong, please try again.";

pub async fn handle_callback(
    _bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let origin = q.message.as_ref().map(|m| (m.chat.id.0, m.id.0));
    callback::handle_callback(
        &state,
        &q.id,
        user_id(&q.from),
        origin,
        q.data.as_deref().unwrap_or_default(),
    )
    .await;
    Ok(())
}

pub async fn handle_message(_bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(from) = msg.from() else {
        return Ok(());
    };

    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            commands::handle_command(
                &state,
                msg.chat.id.0,
                user_id(from),
                Some(display_name(from)),
                text,
            )
            .await;
            return Ok(());
        }
    }

    tracing::debug!(chat_id = msg.chat.id.0, "ignoring non-command message");
    Ok(())
}

fn user_id(user: &User) -> UserId {
    UserId(user.id.0 as i64)
}

fn display_name(user: &User) -> &str {
    user.username.as_deref().unwrap_or(&user.first_name)
}

/// Log a failed event the way every handler does.
pub(crate) fn log_failure(user_id: UserId, err: &Error) {
    tracing::error!(user_id = user_id.0, "event failed: {err}");
}
