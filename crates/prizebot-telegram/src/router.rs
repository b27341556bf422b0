use std::{collections::HashMap, sync::Arc};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{error, info};

use prizebot_core::messaging::throttled::{ThrottleConfig, ThrottledMessenger};
use prizebot_core::{
    config::Config,
    domain::{ChatId, MessageRef},
    messaging::port::MessagingPort,
    orchestrator::Orchestrator,
    render::Reply,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub orchestrator: Arc<Orchestrator>,
    pub messenger: Arc<dyn MessagingPort>,
    pub chat_locks: Arc<ChatLocks>,
}

/// Keeps one chat's replies in order while another event for it is delivering.
#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub async fn lock_chat(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

pub async fn run_polling(cfg: Arc<Config>, orchestrator: Arc<Orchestrator>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    match bot.get_me().await {
        Ok(me) => info!(username = %me.username(), "bot started"),
        Err(e) => error!("get_me failed: {e}"),
    }
    info!(
        db = %cfg.db_path.display(),
        mines_board_size = cfg.mines_board_size,
        mines_count = cfg.mines_count,
        coupon_win_threshold = cfg.coupon_win_threshold,
        "configuration loaded"
    );

    // Button mashing produces bursts of edits; keep the single RetryAfter
    // retry in the adapter and space calls out here.
    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let messenger: Arc<dyn MessagingPort> = Arc::new(ThrottledMessenger::new(
        raw_messenger,
        ThrottleConfig::default(),
    ));

    let state = Arc::new(AppState {
        cfg,
        orchestrator,
        messenger,
        chat_locks: Arc::new(ChatLocks::default()),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// Send replies in order. `origin` is the message whose button was pressed;
/// edits fall back to a new message when there is none.
///
/// The first transport failure drops the rest of the event.
pub async fn deliver(
    messenger: &dyn MessagingPort,
    chat_id: ChatId,
    origin: Option<MessageRef>,
    replies: Vec<Reply>,
) {
    for reply in replies {
        let res = match (reply, origin) {
            (Reply::Edit { html, keyboard }, Some(msg)) => {
                messenger.edit_inline_keyboard(msg, &html, keyboard).await
            }
            (Reply::Send { html, keyboard } | Reply::Edit { html, keyboard }, _) => {
                let sent = match keyboard {
                    Some(kb) => messenger.send_inline_keyboard(chat_id, &html, kb).await,
                    None => messenger.send_html(chat_id, &html).await,
                };
                sent.map(|_| ())
            }
        };
        if let Err(e) = res {
            error!(chat_id = chat_id.0, "failed to deliver reply: {e}");
            return;
        }
    }
}
