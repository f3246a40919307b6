use std::{collections::HashMap, sync::Arc};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crm_core::{config::Config, messaging::port::MessagingPort, store::Store};

use crate::handlers;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub store: Arc<Store>,
    pub messenger: Arc<dyn MessagingPort>,
    pub chat_locks: Arc<ChatLocks>,
}

/// One async mutex per chat identity. Every inbound update for a chat takes
/// its lock before handling, so two rapid events from the same operator
/// cannot interleave inside a handler's awaits; different chats still run
/// concurrently.
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

/// Run the bot until the process is stopped.
pub async fn run_polling(
    cfg: Arc<Config>,
    store: Arc<Store>,
    bot: Bot,
    messenger: Arc<dyn MessagingPort>,
) -> anyhow::Result<()> {
    if let Ok(me) = bot.get_me().await {
        tracing::info!(username = me.username(), "bot started");
    }
    tracing::info!(admins = cfg.admin_chat_ids.len(), "admin chats configured");

    let state = Arc::new(AppState {
        cfg,
        store,
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
