//! Telegram update handlers.
//!
//! Each handler is a thin adapter: it takes the chat's lock, maps the update
//! into core types and dispatches into the `crm-core` flows. A failure inside
//! one update is reported to that chat and never propagates to the
//! dispatcher.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use crm_core::domain::ChatId;

use crate::router::AppState;

mod callback;
mod commands;
mod photo;
mod text;

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;

    // Serialize handling per chat identity: two rapid events from the same
    // chat cannot interleave at an await inside a handler.
    let _guard = state.chat_locks.lock_chat(chat_id).await;

    let result = if msg.text().map(|t| t.starts_with('/')).unwrap_or(false) {
        commands::handle_command(&msg, &state).await
    } else if msg.text().is_some() {
        text::handle_text(&msg, &state).await
    } else if msg.photo().is_some() {
        photo::handle_photo(&msg, &state).await
    } else {
        Ok(())
    };

    if let Err(e) = result {
        tracing::error!(chat_id, error = %e, "message handler failed");
        let _ = bot
            .send_message(msg.chat.id, "❌ Something went wrong, try again")
            .await;
    }

    Ok(())
}

pub async fn handle_callback(
    _bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let Some(message) = q.message.as_ref() else {
        let _ = state.messenger.answer_callback(&q.id, None).await;
        return Ok(());
    };
    let chat_id = message.chat.id.0;

    let _guard = state.chat_locks.lock_chat(chat_id).await;

    if let Err(e) = callback::handle_callback(&q, &state).await {
        tracing::error!(chat_id, error = %e, "callback handler failed");
        let _ = state
            .messenger
            .answer_callback(&q.id, Some("❌ Something went wrong"))
            .await;
    }

    Ok(())
}

pub(crate) fn sender_name(msg: &Message) -> String {
    msg.from()
        .map(|u| u.first_name.clone())
        .unwrap_or_else(|| "there".to_string())
}

pub(crate) fn core_chat(msg: &Message) -> ChatId {
    ChatId(msg.chat.id.0)
}
