use teloxide::types::CallbackQuery;

use crm_core::{
    broadcast,
    domain::{ChatId, MessageId, MessageRef},
    panel,
    views::PanelAction,
    welcome, Result,
};

use crate::router::AppState;

fn message_ref(q: &CallbackQuery) -> Option<MessageRef> {
    q.message.as_ref().map(|m| MessageRef {
        chat_id: ChatId(m.chat.id.0),
        message_id: MessageId(m.id.0),
    })
}

pub async fn handle_callback(q: &CallbackQuery, state: &AppState) -> Result<()> {
    let port = state.messenger.as_ref();
    let Some(origin) = message_ref(q) else {
        return port.answer_callback(&q.id, None).await;
    };
    let chat = origin.chat_id;

    let Some(action) = q.data.as_deref().and_then(PanelAction::parse) else {
        return port.answer_callback(&q.id, None).await;
    };

    // Admin-only buttons are rejected with an access-denied acknowledgement;
    // the button owner never learns more than that.
    if !action.is_public() && !state.cfg.is_admin(chat.0) {
        return port.answer_callback(&q.id, Some("❌ No access")).await;
    }

    match action {
        PanelAction::ShowPackage(code) => {
            port.answer_callback(&q.id, None).await?;
            welcome::show_package(&state.store, port, chat, &code, &state.cfg.contact_url).await
        }
        PanelAction::BackToPackages => {
            port.answer_callback(&q.id, None).await?;
            let name = q.from.first_name.clone();
            welcome::back_to_menu(&state.store, port, chat, Some(origin), &name).await
        }

        PanelAction::Navigate { direction, .. } => {
            port.answer_callback(&q.id, None).await?;
            panel::navigate(&state.store, port, chat, direction).await
        }
        PanelAction::NavigateIgnore => port.answer_callback(&q.id, None).await,

        PanelAction::Details(client_id) => {
            port.answer_callback(&q.id, None).await?;
            panel::show_details(&state.store, port, chat, &client_id).await
        }
        PanelAction::ConfirmPayment(client_id) => {
            port.answer_callback(&q.id, None).await?;
            panel::request_confirmation(&state.store, port, chat, &client_id, Some(origin)).await
        }

        PanelAction::BroadcastSendWithoutImage => {
            port.answer_callback(&q.id, None).await?;
            broadcast::send_without_image(&state.store, port, chat).await
        }
        PanelAction::BroadcastCancel => {
            port.answer_callback(&q.id, Some("❌ Cancelled")).await?;
            panel::cancel_active_flow(&state.store, port, chat).await
        }
    }
}
