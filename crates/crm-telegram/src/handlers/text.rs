use teloxide::types::Message;

use crm_core::{
    broadcast, panel,
    session::{BroadcastStep, Flow},
    Result,
};

use crate::router::AppState;

use super::core_chat;

/// Plain (non-command) text: meaningful only while the operator is inside a
/// modal flow. Everyone else's chatter is ignored.
pub async fn handle_text(msg: &Message, state: &AppState) -> Result<()> {
    let chat = core_chat(msg);
    if !state.cfg.is_admin(chat.0) {
        return Ok(());
    }
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let port = state.messenger.as_ref();

    match state.store.flow(chat).await {
        Flow::AwaitingPaymentPassword { .. } => {
            panel::submit_password(&state.store, port, chat, &state.cfg.payment_password, text)
                .await
        }
        Flow::ComposingBroadcast(draft) if draft.step == BroadcastStep::AwaitingText => {
            broadcast::collect_text(&state.store, port, chat, text).await
        }
        // Text during the image step is ignored; the buttons decide.
        _ => Ok(()),
    }
}
