use teloxide::types::Message;

use crm_core::{
    broadcast,
    session::{BroadcastStep, Flow},
    Result,
};

use crate::router::AppState;

use super::core_chat;

/// Photos only matter as the image step of a broadcast composition.
pub async fn handle_photo(msg: &Message, state: &AppState) -> Result<()> {
    let chat = core_chat(msg);
    if !state.cfg.is_admin(chat.0) {
        return Ok(());
    }

    let flow = state.store.flow(chat).await;
    let awaiting_image = matches!(
        flow,
        Flow::ComposingBroadcast(ref draft) if draft.step == BroadcastStep::AwaitingImage
    );
    if !awaiting_image {
        return Ok(());
    }

    // Telegram sends several sizes; take the largest rendition.
    let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) else {
        return Ok(());
    };

    broadcast::collect_image(&state.store, state.messenger.as_ref(), chat, &photo.file.id).await
}
