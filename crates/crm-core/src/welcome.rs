//! Public side: `/start` package menu and package browsing. Any chat that
//! reaches this entry point becomes a broadcast subscriber.

use crate::{
    domain::{ChatId, MessageRef},
    messaging::port::MessagingPort,
    store::Store,
    views, Result,
};

/// `/start` for a regular user: register as a subscriber, show the menu.
pub async fn send_package_menu(
    store: &Store,
    port: &dyn MessagingPort,
    chat_id: ChatId,
    user_name: &str,
) -> Result<()> {
    store.subscribers().write().await.register(chat_id);

    let (text, keyboard) = {
        let registry = store.registry().read().await;
        views::package_menu(registry.catalog(), user_name)
    };
    port.send_html_with_keyboard(chat_id, &text, keyboard).await?;
    Ok(())
}

/// Package button: the detail card for one package. Unknown codes are
/// ignored, matching the menu only ever offering valid ones.
pub async fn show_package(
    store: &Store,
    port: &dyn MessagingPort,
    chat_id: ChatId,
    code: &str,
    contact_url: &str,
) -> Result<()> {
    let card = {
        let registry = store.registry().read().await;
        registry
            .catalog()
            .get(code)
            .map(|pkg| views::package_info(pkg, contact_url))
    };

    if let Some((text, keyboard)) = card {
        port.send_html_with_keyboard(chat_id, &text, keyboard).await?;
    }
    Ok(())
}

/// Back button: replace the package card with the menu again.
pub async fn back_to_menu(
    store: &Store,
    port: &dyn MessagingPort,
    chat_id: ChatId,
    card: Option<MessageRef>,
    user_name: &str,
) -> Result<()> {
    if let Some(card) = card {
        let _ = port.delete_message(card).await;
    }
    send_package_menu(store, port, chat_id, user_name).await
}
