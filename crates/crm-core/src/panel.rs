//! Admin-side flows: the paginated client browser and the password-gated
//! payment confirmation protocol.

use tracing::info;

use chrono::Utc;

use crate::{
    domain::{ChatId, Client, ClientId, ClientStatus, MessageRef, ViewKind},
    messaging::port::MessagingPort,
    session::{wrap_index, BrowseState, Flow, NavDirection},
    store::Store,
    views, Result,
};

/// `/start` for an operator: the admin help panel with live totals.
pub async fn send_admin_panel(
    store: &Store,
    port: &dyn MessagingPort,
    operator: ChatId,
    user_name: &str,
) -> Result<()> {
    let registry = store.registry().read().await;
    let text = views::admin_panel(
        registry.catalog(),
        user_name,
        registry.len(),
        registry.list(Some(ClientStatus::Paid)).len(),
        registry.list(Some(ClientStatus::Pending)).len(),
    );
    drop(registry);

    port.send_html(operator, &text).await?;
    Ok(())
}

/// `/stats`.
pub async fn send_stats(store: &Store, port: &dyn MessagingPort, operator: ChatId) -> Result<()> {
    let registry = store.registry().read().await;
    let text = views::stats_message(registry.catalog(), &registry.stats(Utc::now()));
    drop(registry);

    port.send_html(operator, &text).await?;
    Ok(())
}

fn empty_view_notice(view: ViewKind) -> &'static str {
    match view {
        ViewKind::All => "📭 No clients yet",
        ViewKind::Pending => "✅ No clients awaiting payment",
        ViewKind::Paid => "📭 No paid clients yet",
    }
}

/// `/all`, `/pending`, `/clients`: open a filtered view at position 0.
///
/// An empty list short-circuits with a notice and creates no state.
pub async fn open_view(
    store: &Store,
    port: &dyn MessagingPort,
    operator: ChatId,
    view: ViewKind,
) -> Result<()> {
    let snapshot: Vec<ClientId> = {
        let registry = store.registry().read().await;
        registry
            .list(view.status_filter())
            .into_iter()
            .map(|c| c.id.clone())
            .collect()
    };

    if snapshot.is_empty() {
        port.send_html(operator, empty_view_notice(view)).await?;
        return Ok(());
    }

    store
        .set_browse(
            operator,
            BrowseState {
                view,
                index: 0,
                snapshot,
                rendered: None,
            },
        )
        .await;

    render_current(store, port, operator).await
}

/// Prev/next button press with circular wraparound. The previous card is
/// replaced (delete-then-send).
pub async fn navigate(
    store: &Store,
    port: &dyn MessagingPort,
    operator: ChatId,
    direction: NavDirection,
) -> Result<()> {
    let Some(state) = store.browse(operator).await else {
        port.send_html(operator, "📭 The view has expired, reopen it with /all")
            .await?;
        return Ok(());
    };

    let ids = current_ids(store, &state).await;
    if ids.is_empty() {
        port.send_html(operator, empty_view_notice(state.view)).await?;
        return Ok(());
    }

    // The live `All` list can differ in length from when the view was opened.
    let index = wrap_index(state.index.min(ids.len() - 1), ids.len(), direction);
    store
        .update_session(operator, |s| {
            if let Some(b) = &mut s.browse {
                b.index = index;
                b.snapshot = ids;
            }
        })
        .await;

    render_current(store, port, operator).await
}

/// Resolve the id list the state navigates over: live for `All`, the stored
/// point-in-time snapshot otherwise.
async fn current_ids(store: &Store, state: &BrowseState) -> Vec<ClientId> {
    match state.view {
        ViewKind::All => {
            let registry = store.registry().read().await;
            registry.list(None).into_iter().map(|c| c.id.clone()).collect()
        }
        _ => state.snapshot.clone(),
    }
}

/// Render the card at the operator's current index, replacing any previously
/// rendered card.
async fn render_current(store: &Store, port: &dyn MessagingPort, operator: ChatId) -> Result<()> {
    let Some(state) = store.browse(operator).await else {
        return Ok(());
    };

    let (text, keyboard) = {
        let registry = store.registry().read().await;
        // Stale snapshot ids (cannot happen today: records are never deleted)
        // are skipped rather than trusted.
        let clients: Vec<&Client> = state
            .snapshot
            .iter()
            .filter_map(|id| registry.find(id))
            .collect();
        let Some(client) = clients.get(state.index) else {
            return Ok(());
        };
        views::client_card(
            registry.catalog(),
            client,
            state.index,
            clients.len(),
            state.view,
        )
    };

    if let Some(old) = state.rendered {
        let _ = port.delete_message(old).await;
    }
    let rendered = port
        .send_html_with_keyboard(operator, &text, keyboard)
        .await?;

    store
        .update_session(operator, |s| {
            if let Some(b) = &mut s.browse {
                b.rendered = Some(rendered);
            }
        })
        .await;
    Ok(())
}

/// "Details" button: an expanded standalone card; navigation state untouched.
pub async fn show_details(
    store: &Store,
    port: &dyn MessagingPort,
    operator: ChatId,
    client_id: &ClientId,
) -> Result<()> {
    let registry = store.registry().read().await;
    let Some(client) = registry.find(client_id) else {
        drop(registry);
        port.send_html(operator, "❌ Client not found").await?;
        return Ok(());
    };
    let text = views::client_details(registry.catalog(), client);
    drop(registry);

    port.send_html(operator, &text).await?;
    Ok(())
}

/// "Confirm payment" button: start the password handshake.
///
/// A vanished or already-paid target gets an explicit notice instead of a
/// silent no-op.
pub async fn request_confirmation(
    store: &Store,
    port: &dyn MessagingPort,
    operator: ChatId,
    client_id: &ClientId,
    origin: Option<MessageRef>,
) -> Result<()> {
    let prompt = {
        let registry = store.registry().read().await;
        match registry.find(client_id) {
            None => None,
            Some(c) if c.status == ClientStatus::Paid => Some(Err(())),
            Some(c) => Some(Ok(views::password_prompt(c))),
        }
    };

    match prompt {
        None => {
            port.send_html(operator, "❌ Client not found").await?;
        }
        Some(Err(())) => {
            port.send_html(operator, "✅ This client has already paid")
                .await?;
        }
        Some(Ok(text)) => {
            store
                .set_flow(
                    operator,
                    Flow::AwaitingPaymentPassword {
                        client_id: client_id.clone(),
                        origin,
                    },
                )
                .await;
            port.send_html(operator, &text).await?;
        }
    }
    Ok(())
}

/// Text arriving while a password prompt is pending.
///
/// Either way the pending confirmation is cleared: retrying always restarts
/// from the button press. No retry counter, no lockout.
pub async fn submit_password(
    store: &Store,
    port: &dyn MessagingPort,
    operator: ChatId,
    payment_password: &str,
    text: &str,
) -> Result<()> {
    let Flow::AwaitingPaymentPassword { client_id, .. } = store.take_flow(operator).await else {
        return Ok(());
    };

    if text != payment_password {
        port.send_html(
            operator,
            "❌ <b>Wrong password!</b>\n\nThe payment was not confirmed. \
             Press the button to try again.",
        )
        .await?;
        return Ok(());
    }

    // The registry may have moved underneath the prompt (HTTP update race).
    let receipt = {
        let mut registry = store.registry().write().await;
        match registry.find(&client_id).map(|c| c.status) {
            None => None,
            Some(ClientStatus::Paid) => Some(Err(())),
            Some(ClientStatus::Pending) => {
                let client = registry.set_status(&client_id, ClientStatus::Paid, Utc::now())?;
                info!(client_id = %client_id, "payment confirmed");
                Some(Ok(views::payment_receipt(client)))
            }
        }
    };

    match receipt {
        None => {
            port.send_html(operator, "❌ Client no longer exists").await?;
        }
        Some(Err(())) => {
            port.send_html(operator, "✅ This client has already paid")
                .await?;
        }
        Some(Ok(text)) => {
            port.send_html(operator, &text).await?;
            // Refresh the open pagination view so the card reflects Paid.
            if store.browse(operator).await.is_some() {
                render_current(store, port, operator).await?;
            }
        }
    }
    Ok(())
}

/// `/cancel` (or the cancel button): discard whatever modal flow is pending.
pub async fn cancel_active_flow(
    store: &Store,
    port: &dyn MessagingPort,
    operator: ChatId,
) -> Result<()> {
    match store.take_flow(operator).await {
        Flow::Idle => {}
        Flow::AwaitingPaymentPassword { .. } => {
            port.send_html(operator, "❌ Payment confirmation cancelled")
                .await?;
        }
        Flow::ComposingBroadcast(draft) => {
            if let Some(prompt) = draft.prompt {
                let _ = port.delete_message(prompt).await;
            }
            port.send_html(operator, "❌ Broadcast cancelled").await?;
        }
    }
    Ok(())
}
