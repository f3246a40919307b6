//! Broadcast composition (two-step conversational flow) and fan-out.

use tracing::{info, warn};

use crate::{
    domain::ChatId,
    messaging::port::MessagingPort,
    session::{BroadcastDraft, BroadcastStep, Flow},
    store::Store,
    views, Result,
};

/// Outcome of one fan-out run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BroadcastReport {
    pub sent: usize,
    pub failed: usize,
    pub total: usize,
}

/// Deliver one message to every subscriber in `targets`.
///
/// Delivery is sequential; a per-subscriber failure is tallied and logged,
/// never raised, and never aborts the remaining deliveries.
pub async fn fan_out(
    port: &dyn MessagingPort,
    targets: &[ChatId],
    text: &str,
    image: Option<&str>,
) -> BroadcastReport {
    let mut sent = 0usize;
    let mut failed = 0usize;

    for &chat_id in targets {
        let result = match image {
            Some(file_ref) => port.send_photo_html(chat_id, file_ref, text).await,
            None => port.send_html(chat_id, text).await,
        };
        match result {
            Ok(_) => sent += 1,
            Err(e) => {
                warn!(chat_id = chat_id.0, error = %e, "broadcast delivery failed");
                failed += 1;
            }
        }
    }

    info!(sent, failed, total = targets.len(), "broadcast fan-out finished");
    BroadcastReport {
        sent,
        failed,
        total: targets.len(),
    }
}

/// `/notify`: begin composing. Requires a non-empty subscriber set; replaces
/// any other modal flow the operator had pending.
pub async fn start(store: &Store, port: &dyn MessagingPort, operator: ChatId) -> Result<()> {
    let count = store.subscribers().read().await.len();
    if count == 0 {
        port.send_html(operator, "📭 No subscribers to notify yet")
            .await?;
        return Ok(());
    }

    store
        .set_flow(
            operator,
            Flow::ComposingBroadcast(BroadcastDraft {
                step: BroadcastStep::AwaitingText,
                text: None,
                prompt: None,
            }),
        )
        .await;

    port.send_html(operator, &views::broadcast_text_prompt(count))
        .await?;
    Ok(())
}

/// Text step: store the message text and ask for an optional image.
pub async fn collect_text(
    store: &Store,
    port: &dyn MessagingPort,
    operator: ChatId,
    text: &str,
) -> Result<()> {
    let (prompt_text, keyboard) = views::broadcast_image_prompt();
    let prompt = port
        .send_html_with_keyboard(operator, &prompt_text, keyboard)
        .await?;

    store
        .set_flow(
            operator,
            Flow::ComposingBroadcast(BroadcastDraft {
                step: BroadcastStep::AwaitingImage,
                text: Some(text.to_string()),
                prompt: Some(prompt),
            }),
        )
        .await;
    Ok(())
}

/// Image step: attach the image and send immediately.
pub async fn collect_image(
    store: &Store,
    port: &dyn MessagingPort,
    operator: ChatId,
    file_ref: &str,
) -> Result<()> {
    let Flow::ComposingBroadcast(draft) = store.take_flow(operator).await else {
        return Ok(());
    };
    let Some(text) = draft.text else {
        // Image arrived before the text step completed; nothing to send.
        return Ok(());
    };

    if let Some(prompt) = draft.prompt {
        let _ = port.delete_message(prompt).await;
    }
    execute(store, port, operator, &text, Some(file_ref)).await
}

/// "Send without image" button.
pub async fn send_without_image(
    store: &Store,
    port: &dyn MessagingPort,
    operator: ChatId,
) -> Result<()> {
    let Flow::ComposingBroadcast(draft) = store.take_flow(operator).await else {
        return Ok(());
    };
    let Some(text) = draft.text else {
        return Ok(());
    };

    if let Some(prompt) = draft.prompt {
        let _ = port.delete_message(prompt).await;
    }
    execute(store, port, operator, &text, None).await
}

/// Run the fan-out and report back to the initiating operator.
async fn execute(
    store: &Store,
    port: &dyn MessagingPort,
    operator: ChatId,
    text: &str,
    image: Option<&str>,
) -> Result<()> {
    let targets = store.subscribers().read().await.snapshot();

    port.send_html(operator, "⏳ Sending the announcement...")
        .await?;
    let report = fan_out(port, &targets, text, image).await;
    port.send_html(operator, &views::broadcast_report(&report))
        .await?;
    Ok(())
}

/// Fan-out entry for the HTTP `notify` endpoint: text and optional image are
/// supplied atomically, no composition step.
pub async fn notify_all(
    store: &Store,
    port: &dyn MessagingPort,
    text: &str,
    image: Option<&str>,
) -> BroadcastReport {
    let targets = store.subscribers().read().await.snapshot();
    fan_out(port, &targets, text, image).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::Catalog, testing::RecordingMessenger};

    fn store_with_subscribers(n: i64) -> Store {
        let store = Store::new(Catalog::standard());
        let subs = store.subscribers();
        for i in 1..=n {
            futures_block_on_register(subs, ChatId(i));
        }
        store
    }

    fn futures_block_on_register(
        subs: &tokio::sync::RwLock<crate::subscribers::SubscriberSet>,
        chat: ChatId,
    ) {
        // try_write never contends here: tests are single-threaded at setup.
        subs.try_write().unwrap().register(chat);
    }

    #[tokio::test]
    async fn fan_out_tolerates_partial_failure() {
        let port = RecordingMessenger::new();
        port.fail_for(ChatId(2));
        port.fail_for(ChatId(4));

        let targets: Vec<ChatId> = (1..=5).map(ChatId).collect();
        let report = fan_out(&port, &targets, "hello", None).await;

        assert_eq!(
            report,
            BroadcastReport {
                sent: 3,
                failed: 2,
                total: 5
            }
        );
        // All five were attempted despite the failures in the middle.
        assert_eq!(port.attempted_chats(), targets);
    }

    #[tokio::test]
    async fn fan_out_with_image_sends_photos() {
        let port = RecordingMessenger::new();
        let targets = vec![ChatId(1), ChatId(2)];
        let report = fan_out(&port, &targets, "caption", Some("file-123")).await;

        assert_eq!(report.sent, 2);
        assert_eq!(port.photos_sent(), 2);
    }

    #[tokio::test]
    async fn notify_requires_subscribers() {
        let store = Store::new(Catalog::standard());
        let port = RecordingMessenger::new();

        start(&store, &port, ChatId(99)).await.unwrap();

        assert!(store.flow(ChatId(99)).await.is_idle());
        assert!(port.last_text(ChatId(99)).unwrap().contains("No subscribers"));
    }

    #[tokio::test]
    async fn two_step_composition_with_image() {
        let store = store_with_subscribers(3);
        let operator = ChatId(100);
        let port = RecordingMessenger::new();

        start(&store, &port, operator).await.unwrap();
        assert!(matches!(
            store.flow(operator).await,
            Flow::ComposingBroadcast(BroadcastDraft {
                step: BroadcastStep::AwaitingText,
                ..
            })
        ));
        assert!(port.last_text(operator).unwrap().contains("Subscribers: 3"));

        collect_text(&store, &port, operator, "big news").await.unwrap();
        assert!(matches!(
            store.flow(operator).await,
            Flow::ComposingBroadcast(BroadcastDraft {
                step: BroadcastStep::AwaitingImage,
                ..
            })
        ));

        collect_image(&store, &port, operator, "file-9").await.unwrap();

        assert!(store.flow(operator).await.is_idle());
        assert_eq!(port.photos_sent(), 3);
        let report_msg = port.last_text(operator).unwrap();
        assert!(report_msg.contains("Delivered: 3"));
        assert!(report_msg.contains("Failed: 0"));
    }

    #[tokio::test]
    async fn send_without_image_broadcasts_text_only() {
        let store = store_with_subscribers(2);
        let operator = ChatId(100);
        let port = RecordingMessenger::new();

        start(&store, &port, operator).await.unwrap();
        collect_text(&store, &port, operator, "text only").await.unwrap();
        send_without_image(&store, &port, operator).await.unwrap();

        assert!(store.flow(operator).await.is_idle());
        assert_eq!(port.photos_sent(), 0);
        assert_eq!(port.text_for(ChatId(1)), vec!["text only"]);
        assert_eq!(port.text_for(ChatId(2)), vec!["text only"]);
        // The image prompt was replaced, not left dangling.
        assert_eq!(port.deleted_count(), 1);
    }

    #[tokio::test]
    async fn operator_is_not_broadcast_target_unless_subscribed() {
        let store = store_with_subscribers(2);
        let operator = ChatId(100);
        let port = RecordingMessenger::new();

        start(&store, &port, operator).await.unwrap();
        collect_text(&store, &port, operator, "hi").await.unwrap();
        send_without_image(&store, &port, operator).await.unwrap();

        assert!(!port.text_for(operator).iter().any(|t| t == "hi"));
    }

    #[tokio::test]
    async fn subscribers_registered_mid_composition_are_included_at_dispatch() {
        let store = store_with_subscribers(1);
        let operator = ChatId(100);
        let port = RecordingMessenger::new();

        start(&store, &port, operator).await.unwrap();
        collect_text(&store, &port, operator, "hi").await.unwrap();

        // Registration lands before the send button: snapshot is taken at
        // dispatch, so the new subscriber is included.
        store.subscribers().write().await.register(ChatId(2));
        send_without_image(&store, &port, operator).await.unwrap();

        assert_eq!(port.text_for(ChatId(2)), vec!["hi"]);
    }
}
