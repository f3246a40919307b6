use teloxide::types::Message;

use crm_core::{domain::ViewKind, panel, welcome, Result};

use crate::router::AppState;

use super::{core_chat, sender_name};

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(msg: &Message, state: &AppState) -> Result<()> {
    let chat = core_chat(msg);
    let is_admin = state.cfg.is_admin(chat.0);
    let (cmd, _args) = parse_command(msg.text().unwrap_or(""));
    let port = state.messenger.as_ref();

    match cmd.as_str() {
        // Role-branched entry point.
        "start" => {
            if is_admin {
                panel::send_admin_panel(&state.store, port, chat, &sender_name(msg)).await
            } else {
                welcome::send_package_menu(&state.store, port, chat, &sender_name(msg)).await
            }
        }

        // `/cancel` works for anyone mid-protocol; for everyone else it is a
        // harmless no-op.
        "cancel" => panel::cancel_active_flow(&state.store, port, chat).await,

        "all" | "pending" | "clients" | "stats" | "notify" if !is_admin => {
            port.send_html(chat, "❌ You don't have access to this command")
                .await?;
            Ok(())
        }

        "all" => panel::open_view(&state.store, port, chat, ViewKind::All).await,
        "pending" => panel::open_view(&state.store, port, chat, ViewKind::Pending).await,
        "clients" => panel::open_view(&state.store, port, chat, ViewKind::Paid).await,
        "stats" => panel::send_stats(&state.store, port, chat).await,
        "notify" => crm_core::broadcast::start(&state.store, port, chat).await,

        // Unknown commands are ignored, like the original.
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bot_mention_and_args() {
        assert_eq!(parse_command("/start"), ("start".to_string(), String::new()));
        assert_eq!(
            parse_command("/all@crm_bot now"),
            ("all".to_string(), "now".to_string())
        );
        assert_eq!(parse_command("/STATS"), ("stats".to_string(), String::new()));
    }
}
