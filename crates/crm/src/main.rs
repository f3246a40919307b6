use std::sync::Arc;

use crm_api::ApiState;
use crm_core::{catalog::Catalog, config::Config, messaging::port::MessagingPort, store::Store};
use crm_telegram::{Bot, TelegramMessenger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    crm_core::logging::init("crm");

    let cfg = Arc::new(Config::load()?);

    let catalog = Catalog::standard();
    for pkg in catalog.iter() {
        tracing::info!(code = %pkg.code, price = pkg.price, "package available");
    }
    let store = Arc::new(Store::new(catalog));

    let bot = Bot::new(cfg.bot_token.clone());
    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));

    let api_state = Arc::new(ApiState {
        cfg: cfg.clone(),
        store: store.clone(),
        messenger: messenger.clone(),
    });

    tracing::info!(
        port = cfg.api_port,
        admins = cfg.admin_chat_ids.len(),
        "starting"
    );

    // Either half exiting takes the process down; both are expected to run
    // until the process is stopped.
    tokio::select! {
        res = crm_api::serve(api_state) => res?,
        res = crm_telegram::router::run_polling(cfg, store, bot, messenger) => res?,
    }

    Ok(())
}
