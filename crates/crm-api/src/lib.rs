//! HTTP ingestion/query adapter (axum).
//!
//! Exposes the core's operations as authenticated JSON endpoints. The router
//! is built separately from serving so tests can drive it in-process.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crm_core::{config::Config, messaging::port::MessagingPort, store::Store};

mod auth;
mod dto;
mod error;
mod routes;

pub use error::ApiError;

pub struct ApiState {
    pub cfg: Arc<Config>,
    pub store: Arc<Store>,
    pub messenger: Arc<dyn MessagingPort>,
}

pub fn router(state: Arc<ApiState>) -> Router {
    let protected = Router::new()
        .route("/api/client", post(routes::create_client))
        .route("/api/clients", get(routes::list_clients))
        .route("/api/stats", get(routes::stats))
        .route("/api/client/{id}", put(routes::update_client))
        .route("/api/notify", post(routes::notify))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/", get(routes::service_info))
        .merge(protected)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: Arc<ApiState>) -> anyhow::Result<()> {
    let port = state.cfg.api_port;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "http api listening");
    axum::serve(listener, app).await?;
    Ok(())
}
