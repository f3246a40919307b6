use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crm_core::{
    broadcast,
    domain::{ChatId, ClientId, ClientStatus},
    registry::NewClient,
    views,
};

use crate::{
    dto::{ClientDto, CreateClientRequest, NotifyRequest, StatsDto, UpdateStatusRequest},
    ApiError, ApiState,
};

/// `GET /`: service metadata, the only unauthenticated endpoint.
pub async fn service_info() -> Json<Value> {
    Json(json!({
        "message": "CRM Telegram Bot API",
        "version": "2.0.0",
        "endpoints": {
            "POST /api/client": "Register a new client",
            "GET /api/clients": "List clients",
            "GET /api/stats": "Revenue statistics",
            "PUT /api/client/{id}": "Update a client's status",
            "POST /api/notify": "Broadcast to subscribers",
        },
    }))
}

/// `POST /api/client`: the external ingestion endpoint.
pub async fn create_client(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<CreateClientRequest>,
) -> Result<Json<Value>, ApiError> {
    let new = NewClient {
        first_name: body.first_name.unwrap_or_default(),
        phone: body.number.unwrap_or_default(),
        package_code: body.selected_paket.unwrap_or_default(),
        comment: body.comment,
    };

    let (client, notice) = {
        let mut registry = state.store.registry().write().await;
        let client = registry.create(new, Utc::now())?.clone();
        let notice = views::new_client_notice(registry.catalog(), &client);
        (ClientDto::from(&client), notice)
    };

    // Best-effort operator notification; a failure never rolls back creation.
    for &admin in &state.cfg.admin_chat_ids {
        if let Err(e) = state.messenger.send_html(ChatId(admin), &notice).await {
            tracing::warn!(admin, error = %e, "new-client notice failed");
        }
    }

    Ok(Json(json!({
        "success": true,
        "message": "Client registered",
        "client": client,
    })))
}

/// `GET /api/clients?status=pending|paid`
pub async fn list_clients(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let filter = params.get("status").map(String::as_str);

    let registry = state.store.registry().read().await;
    let clients: Vec<ClientDto> = match filter {
        None => registry.list(None),
        // Unknown status strings match nothing, like the original's filter.
        Some(s) => match ClientStatus::parse(s) {
            Some(status) => registry.list(Some(status)),
            None => Vec::new(),
        },
    }
    .into_iter()
    .map(ClientDto::from)
    .collect();

    Json(json!({
        "success": true,
        "count": clients.len(),
        "clients": clients,
    }))
}

/// `GET /api/stats`
pub async fn stats(State(state): State<Arc<ApiState>>) -> Json<Value> {
    let registry = state.store.registry().read().await;
    let stats = registry.stats(Utc::now());

    Json(json!({
        "success": true,
        "stats": StatsDto::from(&stats),
    }))
}

/// `PUT /api/client/{id}`: the privileged status update. Unlike the chat
/// protocol this path may also force a client back to pending. Unrecognized
/// status values are silently ignored (no-op update).
pub async fn update_client(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = ClientId(id);
    let mut registry = state.store.registry().write().await;

    let client = match body.status.as_deref().and_then(ClientStatus::parse) {
        Some(status) => registry.set_status(&id, status, Utc::now())?,
        None => registry
            .find(&id)
            .ok_or_else(|| crm_core::Error::NotFound(format!("client {id}")))?,
    };

    Ok(Json(json!({
        "success": true,
        "message": "Status updated",
        "client": ClientDto::from(client),
    })))
}

/// `POST /api/notify`: one-shot broadcast, no composition step.
pub async fn notify(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<NotifyRequest>,
) -> Result<Json<Value>, ApiError> {
    let text = body
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("text is required"))?;

    let report = broadcast::notify_all(
        &state.store,
        state.messenger.as_ref(),
        &text,
        body.image.as_deref(),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "sent": report.sent,
    })))
}
