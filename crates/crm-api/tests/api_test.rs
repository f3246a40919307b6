//! In-process tests for the REST surface: auth, status codes, the wire field
//! names, and the side effects on the shared store.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use crm_api::{router, ApiState};
use crm_core::{
    catalog::Catalog,
    config::Config,
    domain::{ChatId, MessageId, MessageRef},
    messaging::{port::MessagingPort, types::InlineKeyboard},
    store::Store,
};

const SECRET: &str = "test-secret";
const ADMIN: i64 = 42;

/// Minimal recording messenger for the HTTP side.
#[derive(Default)]
struct FakeMessenger {
    sent: Mutex<Vec<(i64, String)>>,
    failing: Mutex<HashSet<i64>>,
}

impl FakeMessenger {
    fn fail_for(&self, chat_id: i64) {
        self.failing.lock().unwrap().insert(chat_id);
    }

    fn sent_to(&self, chat_id: i64) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == chat_id)
            .map(|(_, t)| t.clone())
            .collect()
    }

    fn deliver(&self, chat_id: ChatId, text: &str) -> crm_core::Result<MessageRef> {
        if self.failing.lock().unwrap().contains(&chat_id.0) {
            return Err(crm_core::Error::External("blocked".to_string()));
        }
        self.sent.lock().unwrap().push((chat_id.0, text.to_string()));
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(1),
        })
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> crm_core::Result<MessageRef> {
        self.deliver(chat_id, html)
    }

    async fn send_html_with_keyboard(
        &self,
        chat_id: ChatId,
        html: &str,
        _keyboard: InlineKeyboard,
    ) -> crm_core::Result<MessageRef> {
        self.deliver(chat_id, html)
    }

    async fn send_photo_html(
        &self,
        chat_id: ChatId,
        _file_ref: &str,
        caption_html: &str,
    ) -> crm_core::Result<MessageRef> {
        self.deliver(chat_id, caption_html)
    }

    async fn delete_message(&self, _msg: MessageRef) -> crm_core::Result<()> {
        Ok(())
    }

    async fn answer_callback(
        &self,
        _callback_id: &str,
        _text: Option<&str>,
    ) -> crm_core::Result<()> {
        Ok(())
    }
}

fn test_app() -> (Router, Arc<Store>, Arc<FakeMessenger>) {
    let cfg = Arc::new(Config {
        bot_token: "token".to_string(),
        api_secret_key: SECRET.to_string(),
        admin_chat_ids: vec![ADMIN],
        payment_password: "pw".to_string(),
        api_port: 0,
        contact_url: "https://t.me/x".to_string(),
    });
    let store = Arc::new(Store::new(Catalog::standard()));
    let messenger = Arc::new(FakeMessenger::default());

    let state = Arc::new(ApiState {
        cfg,
        store: store.clone(),
        messenger: messenger.clone(),
    });
    (router(state), store, messenger)
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn authed_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", SECRET)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-api-key", SECRET)
        .body(Body::empty())
        .unwrap()
}

fn valid_client_body() -> Value {
    json!({
        "firstName": "Aziz",
        "number": "+998901112233",
        "selectedPaket": "O'SISH",
    })
}

#[tokio::test]
async fn root_needs_no_auth() {
    let (app, _, _) = test_app();
    let (status, body) = call(&app, Request::builder().uri("/").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "CRM Telegram Bot API");
}

#[tokio::test]
async fn missing_or_wrong_key_is_unauthorized() {
    let (app, _, _) = test_app();

    let (status, body) = call(
        &app,
        Request::builder()
            .uri("/api/clients")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = call(
        &app,
        Request::builder()
            .uri("/api/clients")
            .header("x-api-key", "nope")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn query_param_key_is_accepted() {
    let (app, _, _) = test_app();
    let (status, body) = call(
        &app,
        Request::builder()
            .uri(format!("/api/clients?api_key={SECRET}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn create_then_list_uses_original_field_names() {
    let (app, _, _) = test_app();

    let (status, body) = call(&app, authed_json("POST", "/api/client", valid_client_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["client"]["firstName"], "Aziz");
    assert_eq!(body["client"]["selectedPaket"], "O'SISH");
    assert_eq!(body["client"]["paketPrice"], 100_000);
    assert_eq!(body["client"]["status"], "pending");
    assert!(body["client"]["paidDate"].is_null());

    let (_, body) = call(&app, authed_get("/api/clients")).await;
    assert_eq!(body["count"], 1);

    let (_, body) = call(&app, authed_get("/api/clients?status=pending")).await;
    assert_eq!(body["count"], 1);
    let (_, body) = call(&app, authed_get("/api/clients?status=paid")).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn create_notifies_every_admin() {
    let (app, _, messenger) = test_app();

    call(&app, authed_json("POST", "/api/client", valid_client_body())).await;

    let notices = messenger.sent_to(ADMIN);
    assert_eq!(notices.len(), 1);
    assert!(notices[0].contains("NEW CLIENT"));
}

#[tokio::test]
async fn create_survives_notification_failure() {
    let (app, store, messenger) = test_app();
    messenger.fail_for(ADMIN);

    let (status, _) = call(&app, authed_json("POST", "/api/client", valid_client_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.registry().read().await.len(), 1);
}

#[tokio::test]
async fn unknown_package_is_rejected_without_record() {
    let (app, store, _) = test_app();

    let body = json!({ "firstName": "A", "number": "+1", "selectedPaket": "GOLD" });
    let (status, response) = call(&app, authed_json("POST", "/api/client", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["success"], false);
    assert_eq!(store.registry().read().await.len(), 0);
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let (app, _, _) = test_app();

    let (status, _) = call(
        &app,
        authed_json("POST", "/api/client", json!({ "firstName": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let (app, _, _) = test_app();

    let (status, body) = call(
        &app,
        authed_json("PUT", "/api/client/nope", json!({ "status": "paid" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn paying_via_http_stamps_paid_date_and_counts_in_stats() {
    let (app, _, _) = test_app();

    let (_, created) = call(&app, authed_json("POST", "/api/client", valid_client_body())).await;
    let id = created["client"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        authed_json("PUT", &format!("/api/client/{id}"), json!({ "status": "paid" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["client"]["status"], "paid");
    assert!(!body["client"]["paidDate"].is_null());

    let (_, stats) = call(&app, authed_get("/api/stats")).await;
    assert_eq!(stats["stats"]["totalClients"], 1);
    assert_eq!(stats["stats"]["paidClients"], 1);
    assert_eq!(stats["stats"]["pendingClients"], 0);
    assert_eq!(stats["stats"]["totalRevenue"], 100_000);
    assert_eq!(stats["stats"]["monthRevenue"], 100_000);

    // The privileged reverse transition clears the stamp again.
    let (_, body) = call(
        &app,
        authed_json(
            "PUT",
            &format!("/api/client/{id}"),
            json!({ "status": "pending" }),
        ),
    )
    .await;
    assert_eq!(body["client"]["status"], "pending");
    assert!(body["client"]["paidDate"].is_null());
}

#[tokio::test]
async fn unrecognized_status_value_is_a_noop() {
    let (app, _, _) = test_app();

    let (_, created) = call(&app, authed_json("POST", "/api/client", valid_client_body())).await;
    let id = created["client"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        authed_json(
            "PUT",
            &format!("/api/client/{id}"),
            json!({ "status": "refunded" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["client"]["status"], "pending");
}

#[tokio::test]
async fn notify_requires_text() {
    let (app, _, _) = test_app();

    let (status, _) = call(&app, authed_json("POST", "/api/notify", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        authed_json("POST", "/api/notify", json!({ "text": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn notify_fans_out_and_reports_successes_only() {
    let (app, store, messenger) = test_app();
    {
        let mut subs = store.subscribers().write().await;
        subs.register(ChatId(1));
        subs.register(ChatId(2));
        subs.register(ChatId(3));
    }
    messenger.fail_for(2);

    let (status, body) = call(
        &app,
        authed_json("POST", "/api/notify", json!({ "text": "hello" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sent"], 2);
    assert_eq!(messenger.sent_to(1), vec!["hello"]);
    assert_eq!(messenger.sent_to(3), vec!["hello"]);
}
