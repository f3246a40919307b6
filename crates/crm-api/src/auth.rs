use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{ApiError, ApiState};

/// Shared-secret check: `x-api-key` header or `api_key` query parameter.
pub async fn require_api_key(
    State(state): State<Arc<ApiState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_key = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let query_key = request.uri().query().and_then(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(k, _)| k == "api_key")
            .map(|(_, v)| v.into_owned())
    });

    let presented = header_key.or(query_key);
    if presented.as_deref() != Some(state.cfg.api_secret_key.as_str()) {
        return Err(ApiError::unauthorized("invalid API key"));
    }

    Ok(next.run(request).await)
}
