/*!
 * HTTP listener.
 *
 * Three routes: the CMS workflow webhook, a health check, and the provider
 * callback receiver. Every request is logged with a monotonic request id,
 * redacted headers, and a truncated body echo; the same id prefixes every
 * log line the request produces downstream.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use axum::routing::{get, post};
use log::{info, warn};
use serde_json::{Value, json};

use crate::app_controller::Controller;
use crate::errors::AppError;
use crate::text_utils::{redact_headers, truncate_for_log};

/// Shared state behind the router
pub struct AppState {
    /// Pipeline controller
    controller: Controller,
    /// Monotonic request id source
    request_counter: AtomicU64,
    /// Log echo limit for request/response payloads
    log_truncate_max: usize,
}

impl AppState {
    fn next_request_id(&self) -> u64 {
        self.request_counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Build the service router around a controller
pub fn build_router(controller: Controller) -> Router {
    let log_truncate_max = controller.config().log_truncate_max;
    let state = Arc::new(AppState {
        controller,
        request_counter: AtomicU64::new(0),
        log_truncate_max,
    });
    Router::new()
        .route("/healthz", get(healthz))
        .route("/webhook", post(webhook))
        .route("/smartling/callback", post(smartling_callback))
        .fallback(not_found)
        .with_state(state)
}

/// Bind and serve until the process exits
pub async fn serve(controller: Controller, port: u16) -> anyhow::Result<()> {
    let router = build_router(controller);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("listening on http://localhost:{}", port);
    info!("webhook endpoint: POST http://localhost:{}/webhook", port);
    axum::serve(listener, router).await?;
    Ok(())
}

/// Log the inbound request and hand out its id.
fn log_request(
    state: &AppState,
    method: &str,
    path: &str,
    headers: &HeaderMap,
    body: &str,
) -> u64 {
    let id = state.next_request_id();
    info!("[{}] --> {} {}", id, method, path);
    if let Ok(rendered) = serde_json::to_string(&redact_headers(headers)) {
        info!("[{}] headers: {}", id, rendered);
    }
    if !body.is_empty() {
        info!("[{}] body: {}", id, truncate_for_log(body, state.log_truncate_max));
    }
    id
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "ok": false, "error": message }))).into_response()
}

/// Render an [`AppError`] the way the webhook caller expects: the upstream
/// status when one exists, plus URL and truncated body for diagnosis.
fn app_error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut body = json!({ "ok": false, "error": err.to_string() });
    if let AppError::Upstream {
        url, body: upstream_body, ..
    } = err
    {
        body["url"] = json!(url);
        if let Some(text) = upstream_body {
            body["bodyText"] = json!(text);
        }
    }
    (status, Json(body)).into_response()
}

async fn healthz(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let id = log_request(&state, "GET", "/healthz", &headers, "");
    info!("[{}] action=healthz", id);
    Json(json!({ "ok": true })).into_response()
}

async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let id = log_request(&state, "POST", "/webhook", &headers, &body);
    info!("[{}] action=webhook", id);

    if body.is_empty() {
        warn!("[{}] action=webhook rejected reason=empty_body", id);
        return json_error(StatusCode::BAD_REQUEST, "Expected JSON body");
    }
    let payload: Value = match serde_json::from_str(&body) {
        Ok(payload) => payload,
        Err(_) => {
            warn!("[{}] action=webhook rejected reason=invalid_json", id);
            return json_error(StatusCode::BAD_REQUEST, "Invalid JSON body");
        }
    };

    let started_at = std::time::Instant::now();
    match state.controller.handle_webhook(id, &payload).await {
        Ok(response) => {
            info!(
                "[{}] <-- 200 action=webhook {}ms",
                id,
                started_at.elapsed().as_millis()
            );
            Json(response).into_response()
        }
        Err(err) => {
            warn!(
                "[{}] <-- {} action=webhook err={}",
                id,
                err.http_status(),
                err
            );
            app_error_response(&err)
        }
    }
}

async fn smartling_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let id = log_request(&state, "POST", "/smartling/callback", &headers, &body);
    info!("[{}] action=smartling.callback", id);

    if body.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "Expected JSON body");
    }
    match serde_json::from_str::<Value>(&body) {
        Ok(payload) => {
            info!(
                "[{}] callback payload: {}",
                id,
                truncate_for_log(&payload.to_string(), state.log_truncate_max)
            );
            Json(json!({ "ok": true })).into_response()
        }
        Err(_) => json_error(StatusCode::BAD_REQUEST, "Invalid JSON body"),
    }
}

async fn not_found(State(state): State<Arc<AppState>>) -> Response {
    let id = state.next_request_id();
    info!("[{}] action=not_found", id);
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "ok": false, "error": "Not found" })),
    )
        .into_response()
}
