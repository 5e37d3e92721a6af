use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::command::{classify, Command};
use crate::event::{parse_body, InboundEvent};
use crate::router::{handle_event, AppState};

/// Header carrying the shared webhook secret.
pub const SECRET_HEADER: &str = "X-Bot-Api-Secret-Token";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook/zalo", post(receive_webhook))
        .route("/", get(index))
        .route("/health", get(health))
        .route("/status", get(status))
        .with_state(state)
}

/// Webhook ingress.
///
/// Ingress-level failures (bad secret, unparseable body) are the only errors
/// the platform ever sees; once the payload is structurally accepted the
/// response is 200 regardless of what happens downstream, so a slow or
/// failing provider never looks like a webhook failure.
async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    let presented = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
    if presented != Some(state.config.webhook_secret.as_str()) {
        warn!("Webhook call with wrong or missing secret header");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"status": "unauthorized"})),
        );
    }

    let value = match parse_body(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!("Unparseable webhook body: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"status": "bad payload"})),
            );
        }
    };

    let event = InboundEvent::from_value(value);
    info!(
        "Webhook event from '{}': {:?}",
        event.sender_id, event.message_text
    );

    if !event.sender_id.is_empty() && state.transcript.is_enabled() {
        // Fire-and-forget so a slow dashboard cannot delay the ack. Exempt
        // from the dispatcher bound: shedding would drop transcript lines
        // under load, and the dashboard timeout caps each task's lifetime.
        let transcript_state = state.clone();
        let (sender_id, sender_name, text) = (
            event.sender_id.clone(),
            event.sender_name(),
            event.message_text.clone(),
        );
        tokio::spawn(async move {
            transcript_state
                .transcript
                .log(&sender_id, &sender_name, &text)
                .await;
        });
    }

    if event.sender_id.is_empty() {
        return (StatusCode::OK, Json(json!({"status": "ok"})));
    }

    match classify(&event.message_text) {
        Command::None => {}
        command => {
            let task_state = state.clone();
            let sender_id = event.sender_id.clone();
            state
                .dispatcher
                .try_dispatch(&event.sender_id, handle_event(task_state, sender_id, command));
        }
    }

    (StatusCode::OK, Json(json!({"status": "ok"})))
}

async fn index() -> &'static str {
    "OK"
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}

async fn status() -> Json<Value> {
    Json(json!({
        "status": "running",
        "bot_status": "online",
        "server_time": chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
