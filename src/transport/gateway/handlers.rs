use super::{AppState, SECRET_HEADER};
use crate::transport::telegram::types::Update;
use crate::transport::traits::IncomingMessage;
use axum::{
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};

fn constant_time_eq(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// GET /health
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let story = state.handler.story().load_full();
    let body = serde_json::json!({
        "status": "ok",
        "steps": story.len(),
        "languages": story.i18n().languages(),
        "chats": state.handler.sessions().len(),
    });
    Json(body)
}

/// POST <bot_path> -- one Telegram update per request
///
/// The update is handled on its own task; Telegram gets its 200 right away.
pub(super) async fn handle_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Update>, JsonRejection>,
) -> StatusCode {
    if let Some(ref secret) = state.secret_token {
        let header_val = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        match header_val {
            Some(val) if constant_time_eq(val, secret.as_ref()) => {}
            _ => {
                tracing::warn!("webhook request with missing or invalid secret token");
                return StatusCode::UNAUTHORIZED;
            }
        }
    }

    let Json(update) = match body {
        Ok(body) => body,
        Err(error) => {
            tracing::warn!(%error, "malformed telegram update");
            return StatusCode::BAD_REQUEST;
        }
    };

    let update_id = update.update_id;
    let Some(message) = IncomingMessage::from_update(update) else {
        tracing::debug!(update_id, "update without message ignored");
        return StatusCode::OK;
    };

    let handler = state.handler.clone();
    tokio::spawn(async move {
        let chat = message.chat;
        if let Err(error) = handler.handle(message).await {
            tracing::error!(chat_id = %chat, update_id, %error, "update handling failed");
        }
    });

    StatusCode::OK
}
