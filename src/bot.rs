use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::platform::telegram::{TelegramClient, Update};
use crate::platform::trello::TrelloClient;
use crate::platform::{ChatNotifier, ChecklistBoard};

pub const WEBHOOK_PATH: &str = "/telegram-webhook";

const PLAIN_TEXT_ONLY: &str = "Please send plain text tasks only for now.";
const GREETING: &str = "Hey! Send me any message and I'll add it as a checklist item in Trello.";
const ADD_FAILED: &str = "Oops, I couldn't add that to Trello. Check configuration/logs.";

/// Shared application state. Immutable, so requests never coordinate.
pub struct AppState {
    board: Box<dyn ChecklistBoard>,
    chat: Box<dyn ChatNotifier>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_services(
            Box::new(TrelloClient::new(config.trello.clone())),
            Box::new(TelegramClient::new(config.telegram.clone())),
        )
    }

    pub fn with_services(board: Box<dyn ChecklistBoard>, chat: Box<dyn ChatNotifier>) -> Self {
        Self { board, chat }
    }
}

/// Body returned to Telegram for every POST.
#[derive(Debug, Serialize, PartialEq)]
pub struct WebhookAck {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

impl WebhookAck {
    fn ok() -> Self {
        Self {
            ok: true,
            description: None,
        }
    }

    fn rejected(description: &'static str) -> Self {
        Self {
            ok: false,
            description: Some(description),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route(WEBHOOK_PATH, get(webhook_live).post(webhook))
        .with_state(state)
}

async fn index() -> &'static str {
    "Telegram → Trello bot is running"
}

async fn webhook_live() -> &'static str {
    "Telegram webhook endpoint is live"
}

async fn webhook(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, Json<WebhookAck>) {
    let (status, ack) = handle_update(&state, &body).await;
    (status, Json(ack))
}

/// Runs one webhook delivery to completion. Only a missing or malformed
/// payload yields a non-success status; downstream failures are reported
/// to the user in chat so Telegram never redelivers.
pub async fn handle_update(state: &AppState, body: &[u8]) -> (StatusCode, WebhookAck) {
    let payload = match serde_json::from_slice::<Value>(body) {
        // Anything but a non-empty object counts as "no payload".
        Ok(Value::Object(map)) if !map.is_empty() => Value::Object(map),
        _ => {
            warn!("Rejecting webhook call without a usable update payload");
            return (
                StatusCode::BAD_REQUEST,
                WebhookAck::rejected("No update payload"),
            );
        }
    };

    info!("Received update: {}", payload);

    let update: Update = match serde_json::from_value(payload) {
        Ok(update) => update,
        Err(e) => {
            warn!("Ignoring update with unexpected shape: {}", e);
            return (StatusCode::OK, WebhookAck::ok());
        }
    };

    let message = match update.into_message() {
        Ok(Some(message)) => message,
        Ok(None) => return (StatusCode::OK, WebhookAck::ok()),
        Err(e) => {
            warn!("Ignoring message with unexpected shape: {}", e);
            return (StatusCode::OK, WebhookAck::ok());
        }
    };
    let chat_id = message.chat.id;

    let text = match message.plain_text() {
        Some(text) => text,
        None => {
            state.chat.send_message(chat_id, PLAIN_TEXT_ONLY).await;
            return (StatusCode::OK, WebhookAck::ok());
        }
    };

    if text.starts_with("/start") {
        state.chat.send_message(chat_id, GREETING).await;
        return (StatusCode::OK, WebhookAck::ok());
    }

    match state.board.add_checklist_item(text).await {
        Ok(item) => {
            let name = item.display_name(text);
            info!(
                "Added checklist item {} for chat {}: {}",
                item.id.as_deref().unwrap_or("<unknown>"),
                chat_id,
                name
            );
            state
                .chat
                .send_message(chat_id, &format!("Added to Trello checklist: {}", name))
                .await;
        }
        Err(e) => {
            error!("Failed to add checklist item: {:#}", e);
            state.chat.send_message(chat_id, ADD_FAILED).await;
        }
    }

    (StatusCode::OK, WebhookAck::ok())
}
