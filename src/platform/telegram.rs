use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::config::TelegramConfig;
use crate::platform::ChatNotifier;

/// The parts of a Telegram update the relay cares about. Both message fields
/// stay raw until one is picked, so a malformed sibling cannot spoil it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub edited_message: Option<Value>,
}

/// Null, false, zero and empty strings, arrays or objects carry no message.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

impl Update {
    /// Picks `message`, falling back to `edited_message` when the former is
    /// absent or empty, then decodes only the one picked.
    pub fn into_message(self) -> Result<Option<IncomingMessage>, serde_json::Error> {
        self.message
            .filter(is_present)
            .or_else(|| self.edited_message.filter(is_present))
            .map(serde_json::from_value)
            .transpose()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

impl IncomingMessage {
    /// Trimmed text, or `None` for non-text messages and blank text.
    pub fn plain_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

pub struct TelegramClient {
    client: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Best-effort delivery: failures are logged here and go no further.
    pub async fn send_message(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.try_send_message(chat_id, text).await {
            error!("Error sending Telegram message to chat {}: {:#}", chat_id, e);
        }
    }

    async fn try_send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_base, self.config.bot_token
        );

        debug!("Sending Telegram message to chat {}", chat_id);

        let response = self
            .client
            .post(&url)
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await
            // reqwest errors embed the URL, which carries the bot token
            .map_err(|e| e.without_url())
            .context("Failed to send request to Telegram")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Telegram API error ({}): {}", status, error_body);
        }

        Ok(())
    }
}

#[async_trait]
impl ChatNotifier for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) {
        TelegramClient::send_message(self, chat_id, text).await
    }
}
