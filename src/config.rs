use std::fmt;

use thiserror::Error;

const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
const TRELLO_KEY: &str = "TRELLO_KEY";
const TRELLO_TOKEN: &str = "TRELLO_TOKEN";
const TRELLO_CHECKLIST_ID: &str = "TRELLO_CHECKLIST_ID";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),
}

#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub api_base: String,
}

#[derive(Clone)]
pub struct TrelloConfig {
    pub key: String,
    pub token: String,
    pub checklist_id: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

/// Process-wide settings, read once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub trello: TrelloConfig,
    pub server: ServerConfig,
}

// Credentials stay out of logs.
impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl fmt::Debug for TrelloConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrelloConfig")
            .field("key", &"<redacted>")
            .field("token", &"<redacted>")
            .field("checklist_id", &self.checklist_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

fn default_port() -> u16 {
    5000
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_trello_api_base() -> String {
    "https://api.trello.com/1".to_string()
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source. Empty values count
    /// as missing, and every missing required name is reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut missing = Vec::new();
        let mut require = |name: &'static str| {
            get(name).unwrap_or_else(|| {
                missing.push(name);
                String::new()
            })
        };

        let bot_token = require(TELEGRAM_BOT_TOKEN);
        let key = require(TRELLO_KEY);
        let token = require(TRELLO_TOKEN);
        let checklist_id = require(TRELLO_CHECKLIST_ID);

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => default_port(),
        };

        Ok(Config {
            telegram: TelegramConfig {
                bot_token,
                api_base: get("TELEGRAM_API_BASE")
                    .map(|base| base.trim_end_matches('/').to_string())
                    .unwrap_or_else(default_telegram_api_base),
            },
            trello: TrelloConfig {
                key,
                token,
                checklist_id,
                api_base: get("TRELLO_API_BASE")
                    .map(|base| base.trim_end_matches('/').to_string())
                    .unwrap_or_else(default_trello_api_base),
            },
            server: ServerConfig {
                bind_address: get("BIND_ADDRESS").unwrap_or_else(default_bind_address),
                port,
            },
        })
    }
}
