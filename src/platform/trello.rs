use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::TrelloConfig;
use crate::platform::ChecklistBoard;

/// A checklist item as reported back by Trello.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CheckItem {
    /// Trello may normalize the text it was given, so its name wins; the
    /// submitted text is only used when the reply carries none.
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(fallback)
    }
}

#[derive(Debug, Error)]
pub enum TrelloError {
    #[error("failed to reach Trello: {0}")]
    Request(#[source] reqwest::Error),
    #[error("Trello API error ({status}): {body}")]
    Status { status: StatusCode, body: String },
    #[error("failed to decode Trello response: {0}")]
    Decode(#[source] reqwest::Error),
}

pub struct TrelloClient {
    client: reqwest::Client,
    config: TrelloConfig,
}

impl TrelloClient {
    pub fn new(config: TrelloConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn check_items_url(&self) -> String {
        format!(
            "{}/checklists/{}/checkItems",
            self.config.api_base, self.config.checklist_id
        )
    }

    /// Creates one item at the top of the configured checklist. A single
    /// attempt is made.
    pub async fn add_checklist_item(&self, text: &str) -> Result<CheckItem, TrelloError> {
        let url = self.check_items_url();
        debug!("Adding checklist item via {}", url);

        let response = self
            .client
            .post(&url)
            .query(&[
                ("key", self.config.key.as_str()),
                ("token", self.config.token.as_str()),
                ("name", text),
                ("pos", "top"),
            ])
            .send()
            .await
            // credentials travel in the query string, keep them out of errors
            .map_err(|e| TrelloError::Request(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Trello API returned {}: {}", status, body);
            return Err(TrelloError::Status { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| TrelloError::Decode(e.without_url()))
    }
}

#[async_trait]
impl ChecklistBoard for TrelloClient {
    async fn add_checklist_item(&self, text: &str) -> Result<CheckItem, TrelloError> {
        TrelloClient::add_checklist_item(self, text).await
    }
}
