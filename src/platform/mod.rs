pub mod telegram;
pub mod trello;

use async_trait::async_trait;

use crate::platform::trello::{CheckItem, TrelloError};

/// Destination for chat replies. Delivery failures are the implementation's
/// problem: callers never see them.
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str);
}

/// Board that turns task text into checklist items.
#[async_trait]
pub trait ChecklistBoard: Send + Sync {
    async fn add_checklist_item(&self, text: &str) -> Result<CheckItem, TrelloError>;
}
