use async_trait::async_trait;
use mockall::automock;

use crate::error::Error;
use crate::models::telegram::{ChatMemberStatus, InlineKeyboardMarkup};

/// The slice of the chat platform this engine consumes.
///
/// Implementations must surface a lost-visibility outcome (the bot was
/// removed from a channel, the platform refuses the call) as
/// `Error::Forbidden` so that callers can tell it apart from transport
/// failures.
#[automock]
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn get_chat_member(&self, chat_id: i64, user_id: i64) -> Result<ChatMemberStatus, Error>;

    /// Copies a single message; returns the id of the copy.
    async fn copy_message(
        &self,
        chat_id: i64,
        from_chat_id: i64,
        message_id: i64,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<i64, Error>;

    /// Copies a batch of messages in order; returns the ids of the copies.
    async fn copy_messages(
        &self,
        chat_id: i64,
        from_chat_id: i64,
        message_ids: &[i64],
        remove_caption: bool,
    ) -> Result<Vec<i64>, Error>;

    /// Sends a Markdown-formatted message; returns the id of the sent message.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<i64, Error>;
}
