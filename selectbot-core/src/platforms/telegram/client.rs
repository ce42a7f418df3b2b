// File: selectbot-core/src/platforms/telegram/client.rs

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use selectbot_common::error::Error;
use selectbot_common::models::telegram::{ChatMemberStatus, InlineKeyboardMarkup};
use selectbot_common::traits::chat_traits::ChatApi;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Bot API client. Every method is a POST of a JSON body to
/// `/bot<token>/<method>`; the response envelope is
/// `{ok, result?, description?, error_code?}`.
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChatMember {
    status: ChatMemberStatus,
}

#[derive(Debug, Deserialize)]
struct MessageId {
    message_id: i64,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{TELEGRAM_API_BASE}/bot{token}"),
        }
    }

    /// For pointing the client at a stub server in tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        let url = format!("{}/{}", self.base_url, method);
        let response = self.http.post(&url).json(body).send().await?;
        let envelope: ApiResponse<T> = response.json().await?;

        if envelope.ok {
            envelope
                .result
                .ok_or_else(|| Error::Platform(format!("{method}: ok response without result")))
        } else {
            let description = envelope.description.unwrap_or_else(|| "unknown error".to_string());
            debug!("Telegram call {} failed: {} ({:?})", method, description, envelope.error_code);
            if envelope.error_code == Some(403) {
                Err(Error::Forbidden(description))
            } else {
                Err(Error::Platform(format!("{method}: {description}")))
            }
        }
    }
}

#[async_trait]
impl ChatApi for TelegramClient {
    async fn get_chat_member(&self, chat_id: i64, user_id: i64) -> Result<ChatMemberStatus, Error> {
        let member: ChatMember = self
            .call(
                "getChatMember",
                &json!({ "chat_id": chat_id, "user_id": user_id }),
            )
            .await?;
        Ok(member.status)
    }

    async fn copy_message(
        &self,
        chat_id: i64,
        from_chat_id: i64,
        message_id: i64,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<i64, Error> {
        let mut body = json!({
            "chat_id": chat_id,
            "from_chat_id": from_chat_id,
            "message_id": message_id,
        });
        if let Some(markup) = reply_markup {
            body["reply_markup"] = serde_json::to_value(markup)?;
        }
        let copied: MessageId = self.call("copyMessage", &body).await?;
        Ok(copied.message_id)
    }

    async fn copy_messages(
        &self,
        chat_id: i64,
        from_chat_id: i64,
        message_ids: &[i64],
        remove_caption: bool,
    ) -> Result<Vec<i64>, Error> {
        let copied: Vec<MessageId> = self
            .call(
                "copyMessages",
                &json!({
                    "chat_id": chat_id,
                    "from_chat_id": from_chat_id,
                    "message_ids": message_ids,
                    "remove_caption": remove_caption,
                }),
            )
            .await?;
        Ok(copied.into_iter().map(|m| m.message_id).collect())
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<i64, Error> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });
        if let Some(markup) = reply_markup {
            body["reply_markup"] = serde_json::to_value(markup)?;
        }
        let sent: MessageId = self.call("sendMessage", &body).await?;
        Ok(sent.message_id)
    }
}
