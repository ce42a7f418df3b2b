use serde::{Deserialize, Serialize};

/// Membership standing of a user in a chat, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl ChatMemberStatus {
    /// Whether this status counts as "subscribed" for eligibility purposes.
    pub fn is_subscribed(&self) -> bool {
        matches!(
            self,
            ChatMemberStatus::Creator | ChatMemberStatus::Administrator | ChatMemberStatus::Member
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    /// One row, one URL button.
    pub fn single_url(text: &str, url: &str) -> Self {
        Self {
            inline_keyboard: vec![vec![InlineKeyboardButton {
                text: text.to_string(),
                url: Some(url.to_string()),
                callback_data: None,
            }]],
        }
    }

    /// One row, one callback button.
    pub fn single_callback(text: &str, data: &str) -> Self {
        Self {
            inline_keyboard: vec![vec![InlineKeyboardButton {
                text: text.to_string(),
                url: None,
                callback_data: Some(data.to_string()),
            }]],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribed_statuses() {
        assert!(ChatMemberStatus::Member.is_subscribed());
        assert!(ChatMemberStatus::Administrator.is_subscribed());
        assert!(ChatMemberStatus::Creator.is_subscribed());
        assert!(!ChatMemberStatus::Left.is_subscribed());
        assert!(!ChatMemberStatus::Kicked.is_subscribed());
        assert!(!ChatMemberStatus::Restricted.is_subscribed());
    }

    #[test]
    fn url_button_omits_callback_field() {
        let markup = InlineKeyboardMarkup::single_url("Join", "https://t.me/example");
        let json = serde_json::to_value(&markup).unwrap();
        let button = &json["inline_keyboard"][0][0];
        assert_eq!(button["text"], "Join");
        assert_eq!(button["url"], "https://t.me/example");
        assert!(button.get("callback_data").is_none());
    }
}
