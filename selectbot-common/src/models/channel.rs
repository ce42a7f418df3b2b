use serde::{Deserialize, Serialize};

/// A channel or group the bot administers.
///
/// `link` is `None` for private channels; those are only reachable through
/// the platform's internal numeric permalink form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,
    pub channel_name: String,
    pub admin: i64,
    pub link: Option<String>,
}
