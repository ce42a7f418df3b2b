use selectbot_common::models::channel::Channel;

/// Builds the platform deep links a campaign needs: the entry point
/// participants tap to join, and the results page shown after the draw.
#[derive(Debug, Clone)]
pub struct DeepLinks {
    bot_username: String,
}

impl DeepLinks {
    pub fn new(bot_username: impl Into<String>) -> Self {
        Self {
            bot_username: bot_username.into(),
        }
    }

    /// Entry point for joining the campaign.
    pub fn entry_link(&self, giveaway_id: &str) -> String {
        format!("https://t.me/{}/start?startapp={}", self.bot_username, giveaway_id)
    }

    /// Results page for a finished campaign.
    pub fn results_link(&self, giveaway_id: &str) -> String {
        format!(
            "https://t.me/{}/start?startapp=giveaway_{}",
            self.bot_username, giveaway_id
        )
    }
}

/// Permalink to a message in a channel. Public channels link through their
/// public URL; private channels only resolve through the internal numeric
/// form (the channel id without its `-100` marker prefix).
pub fn message_link(channel: &Channel, msg_id: i64) -> String {
    match &channel.link {
        Some(link) => format!("{link}/{msg_id}"),
        None => {
            let internal = channel.id.to_string();
            let internal = internal.strip_prefix("-100").unwrap_or(&internal);
            format!("https://t.me/c/{internal}/{msg_id}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(link: Option<&str>) -> Channel {
        Channel {
            id: -1001234567890,
            channel_name: "news".to_string(),
            admin: 42,
            link: link.map(String::from),
        }
    }

    #[test]
    fn entry_and_results_links_differ() {
        let links = DeepLinks::new("iselectbot");
        assert_eq!(
            links.entry_link("a1b2c3"),
            "https://t.me/iselectbot/start?startapp=a1b2c3"
        );
        assert_eq!(
            links.results_link("a1b2c3"),
            "https://t.me/iselectbot/start?startapp=giveaway_a1b2c3"
        );
    }

    #[test]
    fn public_channel_uses_its_link() {
        let link = message_link(&channel(Some("https://t.me/news")), 77);
        assert_eq!(link, "https://t.me/news/77");
    }

    #[test]
    fn private_channel_uses_internal_form() {
        let link = message_link(&channel(None), 77);
        assert_eq!(link, "https://t.me/c/1234567890/77");
    }
}
