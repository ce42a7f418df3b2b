use serde::{Deserialize, Serialize};

/// Campaign lifecycle. Transitions are monotonic:
/// `Waiting` -> `Start` (published) -> `End` (winners drawn).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GiveawayStatus {
    Waiting,
    Start,
    End,
}

impl GiveawayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GiveawayStatus::Waiting => "waiting",
            GiveawayStatus::Start => "start",
            GiveawayStatus::End => "end",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "waiting" => Some(GiveawayStatus::Waiting),
            "start" => Some(GiveawayStatus::Start),
            "end" => Some(GiveawayStatus::End),
            _ => None,
        }
    }
}

/// A participant. Identity is the platform user id; the display name is
/// whatever it was when the user opted in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiveawayMember {
    pub name: String,
    pub id: i64,
}

impl PartialEq for GiveawayMember {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GiveawayMember {}

impl std::hash::Hash for GiveawayMember {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// End condition of a campaign.
///
/// Only `Time` deadlines are owned by the job scheduler; `Members`
/// campaigns are closed by the enrollment path once the participant count
/// reaches the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Deadline {
    Time { time: i64 },
    Members { members: i64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Giveaway {
    /// Short opaque id, embedded in deep links.
    pub id: String,
    /// Creation time, epoch seconds.
    pub created: i64,
    /// When the campaign goes live in the target channel, epoch seconds.
    pub publish_time: i64,
    pub button_text: String,
    /// The organizer's private chat. Source messages are copied out of it,
    /// and test publishes are posted back into it.
    pub admin: i64,
    /// Channels a participant must be subscribed to. The target channel
    /// (`send_to_id`) is an implicit requirement on top of these.
    pub channels: Vec<i64>,
    pub send_to_id: i64,
    pub members: Vec<GiveawayMember>,
    pub status: GiveawayStatus,
    /// Insertion order is placement rank: first winner first.
    pub winners: Vec<GiveawayMember>,
    pub winners_count: usize,
    /// Source messages to replicate; the last one carries the entry button.
    pub msg_ids: Vec<i64>,
    pub deadline: Deadline,
    /// Id of the published control message, set once by the publisher.
    pub top_msg_id: Option<i64>,
    pub preview_text: String,
}
