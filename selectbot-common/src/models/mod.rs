pub mod channel;
pub mod giveaway;
pub mod job;
pub mod telegram;

pub use channel::Channel;
pub use giveaway::{Deadline, Giveaway, GiveawayMember, GiveawayStatus};
pub use job::{JobStatus, ScheduledJob};
