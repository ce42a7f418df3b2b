use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Error;
use crate::models::channel::Channel;
use crate::models::giveaway::{Giveaway, GiveawayMember};
use crate::models::job::ScheduledJob;

#[async_trait]
pub trait GiveawayRepository: Send + Sync {
    async fn create_giveaway(&self, giveaway: &Giveaway) -> Result<(), Error>;
    async fn get_giveaway_by_id(&self, id: &str) -> Result<Option<Giveaway>, Error>;
    /// Full-record write-back; the stored row is replaced by `giveaway`.
    async fn update_giveaway(&self, giveaway: &Giveaway) -> Result<(), Error>;
}

#[async_trait]
pub trait ChannelRepository: Send + Sync {
    async fn get_channel_by_id(&self, channel_id: i64) -> Result<Option<Channel>, Error>;
}

#[async_trait]
pub trait WinnerStatsRepository: Send + Sync {
    /// Bumps the cumulative win counter for every member in `winners`.
    /// Called once per selection run with the full winner delta.
    async fn update_winners_stats(&self, winners: &[GiveawayMember]) -> Result<(), Error>;
}

/// Durable store behind the job scheduler. Claiming must be
/// compare-and-claim at the store level so that two schedulers against the
/// same store never both run one job.
#[async_trait]
pub trait SchedulerJobRepository: Send + Sync {
    async fn insert(&self, job: &ScheduledJob) -> Result<(), Error>;
    /// Atomically claims one job with `run_at <= now` and flips it to
    /// Running, or returns `None` when nothing is due.
    async fn claim_next_due(&self, now: i64) -> Result<Option<ScheduledJob>, Error>;
    async fn mark_completed(&self, job_id: Uuid) -> Result<(), Error>;
    async fn mark_failed(&self, job_id: Uuid, error: &str) -> Result<(), Error>;
    async fn pending_count(&self) -> Result<i64, Error>;
}
