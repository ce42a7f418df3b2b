//! Giveaway lifecycle: arming the durable jobs, publishing the campaign,
//! drawing winners, and reconciling stale end jobs at fire time.

pub mod markup;
pub mod publisher;
pub mod selection;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use selectbot_common::models::giveaway::{Deadline, Giveaway, GiveawayStatus};
use selectbot_common::models::job::ScheduledJob;
use selectbot_common::traits::chat_traits::ChatApi;
use selectbot_common::traits::repository_traits::{
    ChannelRepository, GiveawayRepository, WinnerStatsRepository,
};

use crate::scheduler::{JobHandler, Scheduler};
use crate::utils::links::{self, DeepLinks};
use crate::utils::time::format_epoch;
use crate::Error;

pub const PUBLISH_GIVEAWAY_ACTION: &str = "giveaway.publish";
pub const END_GIVEAWAY_ACTION: &str = "giveaway.end";

#[derive(Debug, Serialize, Deserialize)]
pub struct PublishJobArgs {
    pub giveaway_id: String,
}

/// End-job payload. `scheduled_for` is the deadline value the job was armed
/// against; at fire time it is compared to the current deadline so a
/// rescheduled campaign silently invalidates the job it left behind.
#[derive(Debug, Serialize, Deserialize)]
pub struct EndJobArgs {
    pub giveaway_id: String,
    pub scheduled_for: i64,
}

pub struct GiveawayService {
    pub(crate) api: Arc<dyn ChatApi>,
    pub(crate) giveaways: Arc<dyn GiveawayRepository>,
    pub(crate) channels: Arc<dyn ChannelRepository>,
    pub(crate) winner_stats: Arc<dyn WinnerStatsRepository>,
    pub(crate) links: DeepLinks,
}

impl GiveawayService {
    pub fn new(
        api: Arc<dyn ChatApi>,
        giveaways: Arc<dyn GiveawayRepository>,
        channels: Arc<dyn ChannelRepository>,
        winner_stats: Arc<dyn WinnerStatsRepository>,
        links: DeepLinks,
    ) -> Self {
        Self {
            api,
            giveaways,
            channels,
            winner_stats,
            links,
        }
    }

    /// Arms the durable jobs for a campaign: the publish job at
    /// `publish_time` and, for time-based campaigns only, the end job at the
    /// deadline. Member-threshold campaigns are closed by the enrollment
    /// path and never get an end job here.
    pub async fn schedule_giveaway(
        &self,
        scheduler: &Scheduler,
        giveaway: &Giveaway,
        skip_publishing: bool,
    ) -> Result<(), Error> {
        if !skip_publishing {
            let args = serde_json::to_value(PublishJobArgs {
                giveaway_id: giveaway.id.clone(),
            })?;
            scheduler
                .schedule(PUBLISH_GIVEAWAY_ACTION, giveaway.publish_time, args)
                .await?;
        }

        match giveaway.deadline {
            Deadline::Members { .. } => {}
            Deadline::Time { time } => {
                let args = serde_json::to_value(EndJobArgs {
                    giveaway_id: giveaway.id.clone(),
                    scheduled_for: time,
                })?;
                scheduler.schedule(END_GIVEAWAY_ACTION, time, args).await?;
                info!(
                    "Armed end job for giveaway {} at {}",
                    giveaway.id,
                    format_epoch(time)
                );
            }
        }
        Ok(())
    }

    /// Fired by the scheduler when a campaign's deadline comes due, and by
    /// the admin flow with `force = true` for an immediate close.
    ///
    /// Reconciliation before executing (skipped when forced):
    /// the campaign must still exist, must not already be ended, must still
    /// close on time, and must still close at the time this job was armed
    /// for. Anything else means a newer schedule owns the campaign and this
    /// job aborts without a trace beyond a log line.
    pub async fn scheduled_end_giveaway(
        &self,
        giveaway_id: &str,
        scheduled_for: Option<i64>,
        force: bool,
    ) -> Result<(), Error> {
        let Some(giveaway) = self.giveaways.get_giveaway_by_id(giveaway_id).await? else {
            info!("Giveaway {} was deleted before its end job fired", giveaway_id);
            return Ok(());
        };

        if !force {
            if giveaway.status == GiveawayStatus::End {
                info!("Giveaway {} already ended; stale end job ignored", giveaway_id);
                return Ok(());
            }
            match giveaway.deadline {
                Deadline::Members { .. } => {
                    info!(
                        "Giveaway {} now closes on member count; stale end job ignored",
                        giveaway_id
                    );
                    return Ok(());
                }
                Deadline::Time { time } => {
                    if Some(time) != scheduled_for {
                        info!(
                            "Giveaway {} was rescheduled (armed for {:?}, deadline now {}); stale end job ignored",
                            giveaway_id, scheduled_for, time
                        );
                        return Ok(());
                    }
                }
            }
        }

        let send_to_id = giveaway.send_to_id;
        let results_link = self.links.results_link(&giveaway.id);
        let report = self.end_giveaway(giveaway).await?;
        self.api
            .send_message(send_to_id, &report, Some(markup::results_keyboard(&results_link)))
            .await?;
        Ok(())
    }

    /// Permalink to the published control message, if the campaign is live.
    pub async fn message_link(&self, giveaway: &Giveaway) -> Result<Option<String>, Error> {
        let Some(top_msg_id) = giveaway.top_msg_id else {
            return Ok(None);
        };
        let channel = self
            .channels
            .get_channel_by_id(giveaway.send_to_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("channel {} not found", giveaway.send_to_id)))?;
        Ok(Some(links::message_link(&channel, top_msg_id)))
    }
}

#[async_trait]
impl JobHandler for GiveawayService {
    async fn handle(&self, job: &ScheduledJob) -> Result<(), Error> {
        match job.action.as_str() {
            PUBLISH_GIVEAWAY_ACTION => {
                let args: PublishJobArgs = serde_json::from_value(job.args.clone())?;
                self.handle_publish_job(&args.giveaway_id).await
            }
            END_GIVEAWAY_ACTION => {
                let args: EndJobArgs = serde_json::from_value(job.args.clone())?;
                self.scheduled_end_giveaway(&args.giveaway_id, Some(args.scheduled_for), false)
                    .await
            }
            other => Err(Error::Scheduler(format!("unknown job action '{other}'"))),
        }
    }
}
