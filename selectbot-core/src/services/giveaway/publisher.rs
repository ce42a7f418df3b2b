//! Publishing: replicate the organizer's source messages into the target
//! channel, with the entry button attached to the bottom message.

use tracing::info;

use selectbot_common::models::giveaway::{Giveaway, GiveawayStatus};

use crate::Error;

use super::{markup, GiveawayService};

impl GiveawayService {
    /// Copies the campaign content into `send_to_id` and flips the record
    /// to Start.
    ///
    /// With a single source message one copy carries the button; otherwise
    /// everything but the last message goes out as a plain batch and the
    /// last copy carries the button, keeping the control at the bottom of
    /// the published set. The record is only written back after every send
    /// succeeded, so a failed publish leaves the campaign at Waiting and
    /// retryable.
    pub async fn publish_giveaway(&self, giveaway: &Giveaway, test_mode: bool) -> Result<(), Error> {
        let peer = if test_mode { giveaway.admin } else { giveaway.send_to_id };
        let keyboard = markup::entry_keyboard(giveaway, test_mode, &self.links);

        let top_msg_id = if let [only] = giveaway.msg_ids.as_slice() {
            self.api
                .copy_message(peer, giveaway.admin, *only, Some(keyboard))
                .await?
        } else {
            let (last, batch) = giveaway.msg_ids.split_last().ok_or_else(|| {
                Error::Platform(format!("giveaway {} has no messages to publish", giveaway.id))
            })?;
            self.api.copy_messages(peer, giveaway.admin, batch, true).await?;
            self.api
                .copy_message(peer, giveaway.admin, *last, Some(keyboard))
                .await?
        };

        if !test_mode {
            let updated = Giveaway {
                top_msg_id: Some(top_msg_id),
                status: GiveawayStatus::Start,
                ..giveaway.clone()
            };
            self.giveaways.update_giveaway(&updated).await?;
            info!(
                "Giveaway {} published to {} (control message {})",
                giveaway.id, giveaway.send_to_id, top_msg_id
            );
        }
        Ok(())
    }

    /// Scheduler entry point for the publish job.
    pub(crate) async fn handle_publish_job(&self, giveaway_id: &str) -> Result<(), Error> {
        match self.giveaways.get_giveaway_by_id(giveaway_id).await? {
            Some(giveaway) => self.publish_giveaway(&giveaway, false).await,
            None => {
                info!("Giveaway {} was deleted before its publish job fired", giveaway_id);
                Ok(())
            }
        }
    }
}
