//! Winner selection: uniform shuffle over the participant pool, filtered
//! through the cross-channel membership check.

use std::collections::{BTreeSet, HashSet};

use rand::seq::SliceRandom;
use tracing::info;

use selectbot_common::models::giveaway::{Giveaway, GiveawayMember, GiveawayStatus};

use crate::Error;

use super::GiveawayService;

const RESULTS_HEADER: &str = "🎉 Розыгрыш завершен! Победители:\n\n";
const EXTRA_WINNERS_HEADER: &str = "🎉 Дополнительные победители:\n\n";
pub const NO_EXTRA_WINNERS: &str =
    "Не нашлось участников, выполнивших условия розыгрыша, дополнительных победителей нет!";

impl GiveawayService {
    /// Whether `member_id` is still subscribed to every channel the
    /// campaign requires (the target channel counts as required).
    ///
    /// A channel the bot has lost visibility into is skipped entirely: no
    /// information is treated as "don't know, don't block", so losing admin
    /// rights in one channel never disqualifies the whole participant pool.
    pub(crate) async fn check_conditions(
        &self,
        member_id: i64,
        giveaway: &Giveaway,
    ) -> Result<bool, Error> {
        let mut required: BTreeSet<i64> = giveaway.channels.iter().copied().collect();
        required.insert(giveaway.send_to_id);

        for channel_id in required {
            match self.api.get_chat_member(channel_id, member_id).await {
                Ok(status) => {
                    if !status.is_subscribed() {
                        return Ok(false);
                    }
                }
                Err(Error::Forbidden(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(true)
    }

    /// Draws winners and closes the campaign.
    ///
    /// Winners already present on the record are kept in front; the shuffled
    /// pool only fills the remaining places, and nobody is selected twice.
    /// The placement report is built before any store write, so a write
    /// failure can cost the persisted winner list but never the report.
    pub async fn end_giveaway(&self, giveaway: Giveaway) -> Result<String, Error> {
        let mut pool = giveaway.members.clone();
        pool.shuffle(&mut rand::rng());

        let mut winners = giveaway.winners.clone();
        let mut picked: HashSet<i64> = winners.iter().map(|w| w.id).collect();
        for member in pool {
            if winners.len() >= giveaway.winners_count {
                break;
            }
            if picked.contains(&member.id) {
                continue;
            }
            if self.check_conditions(member.id, &giveaway).await? {
                picked.insert(member.id);
                winners.push(member);
            }
        }

        let report = format_placement_report(RESULTS_HEADER, &winners);
        info!(
            "Giveaway {} ended with {}/{} winner(s)",
            giveaway.id,
            winners.len(),
            giveaway.winners_count
        );

        let updated = Giveaway {
            status: GiveawayStatus::End,
            winners,
            ..giveaway
        };
        self.giveaways.update_giveaway(&updated).await?;
        self.winner_stats.update_winners_stats(&updated.winners).await?;
        Ok(report)
    }

    /// Draws up to `new_winners_count` additional winners from the members
    /// who have not won yet. Appends to the existing winner list; the
    /// returned report covers only the increment, numbered from 1.
    pub async fn add_winners(
        &self,
        giveaway: Giveaway,
        new_winners_count: usize,
    ) -> Result<String, Error> {
        let existing: HashSet<i64> = giveaway.winners.iter().map(|w| w.id).collect();
        let mut pool: Vec<GiveawayMember> = giveaway
            .members
            .iter()
            .filter(|m| !existing.contains(&m.id))
            .cloned()
            .collect();
        pool.shuffle(&mut rand::rng());

        let mut new_winners: Vec<GiveawayMember> = Vec::new();
        let mut picked = existing;
        for member in pool {
            if new_winners.len() >= new_winners_count {
                break;
            }
            if picked.contains(&member.id) {
                continue;
            }
            if self.check_conditions(member.id, &giveaway).await? {
                picked.insert(member.id);
                new_winners.push(member);
            }
        }

        if new_winners.is_empty() {
            info!("Giveaway {}: no eligible members left to add", giveaway.id);
            return Ok(NO_EXTRA_WINNERS.to_string());
        }

        let report = format_placement_report(EXTRA_WINNERS_HEADER, &new_winners);

        let mut updated = giveaway;
        updated.winners.extend(new_winners.iter().cloned());
        self.giveaways.update_giveaway(&updated).await?;
        self.winner_stats.update_winners_stats(&new_winners).await?;
        Ok(report)
    }
}

/// `{place}. {name} ([{id}](tg://user?id={id}))` per line, 1-indexed,
/// trailing whitespace trimmed.
fn format_placement_report(header: &str, winners: &[GiveawayMember]) -> String {
    let mut text = header.to_string();
    for (index, winner) in winners.iter().enumerate() {
        text.push_str(&format!(
            "{}. {} ([{}](tg://user?id={}))\n",
            index + 1,
            winner.name,
            winner.id,
            winner.id
        ));
    }
    text.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str, id: i64) -> GiveawayMember {
        GiveawayMember { name: name.to_string(), id }
    }

    #[test]
    fn report_lines_are_one_indexed() {
        let report =
            format_placement_report(RESULTS_HEADER, &[member("Alice", 1), member("Bob", 2)]);
        let lines: Vec<&str> = report.lines().collect();
        assert!(lines[0].starts_with("🎉"));
        assert_eq!(lines[2], "1. Alice ([1](tg://user?id=1))");
        assert_eq!(lines[3], "2. Bob ([2](tg://user?id=2))");
        assert!(!report.ends_with('\n'));
    }

    #[test]
    fn empty_winner_list_leaves_only_the_header() {
        let report = format_placement_report(RESULTS_HEADER, &[]);
        assert_eq!(report, RESULTS_HEADER.trim_end());
    }
}
