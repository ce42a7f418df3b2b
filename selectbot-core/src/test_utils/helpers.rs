// File: selectbot-core/src/test_utils/helpers.rs

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use selectbot_common::error::Error;
use selectbot_common::models::channel::Channel;
use selectbot_common::models::giveaway::{Deadline, Giveaway, GiveawayMember, GiveawayStatus};
use selectbot_common::models::job::{JobStatus, ScheduledJob};
use selectbot_common::models::telegram::{ChatMemberStatus, InlineKeyboardMarkup};
use selectbot_common::traits::chat_traits::ChatApi;
use selectbot_common::traits::repository_traits::{
    ChannelRepository, GiveawayRepository, SchedulerJobRepository, WinnerStatsRepository,
};

/// Giveaway store backed by a HashMap.
#[derive(Default)]
pub struct InMemoryGiveawayRepository {
    pub giveaways: Mutex<HashMap<String, Giveaway>>,
}

impl InMemoryGiveawayRepository {
    pub async fn insert(&self, giveaway: Giveaway) {
        self.giveaways.lock().await.insert(giveaway.id.clone(), giveaway);
    }

    pub async fn remove(&self, id: &str) {
        self.giveaways.lock().await.remove(id);
    }

    pub async fn get(&self, id: &str) -> Option<Giveaway> {
        self.giveaways.lock().await.get(id).cloned()
    }
}

#[async_trait]
impl GiveawayRepository for InMemoryGiveawayRepository {
    async fn create_giveaway(&self, giveaway: &Giveaway) -> Result<(), Error> {
        self.insert(giveaway.clone()).await;
        Ok(())
    }

    async fn get_giveaway_by_id(&self, id: &str) -> Result<Option<Giveaway>, Error> {
        Ok(self.get(id).await)
    }

    async fn update_giveaway(&self, giveaway: &Giveaway) -> Result<(), Error> {
        self.insert(giveaway.clone()).await;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryChannelRepository {
    pub channels: Mutex<HashMap<i64, Channel>>,
}

impl InMemoryChannelRepository {
    pub async fn insert(&self, channel: Channel) {
        self.channels.lock().await.insert(channel.id, channel);
    }
}

#[async_trait]
impl ChannelRepository for InMemoryChannelRepository {
    async fn get_channel_by_id(&self, channel_id: i64) -> Result<Option<Channel>, Error> {
        Ok(self.channels.lock().await.get(&channel_id).cloned())
    }
}

/// Records every stats update instead of counting wins.
#[derive(Default)]
pub struct RecordingStatsRepository {
    pub updates: Mutex<Vec<Vec<GiveawayMember>>>,
}

#[async_trait]
impl WinnerStatsRepository for RecordingStatsRepository {
    async fn update_winners_stats(&self, winners: &[GiveawayMember]) -> Result<(), Error> {
        self.updates.lock().await.push(winners.to_vec());
        Ok(())
    }
}

/// Job store with the same claim semantics as the Postgres repository:
/// claiming flips Pending -> Running atomically under one lock.
#[derive(Default)]
pub struct InMemoryJobRepository {
    pub jobs: Mutex<Vec<ScheduledJob>>,
}

impl InMemoryJobRepository {
    pub async fn statuses(&self) -> Vec<(String, JobStatus)> {
        self.jobs
            .lock()
            .await
            .iter()
            .map(|j| (j.action.clone(), j.status))
            .collect()
    }
}

#[async_trait]
impl SchedulerJobRepository for InMemoryJobRepository {
    async fn insert(&self, job: &ScheduledJob) -> Result<(), Error> {
        self.jobs.lock().await.push(job.clone());
        Ok(())
    }

    async fn claim_next_due(&self, now: i64) -> Result<Option<ScheduledJob>, Error> {
        let mut jobs = self.jobs.lock().await;
        let due = jobs
            .iter_mut()
            .filter(|j| j.status == JobStatus::Pending && j.run_at <= now)
            .min_by_key(|j| j.run_at);
        if let Some(job) = due {
            job.status = JobStatus::Running;
            Ok(Some(job.clone()))
        } else {
            Ok(None)
        }
    }

    async fn mark_completed(&self, job_id: Uuid) -> Result<(), Error> {
        let mut jobs = self.jobs.lock().await;
        if let Some(job) = jobs.iter_mut().find(|j| j.job_id == job_id) {
            job.status = JobStatus::Completed;
        }
        Ok(())
    }

    async fn mark_failed(&self, job_id: Uuid, error: &str) -> Result<(), Error> {
        let mut jobs = self.jobs.lock().await;
        if let Some(job) = jobs.iter_mut().find(|j| j.job_id == job_id) {
            job.status = JobStatus::Failed;
            job.last_error = Some(error.to_string());
        }
        Ok(())
    }

    async fn pending_count(&self) -> Result<i64, Error> {
        let jobs = self.jobs.lock().await;
        Ok(jobs.iter().filter(|j| j.status == JobStatus::Pending).count() as i64)
    }
}

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub chat_id: i64,
    pub text: String,
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Clone)]
pub struct CopiedMessage {
    pub chat_id: i64,
    pub from_chat_id: i64,
    pub message_id: i64,
    pub with_markup: bool,
}

/// Scriptable chat client. Membership defaults to `Member` and can be
/// overridden per `(chat, user)`; whole channels can be marked forbidden.
/// Every outbound call is recorded.
pub struct FakeChatApi {
    pub default_status: ChatMemberStatus,
    pub statuses: Mutex<HashMap<(i64, i64), ChatMemberStatus>>,
    pub forbidden_channels: Mutex<HashSet<i64>>,
    pub sent: Mutex<Vec<SentMessage>>,
    pub copied: Mutex<Vec<CopiedMessage>>,
    next_message_id: AtomicI64,
}

impl Default for FakeChatApi {
    fn default() -> Self {
        Self {
            default_status: ChatMemberStatus::Member,
            statuses: Mutex::new(HashMap::new()),
            forbidden_channels: Mutex::new(HashSet::new()),
            sent: Mutex::new(Vec::new()),
            copied: Mutex::new(Vec::new()),
            next_message_id: AtomicI64::new(1000),
        }
    }
}

impl FakeChatApi {
    pub async fn set_status(&self, chat_id: i64, user_id: i64, status: ChatMemberStatus) {
        self.statuses.lock().await.insert((chat_id, user_id), status);
    }

    pub async fn set_forbidden(&self, chat_id: i64) {
        self.forbidden_channels.lock().await.insert(chat_id);
    }

    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn copied_messages(&self) -> Vec<CopiedMessage> {
        self.copied.lock().await.clone()
    }

    fn next_id(&self) -> i64 {
        self.next_message_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatApi for FakeChatApi {
    async fn get_chat_member(&self, chat_id: i64, user_id: i64) -> Result<ChatMemberStatus, Error> {
        if self.forbidden_channels.lock().await.contains(&chat_id) {
            return Err(Error::Forbidden(format!("bot is not a member of chat {chat_id}")));
        }
        let statuses = self.statuses.lock().await;
        Ok(statuses.get(&(chat_id, user_id)).copied().unwrap_or(self.default_status))
    }

    async fn copy_message(
        &self,
        chat_id: i64,
        from_chat_id: i64,
        message_id: i64,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<i64, Error> {
        self.copied.lock().await.push(CopiedMessage {
            chat_id,
            from_chat_id,
            message_id,
            with_markup: reply_markup.is_some(),
        });
        Ok(self.next_id())
    }

    async fn copy_messages(
        &self,
        chat_id: i64,
        from_chat_id: i64,
        message_ids: &[i64],
        _remove_caption: bool,
    ) -> Result<Vec<i64>, Error> {
        let mut copied = self.copied.lock().await;
        let mut ids = Vec::with_capacity(message_ids.len());
        for message_id in message_ids {
            copied.push(CopiedMessage {
                chat_id,
                from_chat_id,
                message_id: *message_id,
                with_markup: false,
            });
            ids.push(self.next_id());
        }
        Ok(ids)
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<i64, Error> {
        self.sent.lock().await.push(SentMessage {
            chat_id,
            text: text.to_string(),
            reply_markup,
        });
        Ok(self.next_id())
    }
}

pub fn member(name: &str, id: i64) -> GiveawayMember {
    GiveawayMember { name: name.to_string(), id }
}

/// A waiting campaign with sensible defaults: two required channels plus
/// the target channel, a time deadline, and no participants yet.
pub fn sample_giveaway(id: &str) -> Giveaway {
    Giveaway {
        id: id.to_string(),
        created: 1_700_000_000,
        publish_time: 1_700_003_600,
        button_text: "Участвовать".to_string(),
        admin: 500,
        channels: vec![-100_111, -100_222],
        send_to_id: -100_333,
        members: vec![],
        status: GiveawayStatus::Waiting,
        winners: vec![],
        winners_count: 2,
        msg_ids: vec![11],
        deadline: Deadline::Time { time: 1_700_007_200 },
        top_msg_id: None,
        preview_text: "preview".to_string(),
    }
}

/// Bundles the in-memory collaborators a `GiveawayService` needs.
pub struct TestHarness {
    pub api: Arc<FakeChatApi>,
    pub giveaways: Arc<InMemoryGiveawayRepository>,
    pub channels: Arc<InMemoryChannelRepository>,
    pub stats: Arc<RecordingStatsRepository>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            api: Arc::new(FakeChatApi::default()),
            giveaways: Arc::new(InMemoryGiveawayRepository::default()),
            channels: Arc::new(InMemoryChannelRepository::default()),
            stats: Arc::new(RecordingStatsRepository::default()),
        }
    }

    pub fn service(&self) -> crate::services::giveaway::GiveawayService {
        crate::services::giveaway::GiveawayService::new(
            self.api.clone(),
            self.giveaways.clone(),
            self.channels.clone(),
            self.stats.clone(),
            crate::utils::links::DeepLinks::new("iselectbot"),
        )
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
