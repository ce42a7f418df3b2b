// File: selectbot-core/tests/scheduler_tests.rs
//
// The scheduler against an in-memory store with the same claim semantics
// as the Postgres job repository.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;
use tokio::time::sleep;

use selectbot_common::models::job::{JobStatus, ScheduledJob};
use selectbot_common::traits::repository_traits::SchedulerJobRepository;
use selectbot_core::scheduler::{JobHandler, Scheduler};
use selectbot_core::test_utils::helpers::InMemoryJobRepository;
use selectbot_core::utils::time::current_epoch;
use selectbot_core::Error;

/// Records every invocation; actions listed in `fail_actions` error out.
#[derive(Default)]
struct RecordingHandler {
    handled: Mutex<Vec<String>>,
    fail_actions: HashSet<String>,
}

impl RecordingHandler {
    fn failing(action: &str) -> Self {
        let mut fail_actions = HashSet::new();
        fail_actions.insert(action.to_string());
        Self { handled: Mutex::new(Vec::new()), fail_actions }
    }

    async fn invocations(&self) -> Vec<String> {
        self.handled.lock().await.clone()
    }
}

#[async_trait]
impl JobHandler for RecordingHandler {
    async fn handle(&self, job: &ScheduledJob) -> Result<(), Error> {
        self.handled.lock().await.push(job.action.clone());
        if self.fail_actions.contains(&job.action) {
            return Err(Error::Scheduler("handler blew up".to_string()));
        }
        Ok(())
    }
}

/// Store that refuses every write.
struct BrokenJobRepository;

#[async_trait]
impl SchedulerJobRepository for BrokenJobRepository {
    async fn insert(&self, _job: &ScheduledJob) -> Result<(), Error> {
        Err(Error::Scheduler("job store unavailable".to_string()))
    }
    async fn claim_next_due(&self, _now: i64) -> Result<Option<ScheduledJob>, Error> {
        Err(Error::Scheduler("job store unavailable".to_string()))
    }
    async fn mark_completed(&self, _job_id: uuid::Uuid) -> Result<(), Error> {
        Err(Error::Scheduler("job store unavailable".to_string()))
    }
    async fn mark_failed(&self, _job_id: uuid::Uuid, _error: &str) -> Result<(), Error> {
        Err(Error::Scheduler("job store unavailable".to_string()))
    }
    async fn pending_count(&self) -> Result<i64, Error> {
        Err(Error::Scheduler("job store unavailable".to_string()))
    }
}

fn scheduler_with(
    jobs: Arc<InMemoryJobRepository>,
    handler: Arc<RecordingHandler>,
) -> Arc<Scheduler> {
    Arc::new(Scheduler::new(jobs, handler, Duration::from_millis(20)))
}

#[tokio::test]
async fn scheduling_persists_a_pending_job() {
    let jobs = Arc::new(InMemoryJobRepository::default());
    let handler = Arc::new(RecordingHandler::default());
    let scheduler = scheduler_with(jobs.clone(), handler);

    let job = scheduler
        .schedule("demo.action", current_epoch() + 3600, json!({"k": "v"}))
        .await
        .unwrap();

    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(jobs.pending_count().await.unwrap(), 1);
}

#[tokio::test]
async fn store_failure_at_schedule_time_propagates() {
    let handler = Arc::new(RecordingHandler::default());
    let scheduler = Arc::new(Scheduler::new(
        Arc::new(BrokenJobRepository),
        handler,
        Duration::from_millis(20),
    ));

    let result = scheduler.schedule("demo.action", 0, json!({})).await;
    assert!(matches!(result, Err(Error::Scheduler(_))));
}

#[tokio::test]
async fn overdue_job_fires_promptly_and_exactly_once() {
    let jobs = Arc::new(InMemoryJobRepository::default());
    let handler = Arc::new(RecordingHandler::default());
    let scheduler = scheduler_with(jobs.clone(), handler.clone());

    // armed in the past, as after process downtime
    scheduler
        .schedule("demo.overdue", current_epoch() - 60, json!({}))
        .await
        .unwrap();

    let handle = scheduler.clone().spawn();
    sleep(Duration::from_millis(300)).await;

    assert_eq!(handler.invocations().await, vec!["demo.overdue".to_string()]);
    let statuses = jobs.statuses().await;
    assert_eq!(statuses[0].1, JobStatus::Completed);

    scheduler.shutdown();
    handle.await.unwrap();
}

#[tokio::test]
async fn future_job_does_not_fire_early() {
    let jobs = Arc::new(InMemoryJobRepository::default());
    let handler = Arc::new(RecordingHandler::default());
    let scheduler = scheduler_with(jobs.clone(), handler.clone());

    scheduler
        .schedule("demo.later", current_epoch() + 3600, json!({}))
        .await
        .unwrap();

    let handle = scheduler.clone().spawn();
    sleep(Duration::from_millis(200)).await;

    assert!(handler.invocations().await.is_empty());
    assert_eq!(jobs.pending_count().await.unwrap(), 1);

    scheduler.shutdown();
    handle.await.unwrap();
}

#[tokio::test]
async fn failed_handler_marks_the_job_failed_without_retry() {
    let jobs = Arc::new(InMemoryJobRepository::default());
    let handler = Arc::new(RecordingHandler::failing("demo.broken"));
    let scheduler = scheduler_with(jobs.clone(), handler.clone());

    scheduler
        .schedule("demo.broken", current_epoch() - 1, json!({}))
        .await
        .unwrap();

    let handle = scheduler.clone().spawn();
    sleep(Duration::from_millis(300)).await;

    // invoked once, not retried on later ticks
    assert_eq!(handler.invocations().await.len(), 1);
    let all = jobs.jobs.lock().await;
    assert_eq!(all[0].status, JobStatus::Failed);
    assert_eq!(all[0].last_error.as_deref(), Some("Scheduler error: handler blew up"));
    drop(all);

    scheduler.shutdown();
    handle.await.unwrap();
}

#[tokio::test]
async fn both_due_jobs_fire_on_one_tick() {
    let jobs = Arc::new(InMemoryJobRepository::default());
    let handler = Arc::new(RecordingHandler::default());
    let scheduler = scheduler_with(jobs.clone(), handler.clone());

    scheduler.schedule("demo.first", current_epoch() - 10, json!({})).await.unwrap();
    scheduler.schedule("demo.second", current_epoch() - 5, json!({})).await.unwrap();

    let handle = scheduler.clone().spawn();
    sleep(Duration::from_millis(300)).await;

    let mut invocations = handler.invocations().await;
    invocations.sort();
    assert_eq!(invocations, vec!["demo.first".to_string(), "demo.second".to_string()]);

    scheduler.shutdown();
    handle.await.unwrap();
}

#[tokio::test]
async fn shutdown_stops_dispatching() {
    let jobs = Arc::new(InMemoryJobRepository::default());
    let handler = Arc::new(RecordingHandler::default());
    let scheduler = scheduler_with(jobs.clone(), handler.clone());

    let handle = scheduler.clone().spawn();
    sleep(Duration::from_millis(50)).await;

    scheduler.shutdown();
    handle.await.unwrap();
    assert!(scheduler.is_shutdown());

    scheduler
        .schedule("demo.after", current_epoch() - 1, json!({}))
        .await
        .unwrap();
    sleep(Duration::from_millis(200)).await;

    assert!(handler.invocations().await.is_empty());
    assert_eq!(jobs.pending_count().await.unwrap(), 1);
}
