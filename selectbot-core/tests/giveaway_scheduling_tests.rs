// File: selectbot-core/tests/giveaway_scheduling_tests.rs
//
// Arming campaigns on the durable scheduler and driving the end job all
// the way through the dispatch loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use selectbot_common::models::giveaway::{Deadline, GiveawayStatus};
use selectbot_common::models::job::JobStatus;
use selectbot_core::scheduler::Scheduler;
use selectbot_core::services::giveaway::{
    EndJobArgs, END_GIVEAWAY_ACTION, PUBLISH_GIVEAWAY_ACTION,
};
use selectbot_core::test_utils::helpers::{member, sample_giveaway, InMemoryJobRepository, TestHarness};
use selectbot_core::utils::time::current_epoch;

#[tokio::test]
async fn time_deadline_campaign_arms_publish_and_end_jobs() {
    let harness = TestHarness::new();
    let service = Arc::new(harness.service());
    let jobs = Arc::new(InMemoryJobRepository::default());
    let scheduler = Arc::new(Scheduler::new(jobs.clone(), service.clone(), Duration::from_secs(5)));

    let mut giveaway = sample_giveaway("s1");
    giveaway.publish_time = 1_000;
    giveaway.deadline = Deadline::Time { time: 2_000 };

    service.schedule_giveaway(&scheduler, &giveaway, false).await.unwrap();

    let all = jobs.jobs.lock().await;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].action, PUBLISH_GIVEAWAY_ACTION);
    assert_eq!(all[0].run_at, 1_000);
    assert_eq!(all[1].action, END_GIVEAWAY_ACTION);
    assert_eq!(all[1].run_at, 2_000);

    // the end job carries the deadline it was armed against
    let args: EndJobArgs = serde_json::from_value(all[1].args.clone()).unwrap();
    assert_eq!(args.giveaway_id, "s1");
    assert_eq!(args.scheduled_for, 2_000);
}

#[tokio::test]
async fn member_threshold_campaign_arms_only_the_publish_job() {
    let harness = TestHarness::new();
    let service = Arc::new(harness.service());
    let jobs = Arc::new(InMemoryJobRepository::default());
    let scheduler = Arc::new(Scheduler::new(jobs.clone(), service.clone(), Duration::from_secs(5)));

    let mut giveaway = sample_giveaway("s2");
    giveaway.deadline = Deadline::Members { members: 50 };

    service.schedule_giveaway(&scheduler, &giveaway, false).await.unwrap();

    let all = jobs.jobs.lock().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].action, PUBLISH_GIVEAWAY_ACTION);
}

#[tokio::test]
async fn rearming_a_published_campaign_skips_the_publish_job() {
    let harness = TestHarness::new();
    let service = Arc::new(harness.service());
    let jobs = Arc::new(InMemoryJobRepository::default());
    let scheduler = Arc::new(Scheduler::new(jobs.clone(), service.clone(), Duration::from_secs(5)));

    let giveaway = sample_giveaway("s3");
    service.schedule_giveaway(&scheduler, &giveaway, true).await.unwrap();

    let all = jobs.jobs.lock().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].action, END_GIVEAWAY_ACTION);
}

#[tokio::test]
async fn due_end_job_closes_the_campaign_through_the_dispatch_loop() {
    let harness = TestHarness::new();
    let service = Arc::new(harness.service());
    let jobs = Arc::new(InMemoryJobRepository::default());
    let scheduler = Arc::new(Scheduler::new(
        jobs.clone(),
        service.clone(),
        Duration::from_millis(20),
    ));

    let deadline = current_epoch() - 30;
    let mut giveaway = sample_giveaway("s4");
    giveaway.status = GiveawayStatus::Start;
    giveaway.members = vec![member("A", 1), member("B", 2), member("C", 3)];
    giveaway.winners_count = 2;
    giveaway.deadline = Deadline::Time { time: deadline };
    harness.giveaways.insert(giveaway.clone()).await;

    service.schedule_giveaway(&scheduler, &giveaway, true).await.unwrap();

    let handle = scheduler.clone().spawn();
    sleep(Duration::from_millis(300)).await;

    let stored = harness.giveaways.get("s4").await.unwrap();
    assert_eq!(stored.status, GiveawayStatus::End);
    assert_eq!(stored.winners.len(), 2);
    assert_eq!(harness.api.sent_messages().await.len(), 1);

    let statuses = jobs.statuses().await;
    assert_eq!(statuses, vec![(END_GIVEAWAY_ACTION.to_string(), JobStatus::Completed)]);

    scheduler.shutdown();
    handle.await.unwrap();
}

#[tokio::test]
async fn unknown_job_action_is_marked_failed() {
    let harness = TestHarness::new();
    let service = Arc::new(harness.service());
    let jobs = Arc::new(InMemoryJobRepository::default());
    let scheduler = Arc::new(Scheduler::new(
        jobs.clone(),
        service.clone(),
        Duration::from_millis(20),
    ));

    scheduler
        .schedule("giveaway.defrost", current_epoch() - 1, serde_json::json!({}))
        .await
        .unwrap();

    let handle = scheduler.clone().spawn();
    sleep(Duration::from_millis(300)).await;

    let all = jobs.jobs.lock().await;
    assert_eq!(all[0].status, JobStatus::Failed);
    assert!(all[0].last_error.as_deref().unwrap_or_default().contains("unknown job action"));
    drop(all);

    scheduler.shutdown();
    handle.await.unwrap();
}
