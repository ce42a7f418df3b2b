//! src/scheduler/mod.rs
//!
//! Durable one-shot job scheduler. Jobs live in a shared store, so a
//! restart does not lose them; a job whose fire time passed while the
//! process was down is picked up on the first tick and runs exactly once.
//!
//! There is no cancellation primitive. A job that should no longer run is
//! invalidated logically by its handler (the handler re-checks current
//! state against the state it was armed with).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info};
use uuid::Uuid;

use selectbot_common::models::job::{JobStatus, ScheduledJob};
use selectbot_common::traits::repository_traits::SchedulerJobRepository;

use crate::utils::time::current_epoch;
use crate::Error;

/// Executes claimed jobs. A handler error marks the job Failed and is not
/// retried by the scheduler; retry policy, if any, belongs to the handler.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: &ScheduledJob) -> Result<(), Error>;
}

/// One scheduler per process, constructed at startup and shared by `Arc`.
pub struct Scheduler {
    jobs: Arc<dyn SchedulerJobRepository>,
    handler: Arc<dyn JobHandler>,
    poll_interval: Duration,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Scheduler {
    pub fn new(
        jobs: Arc<dyn SchedulerJobRepository>,
        handler: Arc<dyn JobHandler>,
        poll_interval: Duration,
    ) -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            jobs,
            handler,
            poll_interval,
            shutdown_tx: tx,
            shutdown_rx: rx,
        }
    }

    /// Registers a one-shot job to run at `run_at` (epoch seconds).
    /// A store failure here propagates: the caller must know the job was
    /// never durably recorded.
    pub async fn schedule(
        &self,
        action: &str,
        run_at: i64,
        args: Value,
    ) -> Result<ScheduledJob, Error> {
        let job = ScheduledJob {
            job_id: Uuid::new_v4(),
            action: action.to_string(),
            run_at,
            args,
            status: JobStatus::Pending,
            created_at: Utc::now(),
            last_error: None,
        };
        self.jobs.insert(&job).await?;
        debug!("Scheduled job {} ({}) for {}", job.job_id, job.action, job.run_at);
        Ok(job)
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Starts the dispatch loop. Due jobs are claimed from the store and
    /// each handler runs on its own task, so a slow handler never delays
    /// the timer or other due jobs.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.poll_interval);
            let mut shutdown_rx = self.shutdown_rx.clone();
            info!("Scheduler started (poll interval {:?})", self.poll_interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.dispatch_due().await;
                    }
                    Ok(_) = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            info!("Scheduler shutting down.");
                            break;
                        }
                    }
                }
            }
        })
    }

    async fn dispatch_due(&self) {
        let now = current_epoch();
        loop {
            match self.jobs.claim_next_due(now).await {
                Ok(Some(job)) => {
                    let jobs = Arc::clone(&self.jobs);
                    let handler = Arc::clone(&self.handler);
                    tokio::spawn(async move {
                        debug!("Running job {} ({})", job.job_id, job.action);
                        match handler.handle(&job).await {
                            Ok(()) => {
                                if let Err(e) = jobs.mark_completed(job.job_id).await {
                                    error!("Failed to mark job {} completed: {:?}", job.job_id, e);
                                }
                            }
                            Err(e) => {
                                error!("Job {} ({}) failed: {:?}", job.job_id, job.action, e);
                                if let Err(e2) = jobs.mark_failed(job.job_id, &e.to_string()).await {
                                    error!("Failed to mark job {} failed: {:?}", job.job_id, e2);
                                }
                            }
                        }
                    });
                }
                Ok(None) => break,
                Err(e) => {
                    error!("Failed to claim due jobs: {:?}", e);
                    break;
                }
            }
        }
    }
}
