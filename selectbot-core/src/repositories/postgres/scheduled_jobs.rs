// File: selectbot-core/src/repositories/postgres/scheduled_jobs.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use selectbot_common::error::Error;
use selectbot_common::models::job::{JobStatus, ScheduledJob};
use selectbot_common::traits::repository_traits::SchedulerJobRepository;

pub struct PostgresSchedulerJobRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresSchedulerJobRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_job(r: &sqlx::postgres::PgRow) -> Result<ScheduledJob, Error> {
    let status_str: String = r.try_get("status")?;
    let status = JobStatus::from_str(&status_str)
        .ok_or_else(|| Error::Parse(format!("unknown job status '{status_str}'")))?;

    Ok(ScheduledJob {
        job_id: r.try_get("job_id")?,
        action: r.try_get("action")?,
        run_at: r.try_get("run_at")?,
        args: r.try_get("args")?,
        status,
        created_at: r.try_get("created_at")?,
        last_error: r.try_get("last_error")?,
    })
}

#[async_trait]
impl SchedulerJobRepository for PostgresSchedulerJobRepository {
    async fn insert(&self, job: &ScheduledJob) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO scheduled_jobs (
                job_id,
                action,
                run_at,
                args,
                status,
                created_at,
                last_error
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            "#,
        )
        .bind(job.job_id)
        .bind(&job.action)
        .bind(job.run_at)
        .bind(&job.args)
        .bind(job.status.as_str())
        .bind(job.created_at)
        .bind(&job.last_error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn claim_next_due(&self, now: i64) -> Result<Option<ScheduledJob>, Error> {
        // SKIP LOCKED keeps two schedulers sharing the store from both
        // claiming the same row.
        let row_opt = sqlx::query(
            r#"
            UPDATE scheduled_jobs
            SET status = 'running'
            WHERE job_id = (
                SELECT job_id
                FROM scheduled_jobs
                WHERE status = 'pending'
                  AND run_at <= $1
                ORDER BY run_at
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING
                job_id,
                action,
                run_at,
                args,
                status,
                created_at,
                last_error
            "#,
        )
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        match row_opt {
            Some(r) => Ok(Some(row_to_job(&r)?)),
            None => Ok(None),
        }
    }

    async fn mark_completed(&self, job_id: Uuid) -> Result<(), Error> {
        sqlx::query("UPDATE scheduled_jobs SET status = 'completed' WHERE job_id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_failed(&self, job_id: Uuid, error: &str) -> Result<(), Error> {
        sqlx::query("UPDATE scheduled_jobs SET status = 'failed', last_error = $2 WHERE job_id = $1")
            .bind(job_id)
            .bind(error)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn pending_count(&self) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS pending FROM scheduled_jobs WHERE status = 'pending'")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("pending")?;
        Ok(count)
    }
}
