use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobStatus::Pending),
            "running" => Some(JobStatus::Running),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }
}

/// One durable one-shot job. Beyond `(action, run_at, args)` the record is
/// opaque to handlers; `args` is whatever the scheduling site serialized.
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    pub job_id: Uuid,
    pub action: String,
    /// Absolute fire time, epoch seconds.
    pub run_at: i64,
    pub args: Value,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub last_error: Option<String>,
}
