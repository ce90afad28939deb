// crates/server/src/jobs/types.rs
//! Wire types for the job system: status enum, snapshot, and the two
//! broadcast event categories.

use serde::Serialize;
use ts_rs::TS;

use simdeck_core::{SimPayload, SimResult};

/// Unique identifier for a simulation job.
pub type JobId = u64;

/// Lifecycle status of a simulation job.
///
/// `Idle` is the sentinel reported before the first job ever starts; a live
/// job is created directly in `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum JobStatus {
    Idle = 0,
    Running = 1,
    Cancelling = 2,
    Completed = 3,
    Cancelled = 4,
    Failed = 5,
}

impl JobStatus {
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Running,
            2 => Self::Cancelling,
            3 => Self::Completed,
            4 => Self::Cancelled,
            5 => Self::Failed,
            _ => Self::Idle,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Cancelling => "cancelling",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    /// A job in an active state occupies the controller's single slot.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Cancelling)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Immutable status() view of the current (or last) job.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[cfg_attr(test, derive(serde::Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | null")]
    pub job_id: Option<JobId>,
    pub status: String,
    pub percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SimResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobSnapshot {
    /// The sentinel returned before any job has ever started.
    pub fn idle() -> Self {
        Self {
            job_id: None,
            status: JobStatus::Idle.as_str().to_string(),
            percent: 0,
            phase: None,
            started_at: None,
            result: None,
            error: None,
        }
    }
}

/// One-time acceptance notification, broadcast before any progress event
/// for the same job.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct StartedEvent {
    #[ts(type = "number")]
    pub job_id: JobId,
    /// Echo of the caller's parameters.
    pub payload: SimPayload,
    pub timestamp: String,
}

/// Ephemeral partial-completion notification.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    #[ts(type = "number")]
    pub job_id: JobId,
    pub phase: String,
    pub percent: u8,
    pub message: String,
    pub timestamp: String,
}
