// crates/server/src/jobs/state.rs
//! Per-job state record.
//!
//! Numeric fields are lock-free atomics so the status endpoint reads
//! without contending with the running engine; strings and the result go
//! behind `RwLock`s. Terminal data is written before the status word flips,
//! so a snapshot taken at any moment is pre- or post-transition, never torn.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, RwLock};

use simdeck_core::{CancelToken, SimPayload, SimResult};

use super::types::{JobId, JobSnapshot, JobStatus};

/// State of one simulation job, shared between the controller, the engine
/// continuation, and the status endpoint.
pub struct JobState {
    id: JobId,
    payload: SimPayload,
    started_at: String,
    status: AtomicU8,
    percent: AtomicU8,
    phase: RwLock<String>,
    message: RwLock<Option<String>>,
    result: RwLock<Option<SimResult>>,
    error: RwLock<Option<String>>,
    token: Arc<CancelToken>,
}

impl JobState {
    /// Create a job directly in `Running` with a fresh token binding.
    pub fn new(id: JobId, payload: SimPayload, token: Arc<CancelToken>) -> Self {
        Self {
            id,
            payload,
            started_at: chrono::Utc::now().to_rfc3339(),
            status: AtomicU8::new(JobStatus::Running as u8),
            percent: AtomicU8::new(0),
            phase: RwLock::new(String::new()),
            message: RwLock::new(None),
            result: RwLock::new(None),
            error: RwLock::new(None),
            token,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn payload(&self) -> &SimPayload {
        &self.payload
    }

    pub fn token(&self) -> &Arc<CancelToken> {
        &self.token
    }

    pub fn status(&self) -> JobStatus {
        JobStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Record engine progress. Percent is clamped monotonic: a report lower
    /// than what was already published is raised to the current maximum.
    /// Returns the effective percent, or `None` once the job is terminal.
    pub fn record_progress(&self, phase: &str, percent: u8, message: &str) -> Option<u8> {
        if self.status().is_terminal() {
            return None;
        }
        let requested = percent.min(100);
        let previous = self.percent.fetch_max(requested, Ordering::AcqRel);
        let effective = previous.max(requested);

        match self.phase.write() {
            Ok(mut guard) => *guard = phase.to_string(),
            Err(e) => tracing::error!("RwLock poisoned writing phase: {e}"),
        }
        match self.message.write() {
            Ok(mut guard) => *guard = Some(message.to_string()),
            Err(e) => tracing::error!("RwLock poisoned writing message: {e}"),
        }
        Some(effective)
    }

    /// `Running → Cancelling`. Returns `false` when the job was not
    /// `Running` (already cancelling or terminal).
    pub fn set_cancelling(&self) -> bool {
        self.status
            .compare_exchange(
                JobStatus::Running as u8,
                JobStatus::Cancelling as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Terminal transition to `Completed`. Wins the cancellation race: an
    /// engine that finishes before observing the token completes the job
    /// even from `Cancelling`.
    pub fn complete(&self, result: SimResult) -> bool {
        match self.result.write() {
            Ok(mut guard) => *guard = Some(result),
            Err(e) => {
                tracing::error!("RwLock poisoned writing result: {e}");
                return false;
            }
        }
        self.percent.fetch_max(100, Ordering::AcqRel);
        self.finish(JobStatus::Completed)
    }

    /// Terminal transition to `Failed` with an error description.
    pub fn fail(&self, error: impl Into<String>) -> bool {
        match self.error.write() {
            Ok(mut guard) => *guard = Some(error.into()),
            Err(e) => {
                tracing::error!("RwLock poisoned writing error: {e}");
                return false;
            }
        }
        self.finish(JobStatus::Failed)
    }

    /// Terminal transition to `Cancelled` (engine acknowledged the token).
    pub fn cancelled(&self) -> bool {
        self.finish(JobStatus::Cancelled)
    }

    /// Flip an active status to `target`. A terminal status is never
    /// overwritten, which makes stale continuations harmless.
    fn finish(&self, target: JobStatus) -> bool {
        let mut current = self.status.load(Ordering::Acquire);
        loop {
            if !JobStatus::from_u8(current).is_active() {
                return false;
            }
            match self.status.compare_exchange_weak(
                current,
                target as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Immutable snapshot for status().
    pub fn snapshot(&self) -> JobSnapshot {
        let status = self.status();
        JobSnapshot {
            job_id: Some(self.id),
            status: status.as_str().to_string(),
            percent: self.percent.load(Ordering::Acquire),
            phase: match self.phase.read() {
                Ok(guard) if !guard.is_empty() => Some(guard.clone()),
                Ok(_) => None,
                Err(e) => {
                    tracing::error!("RwLock poisoned reading phase: {e}");
                    None
                }
            },
            started_at: Some(self.started_at.clone()),
            result: match self.result.read() {
                Ok(guard) => guard.clone(),
                Err(e) => {
                    tracing::error!("RwLock poisoned reading result: {e}");
                    None
                }
            },
            error: match self.error.read() {
                Ok(guard) => guard.clone(),
                Err(e) => {
                    tracing::error!("RwLock poisoned reading error: {e}");
                    None
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_job() -> JobState {
        JobState::new(1, SimPayload::default(), Arc::new(CancelToken::new()))
    }

    fn sample_result() -> SimResult {
        SimResult {
            mean_energy: 10.0,
            std_dev: 0.5,
            min_energy: 9.0,
            max_energy: 11.0,
            steps_run: 1000,
            elapsed_ms: 12,
        }
    }

    #[test]
    fn test_new_job_is_running() {
        let job = running_job();
        assert_eq!(job.status(), JobStatus::Running);
        let snap = job.snapshot();
        assert_eq!(snap.status, "running");
        assert_eq!(snap.percent, 0);
        assert!(snap.result.is_none());
        assert!(snap.started_at.is_some());
    }

    #[test]
    fn test_percent_is_monotonic() {
        let job = running_job();
        assert_eq!(job.record_progress("integrate", 40, "step 400"), Some(40));
        assert_eq!(job.record_progress("integrate", 30, "replay"), Some(40));
        assert_eq!(job.record_progress("integrate", 90, "step 900"), Some(90));
        assert_eq!(job.snapshot().percent, 90);
    }

    #[test]
    fn test_complete_stores_result_and_caps_percent() {
        let job = running_job();
        job.record_progress("integrate", 80, "almost");
        assert!(job.complete(sample_result()));
        assert_eq!(job.status(), JobStatus::Completed);

        let snap = job.snapshot();
        assert_eq!(snap.percent, 100);
        assert_eq!(snap.result.unwrap().steps_run, 1000);
    }

    #[test]
    fn test_cancelling_then_cancelled() {
        let job = running_job();
        assert!(job.set_cancelling());
        assert_eq!(job.status(), JobStatus::Cancelling);
        // Second cancel does not re-transition.
        assert!(!job.set_cancelling());

        assert!(job.cancelled());
        assert_eq!(job.status(), JobStatus::Cancelled);
    }

    #[test]
    fn test_completion_wins_from_cancelling() {
        let job = running_job();
        job.set_cancelling();
        assert!(job.complete(sample_result()));
        assert_eq!(job.status(), JobStatus::Completed);
    }

    #[test]
    fn test_terminal_status_is_never_overwritten() {
        let job = running_job();
        assert!(job.fail("boom"));
        assert_eq!(job.status(), JobStatus::Failed);

        assert!(!job.complete(sample_result()));
        assert!(!job.cancelled());
        assert!(!job.set_cancelling());
        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.snapshot().error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_progress_after_terminal_is_dropped() {
        let job = running_job();
        job.complete(sample_result());
        assert_eq!(job.record_progress("integrate", 50, "stale"), None);
        assert_eq!(job.snapshot().percent, 100);
    }
}
