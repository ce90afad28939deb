// crates/server/src/jobs/controller.rs
//! Single-slot job lifecycle controller.
//!
//! Owns the one active job and its cancellation token. The slot is an
//! explicit `Option` behind a lock, so the single-active-job invariant is
//! structural: a second start can only be accepted once the occupant is
//! terminal. A terminal job stays in the slot for `status()` until the next
//! start supersedes it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use thiserror::Error;

use simdeck_core::{CancelToken, SimOutcome, SimPayload, SimulationEngine};

use super::broadcast::EventBroadcaster;
use super::sink::ControllerSink;
use super::state::JobState;
use super::types::{JobId, JobSnapshot, StartedEvent};

/// Rejections from [`JobController::start`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartError {
    #[error("a simulation job is already running")]
    AlreadyRunning,
}

pub struct JobController {
    next_id: AtomicU64,
    slot: RwLock<Option<Arc<JobState>>>,
    engine: Arc<dyn SimulationEngine>,
    events: Arc<EventBroadcaster>,
}

impl JobController {
    pub fn new(engine: Arc<dyn SimulationEngine>, events: Arc<EventBroadcaster>) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            slot: RwLock::new(None),
            engine,
            events,
        }
    }

    /// Start a new job.
    ///
    /// Rejects with [`StartError::AlreadyRunning`] while the slot holds an
    /// active job, without touching any state. On acceptance the
    /// [`StartedEvent`] is published before this returns, so it is
    /// observable before any progress event of the new job; the engine then
    /// runs as a spawned continuation and this call never awaits it.
    pub fn start(&self, payload: SimPayload) -> Result<JobId, StartError> {
        let job = {
            let mut slot = match self.slot.write() {
                Ok(guard) => guard,
                Err(e) => {
                    tracing::error!("job slot poisoned on start: {e}");
                    e.into_inner()
                }
            };
            if let Some(current) = slot.as_ref() {
                if current.status().is_active() {
                    return Err(StartError::AlreadyRunning);
                }
            }

            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            let token = Arc::new(CancelToken::new());
            let job = Arc::new(JobState::new(id, payload, token));
            *slot = Some(Arc::clone(&job));
            job
        };

        tracing::info!(job_id = job.id(), engine = self.engine.name(), "job accepted");
        self.events.publish_started(StartedEvent {
            job_id: job.id(),
            payload: job.payload().clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        });

        let engine = Arc::clone(&self.engine);
        let events = Arc::clone(&self.events);
        let id = job.id();
        tokio::spawn(async move {
            let sink = ControllerSink::new(Arc::clone(&job), events);
            let outcome = engine.run(job.payload(), job.token(), &sink).await;
            // Terminal transitions refuse to overwrite a terminal status,
            // so a misbehaving engine cannot resurrect a finished job.
            match outcome {
                Ok(SimOutcome::Completed(result)) => {
                    // Completion wins the race against a pending cancel.
                    job.complete(result);
                    tracing::info!(job_id = id, "job completed");
                }
                Ok(SimOutcome::Cancelled) => {
                    job.cancelled();
                    tracing::info!(job_id = id, "job cancelled");
                }
                Err(e) => {
                    tracing::warn!(job_id = id, error = %e, "job failed");
                    job.fail(e.to_string());
                }
            }
        });

        Ok(id)
    }

    /// Request cooperative cancellation of the active job.
    ///
    /// Returns `false` when no job is active. Otherwise flags the token,
    /// moves a `Running` job to `Cancelling`, and returns `true`; the job
    /// resolves to `Cancelled` (or `Completed`, if the engine finishes
    /// first) whenever the engine reacts. No deadline is enforced here.
    pub fn cancel(&self) -> bool {
        let slot = match self.slot.read() {
            Ok(guard) => guard,
            Err(e) => {
                tracing::error!("job slot poisoned on cancel: {e}");
                e.into_inner()
            }
        };
        let Some(job) = slot.as_ref() else {
            return false;
        };
        if !job.status().is_active() {
            return false;
        }

        job.token().request();
        if job.set_cancelling() {
            tracing::info!(job_id = job.id(), "cancellation requested");
        }
        true
    }

    /// Snapshot of the current (or last) job; the idle sentinel before the
    /// first start. Infallible and side-effect-free.
    pub fn status(&self) -> JobSnapshot {
        let slot = match self.slot.read() {
            Ok(guard) => guard,
            Err(e) => {
                tracing::error!("job slot poisoned on status: {e}");
                e.into_inner()
            }
        };
        match slot.as_ref() {
            Some(job) => job.snapshot(),
            None => JobSnapshot::idle(),
        }
    }
}
