// crates/server/src/jobs/sink.rs
//! Engine-facing progress adapter.
//!
//! The only write path from a running engine into controller-owned state:
//! each report updates the job record and is broadcast as a
//! [`ProgressEvent`]. Reports arriving after the job went terminal are
//! dropped.

use std::sync::Arc;

use simdeck_core::ProgressSink;

use super::broadcast::EventBroadcaster;
use super::state::JobState;
use super::types::ProgressEvent;

pub struct ControllerSink {
    job: Arc<JobState>,
    events: Arc<EventBroadcaster>,
}

impl ControllerSink {
    pub fn new(job: Arc<JobState>, events: Arc<EventBroadcaster>) -> Self {
        Self { job, events }
    }
}

impl ProgressSink for ControllerSink {
    fn report(&self, phase: &str, percent: u8, message: &str) {
        // record_progress clamps to the monotonic maximum; the broadcast
        // carries the effective value so subscribers never see a decrease.
        let Some(effective) = self.job.record_progress(phase, percent, message) else {
            tracing::debug!(job_id = self.job.id(), "dropping progress report after terminal state");
            return;
        };
        self.events.publish_progress(ProgressEvent {
            job_id: self.job.id(),
            phase: phase.to_string(),
            percent: effective,
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
    }
}
