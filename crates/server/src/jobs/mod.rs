// crates/server/src/jobs/mod.rs
//! Job system for the single long-running simulation.
//!
//! Provides:
//! - `JobController` — single-slot lifecycle state machine
//! - `JobState` — lock-free per-job record
//! - `EventBroadcaster` / `Subscription` — ordered started/progress fan-out
//! - `ControllerSink` — engine-facing progress adapter

pub mod broadcast;
pub mod controller;
pub mod sink;
pub mod state;
pub mod types;

pub use broadcast::{EventBroadcaster, Subscription};
pub use controller::{JobController, StartError};
pub use sink::ControllerSink;
pub use state::JobState;
pub use types::{JobId, JobSnapshot, JobStatus, ProgressEvent, StartedEvent};
