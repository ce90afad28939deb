// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Instant;

use simdeck_core::{Exporter, PhaseOneEngine, PresetCatalog, SimulationEngine};

use crate::jobs::{EventBroadcaster, JobController};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Single-slot lifecycle controller for the simulation job.
    pub controller: JobController,
    /// Started/progress event fan-out, shared with the controller.
    pub events: Arc<EventBroadcaster>,
    /// Built-in preset catalog (read-only).
    pub presets: PresetCatalog,
    /// File exporter for JSON/CSV downloads.
    pub exporter: Exporter,
}

impl AppState {
    /// Create application state around the given engine and exporter,
    /// wrapped in an Arc for sharing.
    pub fn new(engine: Arc<dyn SimulationEngine>, exporter: Exporter) -> Arc<Self> {
        let events = Arc::new(EventBroadcaster::new());
        Arc::new(Self {
            start_time: Instant::now(),
            controller: JobController::new(engine, Arc::clone(&events)),
            events,
            presets: PresetCatalog::builtin(),
            exporter,
        })
    }

    /// Convenience constructor with the phase-1 engine.
    pub fn with_default_engine(exporter: Exporter) -> Arc<Self> {
        Self::new(Arc::new(PhaseOneEngine::new()), exporter)
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
