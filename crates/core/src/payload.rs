// crates/core/src/payload.rs
//! Caller-supplied simulation parameters and the engine's result type.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::PayloadError;

/// Hard cap on the particle count a single job may request.
pub const MAX_PARTICLES: u32 = 65_536;

/// Hard cap on the step count a single job may request.
pub const MAX_STEPS: u64 = 10_000_000;

/// Upper bound for the coupling constant.
pub const MAX_COUPLING: f64 = 1.0;

/// Input parameters for one phase-1 simulation run.
///
/// Immutable for the lifetime of the job it starts. The controller treats
/// this as opaque; only [`validate`](SimPayload::validate) at the bridge and
/// the engine interpret the values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct SimPayload {
    /// Number of coupled oscillators in the lattice.
    pub particles: u32,
    /// Integration steps to run.
    #[ts(type = "number")]
    pub steps: u64,
    /// Nearest-neighbour coupling constant.
    pub coupling: f64,
    /// RNG seed; omitted means a fixed default so runs stay reproducible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | null")]
    pub seed: Option<u64>,
    /// Preset id this payload was derived from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
}

impl Default for SimPayload {
    fn default() -> Self {
        Self {
            particles: 256,
            steps: 10_000,
            coupling: 0.05,
            seed: None,
            preset: None,
        }
    }
}

impl SimPayload {
    /// Shape validation, run at the bridge before any job is created.
    pub fn validate(&self) -> Result<(), PayloadError> {
        if self.particles == 0 || self.particles > MAX_PARTICLES {
            return Err(PayloadError::ParticlesOutOfRange {
                got: self.particles,
                max: MAX_PARTICLES,
            });
        }
        if self.steps == 0 || self.steps > MAX_STEPS {
            return Err(PayloadError::StepsOutOfRange {
                got: self.steps,
                max: MAX_STEPS,
            });
        }
        if !self.coupling.is_finite() || self.coupling <= 0.0 || self.coupling > MAX_COUPLING {
            return Err(PayloadError::CouplingOutOfRange {
                got: self.coupling,
                max: MAX_COUPLING,
            });
        }
        Ok(())
    }

    /// Effective RNG seed for this payload.
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(0x5EED_CAFE)
    }
}

/// Summary statistics produced by a completed phase-1 run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct SimResult {
    /// Mean lattice energy over the sampled window.
    pub mean_energy: f64,
    /// Standard deviation of the sampled energies.
    pub std_dev: f64,
    pub min_energy: f64,
    pub max_energy: f64,
    /// Steps actually integrated (equals the request for a completed run).
    #[ts(type = "number")]
    pub steps_run: u64,
    /// Wall-clock duration of the run in milliseconds.
    #[ts(type = "number")]
    pub elapsed_ms: u64,
}
