// crates/core/src/presets.rs
//! Built-in preset catalog for the simulation front-end.
//!
//! Read-only: presets are baked into the binary and listed in a stable
//! order. No job interaction.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::payload::SimPayload;

/// One selectable preset: a label plus the payload it expands to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct PresetDescriptor {
    pub id: String,
    pub label: String,
    pub description: String,
    pub payload: SimPayload,
}

/// Ordered collection of the presets the bridge exposes.
pub struct PresetCatalog {
    presets: Vec<PresetDescriptor>,
}

impl PresetCatalog {
    /// The built-in catalog, in display order.
    pub fn builtin() -> Self {
        let mk = |id: &str, label: &str, description: &str, particles: u32, steps: u64, coupling: f64| {
            PresetDescriptor {
                id: id.to_string(),
                label: label.to_string(),
                description: description.to_string(),
                payload: SimPayload {
                    particles,
                    steps,
                    coupling,
                    seed: None,
                    preset: Some(id.to_string()),
                },
            }
        };

        Self {
            presets: vec![
                mk(
                    "smoke",
                    "Smoke test",
                    "Tiny lattice for a near-instant sanity run.",
                    32,
                    2_000,
                    0.05,
                ),
                mk(
                    "standard",
                    "Standard relaxation",
                    "Default lattice size and duration for interactive use.",
                    256,
                    50_000,
                    0.05,
                ),
                mk(
                    "deep",
                    "Deep relaxation",
                    "Long run for converged statistics; expect minutes.",
                    1_024,
                    2_000_000,
                    0.02,
                ),
                mk(
                    "stiff",
                    "Stiff coupling",
                    "Strongly coupled lattice; stresses the integrator.",
                    512,
                    200_000,
                    0.8,
                ),
            ],
        }
    }

    /// All presets in display order.
    pub fn list(&self) -> &[PresetDescriptor] {
        &self.presets
    }

    /// Look up a preset by id.
    pub fn get(&self, id: &str) -> Option<&PresetDescriptor> {
        self.presets.iter().find(|p| p.id == id)
    }
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
