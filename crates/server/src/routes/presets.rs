// crates/server/src/routes/presets.rs
//! Preset catalog endpoint.
//!
//! - GET /presets — List simulation presets in display order

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use simdeck_core::PresetDescriptor;

use crate::state::AppState;

/// GET /api/presets — List the built-in presets.
///
/// Read-only; no job interaction.
async fn list_presets(State(state): State<Arc<AppState>>) -> Json<Vec<PresetDescriptor>> {
    Json(state.presets.list().to_vec())
}

/// Build the presets router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/presets", get(list_presets))
}
