// crates/server/src/routes/mod.rs
//! API route handlers for the simdeck server.

pub mod export;
pub mod health;
pub mod presets;
pub mod simulation;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined API router with all routes under /api prefix.
///
/// This is the entire capability surface reachable from the front-end;
/// nothing outside this fixed set is routable:
/// - GET  /api/health                     - Health check
/// - GET  /api/presets                    - List simulation presets
/// - POST /api/simulation                 - Start a simulation job
/// - POST /api/simulation/cancel          - Request cooperative cancellation
/// - GET  /api/simulation/status          - Current/last job snapshot
/// - GET  /api/simulation/events/started  - SSE stream of started events
/// - GET  /api/simulation/events/progress - SSE stream of progress events
/// - POST /api/export/json                - Write a JSON export file
/// - POST /api/export/csv                 - Write a CSV export file
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", health::router())
        .nest("/api", presets::router())
        .nest("/api", simulation::router())
        .nest("/api", export::router())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simdeck_core::Exporter;

    #[tokio::test]
    async fn test_api_routes_creation() {
        let dir = std::env::temp_dir().join("simdeck-routes-test");
        let state = AppState::with_default_engine(Exporter::new(dir));
        let _router = api_routes(state);
    }
}
