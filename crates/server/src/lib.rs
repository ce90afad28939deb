// crates/server/src/lib.rs
//! Simdeck server library.
//!
//! This crate provides the Axum-based HTTP bridge between the restricted
//! front-end and the privileged simulation host: a fixed set of routes for
//! starting, cancelling, and observing the single simulation job, plus
//! preset listing and file export.

pub mod error;
pub mod jobs;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::api_routes;
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and middleware.
///
/// This sets up:
/// - The capability allow-list routes (health, presets, simulation, export)
/// - CORS for the local UI during development (allows any origin)
/// - Request tracing
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api_routes(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Integration Tests
// ============================================================================
