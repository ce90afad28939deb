// crates/server/src/routes/simulation.rs
//! Simulation job routes — the bridge surface for the lifecycle controller.
//!
//! - POST /simulation                 — Start a job
//! - POST /simulation/cancel          — Request cooperative cancellation
//! - GET  /simulation/status          — Snapshot of the current/last job
//! - GET  /simulation/events/started  — SSE channel of started events
//! - GET  /simulation/events/progress — SSE channel of progress events

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use ts_rs::TS;

use simdeck_core::SimPayload;

use crate::error::{ApiError, ApiResult};
use crate::jobs::{JobId, JobSnapshot};
use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

/// Response for POST /api/simulation (202 Accepted).
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    #[ts(type = "number")]
    pub job_id: JobId,
    pub status: String,
}

/// Response for POST /api/simulation/cancel.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    /// `true` when an active job existed and cancellation was requested.
    pub cancelled: bool,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/simulation — Start a simulation job.
///
/// The payload is shape-validated here, before the controller is invoked;
/// a rejection creates no job and changes no state.
async fn start_simulation(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SimPayload>,
) -> ApiResult<impl IntoResponse> {
    payload.validate()?;
    if let Some(preset_id) = payload.preset.as_deref() {
        if state.presets.get(preset_id).is_none() {
            return Err(ApiError::BadRequest(format!(
                "unknown preset '{preset_id}'"
            )));
        }
    }

    let job_id = state.controller.start(payload)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(StartResponse {
            job_id,
            status: "running".to_string(),
        }),
    ))
}

/// POST /api/simulation/cancel — Request cancellation of the active job.
///
/// Always succeeds: `cancelled` is `false` when no job was active.
/// Cancellation is cooperative; poll the status endpoint for resolution.
async fn cancel_simulation(State(state): State<Arc<AppState>>) -> Json<CancelResponse> {
    Json(CancelResponse {
        cancelled: state.controller.cancel(),
    })
}

/// GET /api/simulation/status — Snapshot of the current (or last) job.
///
/// Never fails; returns the idle sentinel before the first start.
async fn simulation_status(State(state): State<Arc<AppState>>) -> Json<JobSnapshot> {
    Json(state.controller.status())
}

/// GET /api/simulation/events/started — SSE channel of started events.
///
/// No replay: connecting after a job started delivers nothing for it.
async fn stream_started(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let (subscription, mut rx) = state.events.subscribe_started();

    let stream = async_stream::stream! {
        // Held until the client disconnects; dropping it unsubscribes.
        let _subscription = subscription;
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(j) => j,
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize started event");
                    continue;
                }
            };
            yield Ok(Event::default().event("started").data(json));
        }
    };

    Sse::new(stream)
}

/// GET /api/simulation/events/progress — SSE channel of progress events.
async fn stream_progress(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let (subscription, mut rx) = state.events.subscribe_progress();

    let stream = async_stream::stream! {
        let _subscription = subscription;
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(j) => j,
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize progress event");
                    continue;
                }
            };
            yield Ok(Event::default().event("progress").data(json));
        }
    };

    Sse::new(stream)
}

// ============================================================================
// Router
// ============================================================================

/// Build the simulation router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/simulation", post(start_simulation))
        .route("/simulation/cancel", post(cancel_simulation))
        .route("/simulation/status", get(simulation_status))
        .route("/simulation/events/started", get(stream_started))
        .route("/simulation/events/progress", get(stream_progress))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use simdeck_core::Exporter;
    use tower::ServiceExt;

    fn test_app() -> (Arc<AppState>, Router) {
        let dir = std::env::temp_dir().join("simdeck-sim-route-test");
        let state = AppState::with_default_engine(Exporter::new(dir));
        let app = Router::new()
            .nest("/api", router())
            .with_state(Arc::clone(&state));
        (state, app)
    }

    async fn do_post(app: Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn do_get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// A payload big enough to still be running when the next request lands.
    fn long_payload() -> String {
        r#"{"particles": 512, "steps": 9000000, "coupling": 0.05}"#.to_string()
    }

    #[tokio::test]
    async fn test_status_idle_before_first_start() {
        let (_state, app) = test_app();
        let (status, json) = do_get(app, "/api/simulation/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "idle");
    }

    #[tokio::test]
    async fn test_start_accepts_and_reports_running() {
        let (state, app) = test_app();
        let (status, json) = do_post(app, "/api/simulation", &long_payload()).await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(json["status"], "running");
        assert!(json["jobId"].is_number());

        assert_eq!(state.controller.status().status, "running");
        state.controller.cancel();
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_payload() {
        let (state, app) = test_app();
        let (status, json) = do_post(
            app,
            "/api/simulation",
            r#"{"particles": 0, "steps": 100, "coupling": 0.05}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid payload");
        // No job was created.
        assert_eq!(state.controller.status().status, "idle");
    }

    #[tokio::test]
    async fn test_start_rejects_unknown_preset() {
        let (state, app) = test_app();
        let (status, json) = do_post(
            app,
            "/api/simulation",
            r#"{"particles": 16, "steps": 100, "coupling": 0.05, "preset": "warp-drive"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["details"].as_str().unwrap().contains("warp-drive"));
        assert_eq!(state.controller.status().status, "idle");
    }

    #[tokio::test]
    async fn test_second_start_conflicts() {
        let (state, app) = test_app();
        let (status, _) = do_post(app.clone(), "/api/simulation", &long_payload()).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let (status, json) = do_post(app, "/api/simulation", &long_payload()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "A simulation job is already running");

        state.controller.cancel();
    }

    #[tokio::test]
    async fn test_cancel_without_job_is_false() {
        let (_state, app) = test_app();
        let (status, json) = do_post(app, "/api/simulation/cancel", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["cancelled"], false);
    }

    #[tokio::test]
    async fn test_cancel_running_job_is_true() {
        let (_state, app) = test_app();
        do_post(app.clone(), "/api/simulation", &long_payload()).await;

        let (status, json) = do_post(app.clone(), "/api/simulation/cancel", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["cancelled"], true);

        let (_, snap) = do_get(app, "/api/simulation/status").await;
        assert!(snap["status"] == "cancelling" || snap["status"] == "cancelled");
    }
}
