// crates/server/src/routes/export.rs
//! Export endpoints (JSON and CSV).
//!
//! - POST /export/json — Write caller-supplied data as a JSON file
//! - POST /export/csv  — Write tabular rows as a CSV file
//!
//! Fire-and-forget writes through the exporter; failures surface as
//! rejected calls and never touch job state.

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ApiResult;
use crate::state::AppState;

/// Request body for POST /api/export/json.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportJsonRequest {
    /// Suggested file name; sanitized to a flat stem server-side.
    pub name: String,
    /// Arbitrary JSON-serializable data.
    pub data: serde_json::Value,
}

/// Request body for POST /api/export/csv.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportCsvRequest {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Write confirmation for a successful export.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    /// Absolute path of the written file.
    pub path: String,
}

/// POST /api/export/json — Write `data` as a pretty-printed JSON file.
async fn export_json(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ExportJsonRequest>,
) -> ApiResult<Json<ExportResponse>> {
    let path = state.exporter.write_json(&body.name, &body.data)?;
    Ok(Json(ExportResponse {
        path: path.display().to_string(),
    }))
}

/// POST /api/export/csv — Write rows as an RFC 4180 CSV file.
async fn export_csv(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ExportCsvRequest>,
) -> ApiResult<Json<ExportResponse>> {
    let path = state
        .exporter
        .write_csv(&body.name, &body.header, &body.rows)?;
    Ok(Json(ExportResponse {
        path: path.display().to_string(),
    }))
}

/// Build the export router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/export/json", post(export_json))
        .route("/export/csv", post(export_csv))
}
