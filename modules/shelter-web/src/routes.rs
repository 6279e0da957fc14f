use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use shelter_common::{AnimalRecord, RecordQuery, ShelterError};
use shelter_store::StoreError;

use crate::pipeline::{export, Dashboard, DashboardParams};
use crate::state::AppState;
use crate::templates::render_dashboard;

// --- Errors ---

/// Write-API failure mapped onto an HTTP status.
pub struct ApiError(ShelterError);

impl From<ShelterError> for ApiError {
    fn from(e: ShelterError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ShelterError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ShelterError::Config(_) | ShelterError::Anyhow(_) => {
                warn!(error = %self.0, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Invalid input is reported to the caller. Any other store failure keeps the
/// gateway's sentinel contract and is only logged.
fn sentinel_or_reject<T>(result: Result<T, StoreError>, sentinel: T, op: &str) -> Result<T, ApiError> {
    match result {
        Ok(value) => Ok(value),
        Err(StoreError::InvalidInput(msg)) => Err(ShelterError::Validation(msg.to_string()).into()),
        Err(e) => {
            warn!(error = %e, op, "Store operation failed");
            Ok(sentinel)
        }
    }
}

// --- Dashboard ---

pub async fn dashboard_page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> impl IntoResponse {
    let dashboard = Dashboard::load(&state.shelter, &params).await;
    Html(render_dashboard(&dashboard, state.logo.as_ref()))
}

pub async fn api_dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> impl IntoResponse {
    let dashboard = Dashboard::load(&state.shelter, &params).await;
    Json(serde_json::to_value(dashboard.summary()).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to serialize dashboard");
        json!({})
    }))
}

pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> Result<Response, ApiError> {
    let dashboard = Dashboard::load(&state.shelter, &params).await;

    let body = export::to_csv(&dashboard.table.columns, &dashboard.table.rows)
        .context("Failed to export rows")
        .map_err(ShelterError::from)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export::EXPORT_FILENAME),
            ),
        ],
        body,
    )
        .into_response())
}

// --- Records ---

#[derive(Deserialize)]
pub struct UpdateRequest {
    pub query: RecordQuery,
    pub changes: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
pub struct DeleteRequest {
    pub query: RecordQuery,
}

pub async fn create_animal(
    State(state): State<Arc<AppState>>,
    Json(record): Json<AnimalRecord>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.shelter.try_create_record(&record).await;
    let acknowledged = sentinel_or_reject(result, false, "create")?;
    let status = if acknowledged {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(json!({ "acknowledged": acknowledged }))))
}

pub async fn update_animals(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let changes = bson::to_document(&req.changes)
        .map_err(|e| ShelterError::Validation(format!("changes: {e}")))?;
    let result = state.shelter.try_update(&req.query, changes).await;
    let modified = sentinel_or_reject(result, 0, "update")?;
    Ok(Json(json!({ "modified": modified })))
}

pub async fn delete_animals(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.shelter.try_delete(&req.query).await;
    let deleted = sentinel_or_reject(result, 0, "delete")?;
    Ok(Json(json!({ "deleted": deleted })))
}
