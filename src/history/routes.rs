//! HTTP surface of the History Service.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use super::{CreateScanRecord, HistoryStorage, ScanRecord};
use crate::modes;
use crate::scan::{Detector, ItemStatus, ScanReport};

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn HistoryStorage>,
    pub detector: Arc<dyn Detector>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{message}: {source}")]
    OperationFailed {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    fn failed(message: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| Self::OperationFailed { message, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidRequest(msg) => {
                tracing::debug!(reason = %msg, "rejected request");
                (StatusCode::BAD_REQUEST, "Invalid scan request")
            }
            ApiError::OperationFailed { message, source } => {
                tracing::error!(error = %source, "{message}");
                (StatusCode::INTERNAL_SERVER_ERROR, *message)
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/modes", get(list_modes))
        .route("/scan", post(scan))
        .route("/api/scan", post(scan))
        .route(
            "/scan-history",
            get(list_history).post(create_history).delete(clear_history),
        )
        .route(
            "/api/history",
            get(list_history).post(create_history).delete(clear_history),
        )
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Pocket Guardian history service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn list_modes() -> Json<serde_json::Value> {
    let modes: serde_json::Map<String, serde_json::Value> = modes::list_modes()
        .into_iter()
        .map(|mode| (mode.to_string(), json!(modes::default_items(mode))))
        .collect();
    Json(json!({ "modes": modes }))
}

#[derive(Debug, Deserialize)]
struct ScanRequest {
    mode: String,
}

/// Server-side simulated scan over a catalog mode's default items.
async fn scan(
    State(state): State<AppState>,
    body: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanReport>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    if !modes::is_known(&request.mode) {
        return Err(ApiError::InvalidRequest(format!("unknown mode: {}", request.mode)));
    }

    let items = modes::default_items(&request.mode)
        .into_iter()
        .map(|name| ItemStatus {
            detected: state.detector.detect(&name),
            name,
        })
        .collect();
    let report = ScanReport::new(request.mode, items);

    state
        .storage
        .create(CreateScanRecord::from(&report))
        .await
        .map_err(ApiError::failed("Failed to record scan"))?;

    tracing::info!(mode = %report.mode, missing = report.missing_items.len(), "server scan");
    Ok(Json(report))
}

async fn create_history(
    State(state): State<AppState>,
    body: Result<Json<CreateScanRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<ScanRecord>), ApiError> {
    let Json(input) = body.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    input.validate().map_err(ApiError::InvalidRequest)?;

    let record = state
        .storage
        .create(input)
        .await
        .map_err(ApiError::failed("Failed to create history"))?;
    tracing::info!(id = %record.id, mode = %record.mode, "history record created");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_history(State(state): State<AppState>) -> Result<Json<Vec<ScanRecord>>, ApiError> {
    let records = state
        .storage
        .list()
        .await
        .map_err(ApiError::failed("Failed to fetch history"))?;
    Ok(Json(records))
}

async fn clear_history(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .storage
        .clear()
        .await
        .map_err(ApiError::failed("Failed to clear history"))?;
    tracing::info!("history cleared");
    Ok(Json(json!({ "message": "History cleared successfully" })))
}
