//! REST API handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use devreg_core::{DeviceDraft, DeviceId, RegistryError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error as _;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::state::AppState;

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    error: String,
    code: &'static str,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            status,
            error: msg.into(),
            code,
        }
    }

    fn malformed() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "MALFORMED_REQUEST",
            "Malformed JSON request",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match &err {
            RegistryError::NotFound(_) => {
                warn!(error = %err, "Device not found");
                Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
            }
            RegistryError::Validation(_) => {
                warn!(error = %err, "Validation error");
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", err.to_string())
            }
            RegistryError::IllegalArgument(_) => {
                warn!(error = %err, "Illegal argument");
                Self::new(StatusCode::BAD_REQUEST, "ILLEGAL_ARGUMENT", err.to_string())
            }
            RegistryError::Service { operation, .. } => {
                let cause = err.source().map(ToString::to_string).unwrap_or_default();
                error!(
                    operation = %operation,
                    cause = %cause,
                    "Internal error - device service failure"
                );
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", *operation)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "Malformed JSON request");
        Self::malformed()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        warn!(error = %rejection.body_text(), "Type mismatch in path");
        Self::new(
            StatusCode::BAD_REQUEST,
            "TYPE_MISMATCH",
            format!(
                "The parameter 'id' could not be converted to type 'u64': {}",
                rejection.body_text()
            ),
        )
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn device_id(path: Result<Path<u64>, PathRejection>) -> ApiResult<DeviceId> {
    let Path(id) = path?;
    Ok(DeviceId(id))
}

/// Create a device
pub async fn create_device(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DeviceDraft>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(draft) = body?;
    let device = state.registry.create(draft).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

/// Get a specific device by ID
pub async fn get_device(
    State(state): State<Arc<AppState>>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let id = device_id(path)?;
    Ok(Json(state.registry.get_by_id(id).await?))
}

/// List all devices
pub async fn list_devices(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.registry.get_all().await?))
}

/// Replace a device
pub async fn update_device(
    State(state): State<Arc<AppState>>,
    path: Result<Path<u64>, PathRejection>,
    body: Result<Json<DeviceDraft>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let id = device_id(path)?;
    let Json(draft) = body?;
    Ok(Json(state.registry.update(id, draft).await?))
}

/// Partially update a device
pub async fn patch_device(
    State(state): State<Arc<AppState>>,
    path: Result<Path<u64>, PathRejection>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let id = device_id(path)?;
    let Json(fields) = body?;
    Ok(Json(state.registry.update_partial(id, fields).await?))
}

/// Remove a device
pub async fn delete_device(
    State(state): State<Arc<AppState>>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let id = device_id(path)?;
    info!(device = %id, "Remove device requested");
    state.registry.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Search devices by exact brand
///
/// An empty result is reported as 404 with no body.
pub async fn search_by_brand(
    State(state): State<Arc<AppState>>,
    Path(brand): Path<String>,
) -> ApiResult<Response> {
    let devices = state.registry.search_by_brand(&brand).await?;
    if devices.is_empty() {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }
    Ok(Json(devices).into_response())
}

/// Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
