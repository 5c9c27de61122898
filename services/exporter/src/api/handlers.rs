use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use ocm_quota_collector::{encode_text, TEXT_CONTENT_TYPE};
use tracing::{debug, error};

use super::types::{ErrorResponse, HealthResponse};
use super::ApiState;

pub const SERVICE_NAME: &str = "ocm-quota-exporter";

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

/// Scrape endpoint. Upstream failures only shrink the output; the response
/// is still a well-formed exposition.
pub async fn metrics(State(state): State<Arc<ApiState>>) -> ApiResult<impl IntoResponse> {
    let families = state.registry.gather().await;
    let body = encode_text(&families).map_err(internal_error)?;

    debug!(families = families.len(), bytes = body.len(), "served scrape");
    Ok(([(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], body))
}

pub async fn health_check() -> ApiResult<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    }))
}

fn internal_error<E: std::fmt::Display>(err: E) -> (StatusCode, Json<ErrorResponse>) {
    error!(error = %err, "metrics API internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal server error".to_string(),
            code: "internal_error".to_string(),
            details: Some(serde_json::json!({ "message": err.to_string() })),
        }),
    )
}
