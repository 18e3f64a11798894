use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::chart::ContainerImage;
use crate::error::AppError;
use crate::service::ChartService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ChartService>,
}

#[derive(Debug, Deserialize)]
pub struct LoadRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    pub success: bool,
    pub images: Vec<ContainerImage>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: &'static str,
}

pub fn router(service: Arc<ChartService>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/helm/load", post(load_helm))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "ok",
    })
}

/// POST /api/helm/load
///
/// The body is read as JSON whatever its `Content-Type`.
async fn load_helm(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ImagesResponse>, AppError> {
    let request = match serde_json::from_slice::<LoadRequest>(&body) {
        Ok(request) if !request.url.is_empty() => request,
        Ok(_) => return Err(invalid_request("missing url")),
        Err(err) => return Err(invalid_request(&err.to_string())),
    };

    info!(url = %request.url, "loading chart");
    let images = state.service.load_images(&request.url).await?;

    Ok(Json(ImagesResponse {
        success: true,
        images,
    }))
}

fn invalid_request(reason: &str) -> AppError {
    warn!(reason, "rejecting request");
    AppError::InvalidInput("Invalid request format".to_string())
}
