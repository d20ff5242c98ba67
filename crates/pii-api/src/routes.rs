//! API route definitions
//!
//! Author: hephaex@gmail.com

use crate::handlers::{health, predict};
use crate::state::AppState;
use crate::ApiDoc;
use axum::{
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

/// Create API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/predict", post(predict::predict_handler))
        .route("/openapi.json", get(openapi_spec))
}

/// Serve the generated OpenAPI document
async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
