//! PII API - REST server
//!
//! Provides HTTP endpoints for detecting personally identifiable
//! information with a pretrained span-based NER model.
//!
//! Author: hephaex@gmail.com

pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    Router,
};
use pii_core::config::ServerConfig;
use state::AppState;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// OpenAPI document for the service
#[derive(OpenApi)]
#[openapi(
    info(title = "GLiNER-PII API"),
    paths(handlers::health::health_check, handlers::predict::predict_handler),
    components(schemas(
        handlers::health::HealthResponse,
        handlers::predict::PredictionRequest,
        handlers::predict::PredictionResponse,
        error::ApiError
    )),
    tags(
        (name = "health", description = "Liveness probe"),
        (name = "predict", description = "PII entity detection")
    )
)]
pub struct ApiDoc;

/// Build the application router around shared state
pub fn create_router(state: Arc<AppState>) -> Router {
    let server = &state.config.server;

    let mut router = routes::api_routes()
        .layer(DefaultBodyLimit::max(server.max_body_size))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors_layer(server) {
        router = router.layer(cors);
    }

    router.with_state(state)
}

fn cors_layer(server: &ServerConfig) -> Option<CorsLayer> {
    if !server.cors_enabled {
        return None;
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    )
}
