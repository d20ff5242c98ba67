//! PII prediction handler
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use crate::extract::ValidatedJson;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use pii_core::{Entity, DEFAULT_THRESHOLD};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use std::time::Instant;
use utoipa::ToSchema;

/// Prediction request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct PredictionRequest {
    /// Text to scan for PII
    #[schema(example = "My name is John, email john@x.com")]
    pub text: String,

    /// Entity labels to look for; defaults to person, email, phone number, location
    #[serde(default = "pii_core::default_labels")]
    pub labels: Vec<String>,

    /// Minimum confidence score for a returned entity; numeric strings are accepted
    #[serde(default = "default_threshold", deserialize_with = "deserialize_threshold")]
    #[schema(example = 0.3, default = 0.3)]
    pub threshold: f32,
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

fn deserialize_threshold<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Threshold {
        Number(f32),
        Text(String),
    }

    match Threshold::deserialize(deserializer)? {
        Threshold::Number(value) => Ok(value),
        Threshold::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("threshold must be a number, got {text:?}"))),
    }
}

/// Prediction response body
#[derive(Debug, Serialize, ToSchema)]
pub struct PredictionResponse {
    /// Detected entities, exactly as produced by the model
    #[schema(value_type = Vec<Object>)]
    pub entities: Vec<Entity>,
}

/// Detect PII entities in the request text
#[utoipa::path(
    post,
    path = "/predict",
    tag = "predict",
    request_body = PredictionRequest,
    responses(
        (status = 200, description = "Prediction successful", body = PredictionResponse),
        (status = 422, description = "Request body failed validation", body = crate::error::ApiError),
        (status = 500, description = "Model inference failed", body = crate::error::ApiError)
    )
)]
pub async fn predict_handler(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<PredictionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let start = Instant::now();
    let recognizer = state.recognizer();

    // Never log the text itself.
    let text_chars = req.text.chars().count();
    let label_count = req.labels.len();
    let threshold = req.threshold;

    let entities = tokio::task::spawn_blocking(move || {
        recognizer.predict(&req.text, &req.labels, req.threshold)
    })
    .await
    .map_err(|e| AppError::Internal(format!("inference task failed: {e}")))??;

    tracing::info!(
        text_chars,
        label_count,
        threshold,
        entities = entities.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "prediction served"
    );

    Ok(Json(PredictionResponse { entities }))
}
