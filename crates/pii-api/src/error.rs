//! API error handling
//!
//! Author: hephaex@gmail.com

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pii_core::PiiError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    #[schema(example = "VALIDATION_ERROR")]
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn validation() -> Self {
        Self::new("VALIDATION_ERROR", "Request body does not match the expected schema")
    }

    pub fn inference_failure() -> Self {
        Self::new("INFERENCE_FAILURE", "Model inference failed")
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Body rejected before reaching the model; carries the rejection status
    Validation { status: StatusCode, message: String },
    Inference(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Validation { status, message } => {
                (status, ApiError::validation().with_details(message))
            }
            AppError::Inference(msg) => {
                tracing::error!(error = %msg, "inference failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::inference_failure().with_details(msg),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::internal_error().with_details(msg),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

impl AppError {
    /// Schema failure reported as 422
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        // Oversized bodies keep 413; every other body problem is a 422.
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => AppError::Validation {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                message: rejection.body_text(),
            },
            _ => AppError::validation(rejection.body_text()),
        }
    }
}

impl From<PiiError> for AppError {
    fn from(err: PiiError) -> Self {
        match err {
            PiiError::Inference(msg) => AppError::Inference(msg),
            PiiError::ModelLoad(msg) => AppError::Internal(format!("Model load error: {msg}")),
            PiiError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}
