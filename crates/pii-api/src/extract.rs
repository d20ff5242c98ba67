//! Request extractors
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;

/// JSON body extractor whose rejections render as [`AppError::Validation`].
///
/// A body sent without any `Content-Type` is still parsed as JSON; a
/// non-JSON content type is rejected.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if req.headers().contains_key(CONTENT_TYPE) {
            let Json(value) = Json::<T>::from_request(req, state).await?;
            return Ok(Self(value));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => AppError::Validation {
                    status: StatusCode::PAYLOAD_TOO_LARGE,
                    message: rejection.body_text(),
                },
                _ => AppError::validation(rejection.body_text()),
            })?;

        serde_json::from_slice(&body)
            .map(Self)
            .map_err(|e| AppError::validation(format!("Failed to deserialize the JSON body: {e}")))
    }
}
