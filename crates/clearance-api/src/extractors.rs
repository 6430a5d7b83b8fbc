//! # Custom Extractors & Validation
//!
//! The [`Validate`] trait for request DTOs and helpers that turn axum JSON
//! rejections into enveloped [`AppError::BadRequest`] responses.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Business rules a request checks beyond what serde enforces.
pub trait Validate {
    /// Returns a message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap a JSON body, mapping rejections to [`AppError::BadRequest`].
///
/// Handlers take `Result<Json<T>, JsonRejection>` so malformed bodies get
/// the envelope rather than axum's plain-text rejection.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// [`extract_json`] followed by [`Validate::validate`].
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}
