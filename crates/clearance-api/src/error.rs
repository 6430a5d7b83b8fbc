//! # API Error Types
//!
//! [`AppError`] implements `IntoResponse`, mapping engine errors to HTTP
//! status codes and the `{errCode, data, msg}` envelope. Internal error
//! details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clearance_valuation::ValuationError;
use thiserror::Error;

use crate::envelope::Envelope;

/// Application-level error.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request failed a business rule (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (422).
    ///
    /// Same status as `Validation`: the HTTP framing was fine, the content
    /// was not.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The engine rejected the input, or failed internally.
    #[error("{0}")]
    Valuation(#[from] ValuationError),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and machine-readable code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST"),
            Self::Valuation(ValuationError::Canonicalization(_)) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            Self::Valuation(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.code()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "internal server error");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = Envelope::error(status.as_u16(), code, message);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn validation_status_code() {
        let (status, code) = AppError::Validation("too many items".into()).status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "VALIDATION_ERROR");
    }

    #[test]
    fn bad_request_status_code() {
        let (status, code) = AppError::BadRequest("malformed JSON".into()).status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "BAD_REQUEST");
    }

    #[test]
    fn invalid_incoterm_status_code() {
        let err: AppError = ValuationError::InvalidIncoterm("XYZ".into()).into();
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "INVALID_INCOTERM");
    }

    #[test]
    fn invalid_input_status_code() {
        let err: AppError = ValuationError::invalid_input("invoice_value", "missing").into();
        assert_eq!(err.status_and_code().1, "INVALID_INPUT");
    }

    #[test]
    fn internal_status_code() {
        let (status, code) = AppError::Internal("boom".into()).status_and_code();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn internal_message_is_hidden() {
        let response = AppError::Internal("secret detail".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!body.contains("secret detail"));
        assert!(body.contains("\"errCode\":500"));
    }

    #[tokio::test]
    async fn validation_message_is_returned() {
        let response = AppError::Validation("items must not exceed 10000".into()).into_response();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["errCode"], 422);
        assert!(json["data"].is_null());
        assert!(json["msg"].as_str().unwrap().contains("10000"));
    }
}
