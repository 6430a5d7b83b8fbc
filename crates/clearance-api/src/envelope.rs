//! # Response Envelope
//!
//! The back office expects every response wrapped as
//! `{"errCode": 0, "data": …, "msg": "ok"}`. Errors carry the HTTP status
//! in `errCode`, `data: null`, and a machine-readable `code`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Envelope around every JSON response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// 0 on success, otherwise the HTTP status code.
    #[serde(rename = "errCode")]
    pub err_code: u16,
    /// Payload; `null` on error.
    pub data: Option<T>,
    /// "ok" on success, otherwise a human-readable message.
    pub msg: String,
    /// Machine-readable error code, present only on error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> Envelope<T> {
    /// Wrap a successful payload.
    pub fn ok(data: T) -> Self {
        Self {
            err_code: 0,
            data: Some(data),
            msg: "ok".to_string(),
            code: None,
        }
    }
}

impl Envelope<()> {
    /// An error envelope.
    pub fn error(status: u16, code: &str, msg: impl Into<String>) -> Self {
        Self {
            err_code: status,
            data: None,
            msg: msg.into(),
            code: Some(code.to_string()),
        }
    }
}

/// OpenAPI description of [`Envelope`]. `data` depends on the route.
#[derive(Debug, Serialize, ToSchema)]
pub struct EnvelopeDoc {
    #[serde(rename = "errCode")]
    pub err_code: u16,
    #[schema(value_type = Object)]
    pub data: Option<serde_json::Value>,
    pub msg: String,
    pub code: Option<String>,
}
