//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::mail::MailError;

/// Error text returned when the email field is empty.
pub const EMAIL_REQUIRED: &str = "이메일 필수";
/// Error text returned when the mail could not be sent.
pub const SEND_FAILED: &str = "발송 실패";

/// Errors returned by relay routes as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request is missing something required (400).
    #[error("{0}")]
    Validation(&'static str),
    /// The mail transport failed (500). Details are logged, not returned.
    #[error("발송 실패")]
    Delivery(#[source] MailError),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
