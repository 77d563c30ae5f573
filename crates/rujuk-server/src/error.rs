//! Application error types and Axum response conversion.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rujuk_core::TriageError;

use crate::dto::ErrorResponse;

/// Application-level errors with HTTP status code mapping.
#[derive(Debug)]
pub enum AppError {
    /// The request body does not describe a patient record.
    Validation { status: StatusCode, detail: String },
    /// The LLM client failed to initialize at startup.
    NotInitialized,
    /// The LLM round trip failed.
    Upstream(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { status, .. } => *status,
            AppError::NotInitialized | AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the `detail` field of the response body.
    pub fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. } => detail.clone(),
            AppError::NotInitialized => TriageError::NotInitialized.to_string(),
            AppError::Upstream(msg) => format!("An internal error occurred: {}", msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<TriageError> for AppError {
    fn from(err: TriageError) -> Self {
        match err {
            TriageError::NotInitialized => AppError::NotInitialized,
            TriageError::InvalidInput(detail) => AppError::Validation {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                detail,
            },
            e @ TriageError::Llm(_) => AppError::Upstream(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse { detail: self.detail() };
        (self.status(), Json(body)).into_response()
    }
}
