//! Error responses for the REST surface.
//!
//! Every failure leaves the service as `{"error": message}` with a status code.

use api_shared::ErrorRes;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use triage_core::TriageError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No text provided")]
    NoText,
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Pipeline(#[from] TriageError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoText | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(TriageError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = ErrorRes {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
