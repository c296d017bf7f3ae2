//! Error handling for the bookshelf HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Body message for every internal failure. Causes are logged, never returned.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Problem document returned for request validation failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub detail: String,
    pub instance: String,
}

/// `{"message": ...}` body used by every non-validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {}", .0.detail)]
    Validation(ProblemDetails),

    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error
    pub fn validation(
        problem_type: impl Into<String>,
        title: impl Into<String>,
        detail: impl Into<String>,
        instance: impl Into<String>,
    ) -> Self {
        Self::Validation(ProblemDetails {
            problem_type: problem_type.into(),
            title: title.into(),
            detail: detail.into(),
            instance: instance.into(),
        })
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            AppError::Validation(problem) => {
                tracing::warn!(
                    status_code = %status.as_u16(),
                    detail = %problem.detail,
                    "request validation failed"
                );
                (status, Json(problem)).into_response()
            }
            AppError::BadRequest { message } => {
                tracing::warn!(status_code = %status.as_u16(), %message, "bad request");
                (status, Json(ErrorBody { message })).into_response()
            }
            AppError::Internal(e) => {
                let error_id = Uuid::now_v7();
                let cause = format!("{e:#}");
                tracing::error!(
                    error_id = %error_id,
                    status_code = %status.as_u16(),
                    error = %cause,
                    "request failed"
                );
                let body = ErrorBody {
                    message: INTERNAL_ERROR_MESSAGE.to_string(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
