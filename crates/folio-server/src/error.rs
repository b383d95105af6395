//! API error responses.
//!
//! Every failure leaves the server as
//! `{"error": {"code", "message", "details"?}}` with a status derived from
//! the code.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use folio_core::CoreError;
use folio_risk::RiskError;

/// Error returned by request handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or invalid input.
    #[error("{message}")]
    Validation {
        /// Description of the problem.
        message: String,
        /// Individual violations.
        details: Vec<String>,
    },

    /// Resource does not exist.
    #[error("{message}")]
    NotFound {
        /// Description of the missing resource.
        message: String,
    },

    /// Engine failure.
    #[error(transparent)]
    Risk(#[from] RiskError),

    /// Unexpected server failure.
    #[error("{message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

impl ApiError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Wire error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Risk(err) => err.code(),
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self.code() {
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "DEGENERATE_INPUT" => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> &[String] {
        match self {
            Self::Validation { details, .. } => details,
            Self::Risk(err) => err.details(),
            _ => &[],
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { .. } => Self::NotFound {
                message: err.to_string(),
            },
            CoreError::InvalidPortfolio { .. } | CoreError::InvalidTicker { .. } => {
                Self::validation(err.to_string())
            }
            CoreError::Source { .. } => Self::internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "request rejected");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.to_string(),
                details: self.details().to_vec(),
            },
        };
        (status, Json(body)).into_response()
    }
}
