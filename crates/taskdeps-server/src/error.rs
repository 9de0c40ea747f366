//! HTTP error mapping.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use taskdeps::error::Error;
use thiserror::Error;

use crate::models::ViolationView;

/// Error returned by route handlers.
///
/// Rendered as `{ "success": false, "error": ..., "errorCode": ... }` with the
/// matching status code.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body, path or query, or a rejected value (400)
    #[error("{0}")]
    InvalidRequest(String),

    /// A task cannot depend on itself (400)
    #[error("{0}")]
    SelfReference(String),

    /// Unknown task or dependency (404)
    #[error("{0}")]
    NotFound(String),

    /// An active edge with the same triple exists (409)
    #[error("{0}")]
    DuplicateEdge(String),

    /// The edge would close a cycle (409)
    #[error("{0}")]
    CircularDependency(String),

    /// A status change is blocked by dependencies (422)
    #[error("{message}")]
    ConstraintViolation {
        /// Summary line
        message: String,
        /// Every unmet condition
        violations: Vec<ViolationView>,
    },

    /// Storage or I/O failure (500)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            Self::SelfReference(_) => (StatusCode::BAD_REQUEST, "SELF_REFERENCE"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::DuplicateEdge(_) => (StatusCode::CONFLICT, "DUPLICATE_DEPENDENCY"),
            Self::CircularDependency(_) => (StatusCode::CONFLICT, "CIRCULAR_DEPENDENCY"),
            Self::ConstraintViolation { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "CONSTRAINT_VIOLATION")
            }
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        match err {
            Error::Validation(_) => Self::InvalidRequest(message),
            Error::SelfReference(_) => Self::SelfReference(message),
            Error::TaskNotFound(_) | Error::DependencyNotFound(_) => Self::NotFound(message),
            Error::DuplicateEdge { .. } => Self::DuplicateEdge(message),
            Error::CircularDependency { .. } => Self::CircularDependency(message),
            Error::ConstraintViolation { violations, .. } => Self::ConstraintViolation {
                message,
                violations: violations.into_iter().map(ViolationView::from).collect(),
            },
            Error::Io(_) | Error::Json(_) | Error::Config(_) | Error::Storage(_) => {
                Self::Internal(message)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = match self {
            Self::ConstraintViolation {
                message,
                violations,
            } => json!({
                "success": false,
                "error": message,
                "errorCode": error_code,
                "violations": violations,
            }),
            other => json!({
                "success": false,
                "error": other.to_string(),
                "errorCode": error_code,
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Failure to start or run the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be parsed
    #[error("Invalid listen address '{0}'")]
    InvalidAddress(String),

    /// Binding or serving failed
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
