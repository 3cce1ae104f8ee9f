//! Custom error types for the HTTP surface

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{
    credentials::CredentialError,
    error::RepoError,
    principal::AuthzError,
    validation::FieldError,
};

/// Custom error type for both services
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request payload failed shape validation
    #[error("Invalid request data")]
    Validation(Vec<FieldError>),

    /// Request body could not be parsed as JSON
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Wrong email or password at login
    #[error("{0}")]
    InvalidCredentials(String),

    /// Referenced entity is absent
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness or foreign key violation
    #[error("{0}")]
    Conflict(String),

    /// Missing bearer token
    #[error("Authentication required")]
    Unauthenticated,

    /// Bearer token failed verification or names an unknown user
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Role or permission insufficient, or account disabled
    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal(err: impl std::fmt::Display) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => ApiError::NotFound(msg),
            RepoError::Conflict(msg) => ApiError::Conflict(msg),
            RepoError::Invalid(msg) => ApiError::BadRequest(msg),
            RepoError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::MalformedBody(_)
            | ApiError::BadRequest(_)
            | ApiError::InvalidCredentials(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthenticated | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            ApiError::Validation(errors) => json!({
                "success": false,
                "message": "Invalid request data",
                "errors": errors,
            }),
            ApiError::MalformedBody(detail) => {
                tracing::debug!("Rejected malformed body: {}", detail);
                json!({
                    "success": false,
                    "message": "Request body is not valid JSON",
                })
            }
            ApiError::BadRequest(msg) => json!({ "success": false, "message": msg }),
            ApiError::Internal(detail) => {
                error!("Internal server error: {}", detail);
                json!({
                    "success": false,
                    "message": "An error occurred, please try again later",
                })
            }
            other => json!({ "success": false, "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
