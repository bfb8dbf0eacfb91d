use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failures raised by the access-rule layer, classified by how the HTTP
/// layer renders them.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A read matched zero rows.
    #[error("{0}")]
    NotFound(String),

    /// A mutation matched zero rows. For cats this covers both a missing
    /// row and one owned by somebody else; callers cannot tell the two
    /// apart.
    #[error("{0}")]
    NoRowsAffected(String),

    /// Input rejected before any store call.
    #[error("{0}")]
    BadRequest(String),

    /// Role check failed before any store call.
    #[error("{0}")]
    Forbidden(String),

    /// Login lookup or password check failed. Renders with HTTP 200: a
    /// failed login is a normal outcome, not a fault, and the message never
    /// reveals whether the email is registered.
    #[error("Invalid username/password")]
    InvalidCredentials,

    /// Store-level failure, passed through unmodified.
    #[error(transparent)]
    Store(#[from] sqlx::Error),

    /// Infrastructure failure outside the store (hashing, signing, file io).
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NoRowsAffected(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InvalidCredentials => StatusCode::OK,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Wire shape of every failure.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::warn!(%status, error = %self, "request rejected");
        }
        let stack = cfg!(debug_assertions).then(|| format!("{self:?}"));
        let body = ErrorResponse {
            message: self.to_string(),
            stack,
        };
        (status, Json(body)).into_response()
    }
}
