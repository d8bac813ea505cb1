use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::models::ApiResponse;

/// Every failure a request can end in. All of them are terminal for the
/// request and rendered to the caller as `{ok: false, error}`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Bad or missing input (empty name, malformed month, ...)
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Attendance already exists for the employee and date
    #[error("{0}")]
    Duplicate(String),

    /// Backing store or remote API unreachable / misbehaving
    #[error("{0}")]
    Transport(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        AppError::Transport(msg.into())
    }

    /// Rebuilds an error from an HTTP status and envelope message, used by
    /// the client side of the API.
    pub fn from_status(status: u16, msg: String) -> Self {
        match status {
            400 => AppError::Validation(msg),
            404 => AppError::NotFound(msg),
            409 => AppError::Duplicate(msg),
            _ => AppError::Transport(msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::error(self.to_string()))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Transport(format!("Remote request failed: {e}"))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Transport(format!("Database error: {e}"))
    }
}
