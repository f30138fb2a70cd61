//! Error handling module for the drinks backend.
//!
//! Store operations return [`StoreError`]; handlers decide per route which
//! [`AppError`] (and so which HTTP status) a store failure becomes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

/// Failure of a single store operation.
#[derive(Debug)]
pub enum StoreError {
    /// No row with the requested id
    NotFound,
    /// Write rejected by a constraint (duplicate title)
    Conflict(String),
    /// Pool or I/O failure talking to SQLite
    Connection(String),
    /// A stored recipe could not be decoded or encoded
    CorruptRecipe(String),
    /// Any other database failure
    Query(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "drink not found"),
            StoreError::Conflict(msg) => write!(f, "write conflict: {}", msg),
            StoreError::Connection(msg) => write!(f, "connection failure: {}", msg),
            StoreError::CorruptRecipe(msg) => write!(f, "corrupt recipe: {}", msg),
            StoreError::Query(msg) => write!(f, "query failed: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Connection(err.to_string()),
            _ => StoreError::Query(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::CorruptRecipe(err.to_string())
    }
}

/// Request-level error, rendered as the JSON error envelope.
#[derive(Debug)]
pub enum AppError {
    /// Missing or rejected bearer token
    Unauthorized(AuthError),
    /// Resource not found
    NotFound,
    /// Body could not be processed, or the write was rejected
    Unprocessable,
    /// Internal server error
    Internal,
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the client-facing message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(err) => err.description().to_string(),
            AppError::NotFound => "resource not found".to_string(),
            AppError::Unprocessable => "unprocessable".to_string(),
            AppError::Internal => "internal server error".to_string(),
        }
    }

    /// Map a store failure where a missing row is a 404 and anything else a 500.
    pub fn from_store_read(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound,
            other => {
                tracing::error!("Store error: {}", other);
                AppError::Internal
            }
        }
    }

    /// Map a store failure where a missing row is a 404 and anything else a 422.
    pub fn from_store_write(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound,
            StoreError::Conflict(msg) => {
                tracing::warn!("Write rejected: {}", msg);
                AppError::Unprocessable
            }
            other => {
                tracing::error!("Store error: {}", other);
                AppError::Unprocessable
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status_code().as_u16(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Unauthorized(err)
    }
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: u16,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            success: false,
            error: error.status_code().as_u16(),
            message: error.message(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}
