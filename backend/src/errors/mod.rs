//! Global application error types and handlers.
//!
//! This module defines the error type returned by every API handler and maps
//! each failure onto a consistent JSON error response.

use adapters::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Validation(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Auth(err) => return err.into_response(),
            AppError::Validation(reason) => (StatusCode::BAD_REQUEST, reason),
            AppError::Store(err @ StoreError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            AppError::Store(err @ StoreError::Conflict(_)) => (StatusCode::CONFLICT, err.to_string()),
            AppError::Store(StoreError::Backend(reason)) => {
                tracing::error!(%reason, "store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Failures that stop the server from starting.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to seed administrator: {0}")]
    Seed(#[from] AppError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
