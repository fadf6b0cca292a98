//! Custom error types specific to authentication failures.
//!
//! This module defines the errors that can occur while issuing, validating or
//! checking session credentials, and how each of them is rendered as an HTTP
//! response.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Terminal per-request authentication failures. None of these are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication token is missing")]
    Missing,

    #[error("Authentication token is invalid")]
    Invalid,

    #[error("Authentication token has expired")]
    Expired,

    #[error("You do not have permission to perform this operation")]
    Forbidden,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is not active")]
    Inactive,

    #[error("Failed to create token: {0}")]
    TokenCreation(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Missing
            | AuthError::Invalid
            | AuthError::Expired
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden | AuthError::Inactive => StatusCode::FORBIDDEN,
            AuthError::TokenCreation(_) | AuthError::PasswordHash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AuthError::TokenCreation(reason) => {
                tracing::error!(%reason, "token signing failed");
                "Internal error".to_string()
            }
            AuthError::PasswordHash(reason) => {
                tracing::error!(%reason, "password hashing failed");
                "Internal error".to_string()
            }
            other => other.to_string(),
        };

        let mut response = (status, Json(json!({ "error": message }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
