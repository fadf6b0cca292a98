//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for signup, login and
//! "who am I", parse the request bodies, and delegate to `auth::service` for
//! the core business logic.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use super::middleware::AuthUser;
use super::models::{AuthResponse, Identity, LoginRequest, SignupRequest};
use super::service;
use crate::errors::AppError;
use crate::state::AppState;

pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let response = service::signup(&state, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    service::login(&state, request).await.map(Json)
}

/// Echoes the identity embedded in the caller's token.
pub async fn me(AuthUser(identity): AuthUser) -> Json<Identity> {
    Json(identity)
}
