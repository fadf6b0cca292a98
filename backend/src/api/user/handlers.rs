//! Handler functions for user profile and management API endpoints.
//!
//! These functions process requests for user data, apply the role gate where
//! an operation is restricted, and return the public [`Identity`] view of the
//! stored accounts.

use std::sync::Arc;

use adapters::AccountStatus;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::{AuthUser, Identity, Role};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AccountStatus,
}

/// Current profile as stored, which may be newer than the token's claims.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Identity>, AppError> {
    let record = state.store.user_by_id(user.0.id).await?;
    Ok(Json(Identity::from(record)))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Identity>, AppError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }

    let mut record = state.store.user_by_id(user.0.id).await?;
    record.name = name.to_string();
    record.updated_at = Utc::now();
    let record = state.store.update_user(record).await?;

    Ok(Json(Identity::from(record)))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<Identity>>, AppError> {
    user.require(&[Role::Admin])?;

    let users = state.store.users(None).await?;
    Ok(Json(users.iter().map(Identity::from).collect()))
}

/// Soft-deletes, suspends or reactivates an account. Accounts are never
/// removed from the store.
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Identity>, AppError> {
    let admin = user.require(&[Role::Admin])?;
    if admin.id == id {
        return Err(AppError::Validation(
            "administrators cannot change their own status".into(),
        ));
    }

    let mut record = state.store.user_by_id(id).await?;
    record.status = request.status;
    record.updated_at = Utc::now();
    let record = state.store.update_user(record).await?;

    info!(admin_id = %admin.id, user_id = %id, status = ?request.status, "account status changed");
    Ok(Json(Identity::from(record)))
}

async fn active_with_role(state: &AppState, role: Role) -> Result<Vec<Identity>, AppError> {
    let users = state.store.users(Some(role)).await?;
    Ok(users
        .iter()
        .filter(|u| u.status == AccountStatus::Active)
        .map(Identity::from)
        .collect())
}

pub async fn list_entrepreneurs(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<Identity>>, AppError> {
    user.require(&[Role::Investor, Role::Admin])?;
    active_with_role(&state, Role::Entrepreneur).await.map(Json)
}

pub async fn list_investors(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<Identity>>, AppError> {
    user.require(&[Role::Entrepreneur, Role::Admin])?;
    active_with_role(&state, Role::Investor).await.map(Json)
}
