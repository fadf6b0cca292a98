//! Defines the HTTP routes for user profiles and account administration.

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch},
    Router,
};

use super::handlers::{
    get_profile, list_entrepreneurs, list_investors, list_users, update_profile, update_status,
};
use crate::auth::require_auth;
use crate::state::AppState;

pub fn user_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(get_profile).patch(update_profile))
        .route("/entrepreneurs", get(list_entrepreneurs))
        .route("/investors", get(list_investors))
        .route("/:id/status", patch(update_status))
        .route_layer(from_fn_with_state(state, require_auth))
}
