//! Defines the HTTP routes for meetings and meeting notifications.

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, routing::get, Router};

use super::handlers::{create_meeting, list_meetings, notifications};
use crate::auth::require_auth;
use crate::state::AppState;

pub fn meeting_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_meetings).post(create_meeting))
        .route("/notifications", get(notifications))
        .route_layer(from_fn_with_state(state, require_auth))
}
