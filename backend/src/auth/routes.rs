//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle signup, login and token introspection. They are
//! designed to be nested under `/api/auth` in the main Axum router.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{login, me, signup};
use crate::state::AppState;

pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/me", get(me))
}
