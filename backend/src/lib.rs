//! Nexus2 backend: a REST API connecting entrepreneurs with investors.
//!
//! The crate wires the Axum router together from its feature modules:
//!
//! - [`auth`]: signup, login, session credentials and the role gate
//! - [`api::user`]: profiles, marketplace listings, account administration
//! - [`api::meeting`]: scheduling and the meeting notification feed
//! - [`services::notifications`]: the time-window logic behind that feed
//!
//! Persistence is reached through the `adapters` crate's `StoreAdapter`.

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tokio::{net::TcpListener, signal};
use tracing::info;

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod middleware;
pub mod services;
pub mod state;

use api::{meeting::routes::meeting_router, user::routes::user_router};
use auth::auth_router;
use config::Config;
use errors::StartupError;
use state::AppState;

/// Builds the full application router for the given state.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api/auth", auth_router())
        .nest("/api/users", user_router(state.clone()))
        .nest("/api/meetings", meeting_router(state.clone()))
        .layer(middleware::cors_layer(&state.config))
        .layer(middleware::trace_layer())
        .with_state(state)
}

/// Loads configuration, prepares the store and serves until a shutdown signal.
pub async fn start_server() -> Result<(), StartupError> {
    info!("Loading configuration...");
    let config = Config::load()?;

    let store = database::init_store();
    if let Some(seed) = &config.admin {
        auth::service::ensure_admin(store.as_ref(), seed).await?;
    }

    let state = AppState::new(config, store);
    let address = state.config.socket_addr();
    let app = app(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn root_handler() -> &'static str {
    "Welcome to Nexus2!"
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
