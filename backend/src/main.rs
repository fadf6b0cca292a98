//! Main entry point for the Nexus2 backend.
//!
//! Initializes logging and hands off to [`backend::start_server`], exiting
//! non-zero when startup fails.

use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = backend::start_server().await {
        error!("{err}");
        std::process::exit(1);
    }
}
