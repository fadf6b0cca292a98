use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::Config;
use crate::database::Database;

/// Per-process state shared by every request handler.
pub struct AppState {
    pub config: Config,
    pub tokens: TokenService,
    pub store: Database,
}

impl AppState {
    pub fn new(config: Config, store: Database) -> Arc<Self> {
        let tokens = TokenService::new(config.jwt_secret.as_bytes(), config.token_ttl);
        Arc::new(Self {
            config,
            tokens,
            store,
        })
    }
}
