//! Authentication module for managing user accounts, sessions, and access control.
//!
//! This module provides the public interface for authentication-related
//! functionality such as signup, login, token issuance and validation, and
//! the role gate used by the rest of the API.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;

// Re-exports for convenience
pub use errors::*;
pub use middleware::{authorize, bearer_token, require_auth, AuthUser, AUTH_TOKEN_HEADER};
pub use models::*;
pub use routes::*;
pub use service::TokenService;
