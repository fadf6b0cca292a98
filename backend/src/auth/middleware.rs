//! Middleware for protecting authenticated routes and handling authorization.
//!
//! This module contains the logic for pulling the session credential out of a
//! request, validating it, and enforcing role restrictions across the API
//! endpoints.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use super::errors::AuthError;
use super::models::{Identity, Role};
use crate::state::AppState;

/// Alternate header for clients that cannot set `Authorization`.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Role gate. An empty `allowed` set admits any authenticated identity.
pub fn authorize(identity: &Identity, allowed: &[Role]) -> Result<(), AuthError> {
    if allowed.is_empty() || allowed.contains(&identity.role) {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %identity.id,
            role = %identity.role,
            ?allowed,
            "role gate denied request"
        );
        Err(AuthError::Forbidden)
    }
}

/// Extracts the raw credential from `Authorization: Bearer <token>` or, when
/// that header is absent, from `x-auth-token`.
///
/// Returns `Ok(None)` when neither header is present. An `Authorization`
/// header with another scheme is rejected rather than ignored.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let value = value.to_str().map_err(|_| AuthError::Invalid)?.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("bearer") {
            return Ok(None);
        }
        return match value.split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => {
                Ok(Some(token.trim()).filter(|t| !t.is_empty()))
            }
            _ => Err(AuthError::Invalid),
        };
    }

    match headers.get(AUTH_TOKEN_HEADER) {
        Some(value) => value.to_str().map(|v| Some(v.trim())).map_err(|_| AuthError::Invalid),
        None => Ok(None),
    }
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Identity, AuthError> {
    let token = bearer_token(headers)?;
    state.tokens.validate(token)
}

/// Rejects unauthenticated requests and stores the [`Identity`] in the
/// request extensions for the handlers behind it.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = authenticate(&state, request.headers()).map_err(|e| {
        tracing::debug!(path = %request.uri().path(), error = %e, "unauthenticated request");
        e
    })?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Handler argument for the authenticated caller.
///
/// Reuses the identity stored by [`require_auth`] when that layer ran,
/// otherwise validates the request headers itself.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl AuthUser {
    /// Applies the role gate to this caller.
    pub fn require(&self, allowed: &[Role]) -> Result<&Identity, AuthError> {
        authorize(&self.0, allowed)?;
        Ok(&self.0)
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(AuthUser(identity.clone()));
        }
        authenticate(state, &parts.headers).map(AuthUser)
    }
}
