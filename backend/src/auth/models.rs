//! Data structures for authentication-related entities.
//!
//! This module defines the authenticated identity, the JWT claims embedded in
//! session credentials, and the request and response payloads of the signup
//! and login endpoints.

use adapters::{AccountStatus, UserRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use adapters::Role;

/// The account a request is made on behalf of.
///
/// This is the public view of a [`UserRecord`]; it never carries the password
/// digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
    pub email_verified: bool,
}

impl From<&UserRecord> for Identity {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            status: user.status,
            email_verified: user.email_verified,
        }
    }
}

impl From<UserRecord> for Identity {
    fn from(user: UserRecord) -> Self {
        Self::from(&user)
    }
}

/// Claims carried by a session credential.
///
/// The role is captured at issue time and trusted until `exp`; a later role
/// change in the store does not reach tokens already handed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity id.
    pub sub: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
    pub email_verified: bool,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    pub fn new(identity: &Identity, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: identity.id,
            name: identity.name.clone(),
            email: identity.email.clone(),
            role: identity.role,
            status: identity.status,
            email_verified: identity.email_verified,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.sub,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            status: self.status,
            email_verified: self.email_verified,
        }
    }
}

/// A freshly signed session credential.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: Identity,
}

impl AuthResponse {
    pub fn new(issued: IssuedToken, user: Identity) -> Self {
        Self {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        }
    }
}
