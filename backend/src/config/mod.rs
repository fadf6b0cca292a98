//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the listen address, the token signing secret, token lifetime, the allowed
//! CORS origin and the optional bootstrap administrator account.

use std::{env, fmt, fs::read_to_string, net::IpAddr, net::SocketAddr, str::FromStr};

use axum::http::HeaderValue;
use chrono::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub const ENV_HOST: &str = "NEXUS_HOST";
pub const ENV_PORT: &str = "NEXUS_PORT";
pub const ENV_JWT_SECRET: &str = "NEXUS_JWT_SECRET";
pub const ENV_TOKEN_TTL_SECS: &str = "NEXUS_TOKEN_TTL_SECS";
pub const ENV_CORS_ORIGIN: &str = "NEXUS_CORS_ORIGIN";
pub const ENV_ADMIN_EMAIL: &str = "NEXUS_ADMIN_EMAIL";
pub const ENV_ADMIN_PASSWORD: &str = "NEXUS_ADMIN_PASSWORD";

const SECRET_FILE: &str = "/run/secrets/nexus_jwt_secret";

/// HS256 keys shorter than the digest size are rejected.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted session lifetime, one year.
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("No token signing secret configured (set NEXUS_JWT_SECRET or /run/secrets/nexus_jwt_secret)")]
    MissingSecret,

    #[error("Token signing secret must be at least 32 bytes, got {0}")]
    WeakSecret(usize),

    #[error("NEXUS_ADMIN_EMAIL and NEXUS_ADMIN_PASSWORD must be set together")]
    PartialAdmin,
}

/// Credentials of the administrator account created at startup.
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

#[derive(Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// `None` allows any origin.
    pub cors_origin: Option<HeaderValue>,
    pub admin: Option<AdminSeed>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("cors_origin", &self.cors_origin)
            .field("admin", &self.admin.as_ref().map(|a| &a.email))
            .finish()
    }
}

impl Config {
    /// Loads configuration from the process environment. The signing secret
    /// falls back to a mounted secret file when the variable is unset.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            env::var(key).ok().or_else(|| {
                if key == ENV_JWT_SECRET {
                    read_secret(SECRET_FILE)
                } else {
                    None
                }
            })
        })
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = try_load(&lookup, ENV_HOST, "0.0.0.0")?;
        let port = try_load(&lookup, ENV_PORT, "3000")?;

        let jwt_secret = lookup(ENV_JWT_SECRET)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret)?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret(jwt_secret.len()));
        }

        let ttl_secs: i64 = try_load(&lookup, ENV_TOKEN_TTL_SECS, "86400")?;
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&ttl_secs) {
            return Err(ConfigError::Invalid {
                key: ENV_TOKEN_TTL_SECS,
                reason: format!("must be between 1 and {MAX_TOKEN_TTL_SECS} seconds"),
            });
        }
        let token_ttl = Duration::try_seconds(ttl_secs).ok_or(ConfigError::Invalid {
            key: ENV_TOKEN_TTL_SECS,
            reason: "out of range".into(),
        })?;

        let cors_origin = lookup(ENV_CORS_ORIGIN)
            .map(|origin| {
                HeaderValue::from_str(&origin).map_err(|e| ConfigError::Invalid {
                    key: ENV_CORS_ORIGIN,
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let admin = match (lookup(ENV_ADMIN_EMAIL), lookup(ENV_ADMIN_PASSWORD)) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialAdmin),
        };

        Ok(Self {
            host,
            port,
            jwt_secret,
            token_ttl,
            cors_origin,
            admin,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }
    })
}

fn read_secret(path: &str) -> Option<String> {
    read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read secret from {path}: {e}");
        })
        .ok()
}
