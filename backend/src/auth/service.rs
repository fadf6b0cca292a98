//! Core business logic for the authentication system.
//!
//! This service handles operations such as account creation, password hashing,
//! token issuance and validation. It orchestrates interactions between the
//! handlers and the store.

use std::sync::OnceLock;

use adapters::{AccountStatus, StoreAdapter, StoreError, UserRecord};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tokio::task;
use tracing::{info, warn};
use uuid::Uuid;

use super::errors::AuthError;
use super::models::{AuthResponse, Claims, Identity, IssuedToken, LoginRequest, Role, SignupRequest};
use crate::config::AdminSeed;
use crate::errors::AppError;
use crate::state::AppState;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Issues and validates HS256 session credentials.
///
/// Tokens are stateless: nothing is recorded on issue, and there is no
/// revocation list. Expiry is the only way a token stops being accepted.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller's clock in `validate_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, identity: &Identity) -> Result<IssuedToken, AuthError> {
        self.issue_at(identity, Utc::now())
    }

    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::TokenCreation("token expiry out of range".into()))?;
        let claims = Claims::new(identity, now, expires_at);

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    pub fn validate(&self, credential: Option<&str>) -> Result<Identity, AuthError> {
        self.validate_at(credential, Utc::now())
    }

    /// Checks signature and format first, then expiry. A token is accepted up
    /// to and including its `exp` second.
    pub fn validate_at(&self, credential: Option<&str>, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        let token = credential
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Missing)?;

        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            warn!(error = %e, "rejecting malformed or tampered token");
            AuthError::Invalid
        })?;

        if now.timestamp() > data.claims.exp {
            return Err(AuthError::Expired);
        }

        Ok(data.claims.identity())
    }
}

/// Hashes a password with Argon2 into a PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Ok(password_hash.to_string())
}

/// Verifies a password against a stored PHC string. A malformed stored hash
/// is an error, a wrong password is `Ok(false)`.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash compared against when the email is unknown, so a miss costs the
/// same as a wrong password.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| {
        hash_password("nexus-dummy-password").unwrap_or_else(|e| {
            warn!(error = %e, "failed to prepare dummy password hash");
            String::new()
        })
    })
}

async fn hash_blocking(password: String) -> Result<String, AppError> {
    task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?
        .map_err(AppError::from)
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, AppError> {
    task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?
        .map_err(AppError::from)
}

fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AppError::Validation("a valid email address is required".into())),
    }
}

fn check_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn new_user(name: String, email: String, password_hash: String, role: Role) -> UserRecord {
    let now = Utc::now();
    UserRecord {
        id: Uuid::new_v4(),
        name,
        email,
        password_hash,
        role,
        status: AccountStatus::Active,
        email_verified: false,
        created_at: now,
        updated_at: now,
    }
}

/// Registers a new entrepreneur or investor and signs them in.
pub async fn signup(state: &AppState, request: SignupRequest) -> Result<AuthResponse, AppError> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }
    let email = normalize_email(&request.email)?;
    check_password(&request.password)?;

    let role = request.role.unwrap_or(Role::Entrepreneur);
    match role {
        Role::Entrepreneur | Role::Investor => {}
        Role::Admin | Role::User => {
            return Err(AppError::Validation(format!(
                "cannot sign up with role `{role}`"
            )))
        }
    }

    let password_hash = hash_blocking(request.password).await?;
    let user = state
        .store
        .insert_user(new_user(name, email, password_hash, role))
        .await?;
    info!(user_id = %user.id, %role, "account created");

    let identity = Identity::from(user);
    let issued = state.tokens.issue(&identity)?;
    Ok(AuthResponse::new(issued, identity))
}

/// Verifies credentials and issues a fresh token for an active account.
pub async fn login(state: &AppState, request: LoginRequest) -> Result<AuthResponse, AppError> {
    let email = request.email.trim().to_lowercase();

    let user = match state.store.user_by_email(&email).await? {
        Some(user) => {
            let verified = verify_blocking(request.password, user.password_hash.clone()).await?;
            verified.then_some(user)
        }
        None => {
            // Result ignored: only the time spent matters.
            let password = request.password;
            let _ = task::spawn_blocking(move || verify_password(&password, dummy_hash())).await;
            None
        }
    };
    let Some(user) = user else {
        warn!(%email, "failed login attempt");
        return Err(AuthError::InvalidCredentials.into());
    };

    if user.status != AccountStatus::Active {
        warn!(user_id = %user.id, status = ?user.status, "login refused for inactive account");
        return Err(AuthError::Inactive.into());
    }

    let identity = Identity::from(user);
    let issued = state.tokens.issue(&identity)?;
    info!(user_id = %identity.id, "login succeeded");
    Ok(AuthResponse::new(issued, identity))
}

/// Creates the configured administrator account unless the email is taken.
pub async fn ensure_admin(store: &dyn StoreAdapter, seed: &AdminSeed) -> Result<(), AppError> {
    let email = normalize_email(&seed.email)?;
    check_password(&seed.password)?;

    if let Some(existing) = store.user_by_email(&email).await? {
        if existing.role != Role::Admin {
            warn!(%email, role = %existing.role, "admin seed email belongs to a non-admin account");
        }
        return Ok(());
    }

    let password_hash = hash_blocking(seed.password.clone()).await?;
    match store
        .insert_user(new_user("Administrator".into(), email.clone(), password_hash, Role::Admin))
        .await
    {
        Ok(admin) => {
            info!(user_id = %admin.id, %email, "administrator account created");
            Ok(())
        }
        // Lost a race with a concurrent signup.
        Err(StoreError::Conflict(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn identity(role: Role) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            name: "Grace".into(),
            email: "grace@nexus.io".into(),
            role,
            status: AccountStatus::Active,
            email_verified: true,
        }
    }

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::hours(1))
    }

    #[test]
    fn issued_token_validates_to_embedded_identity() {
        let tokens = service();
        for role in [Role::Entrepreneur, Role::Investor, Role::Admin, Role::User] {
            let who = identity(role);
            let issued = tokens.issue(&who).unwrap();
            assert_eq!(tokens.validate(Some(issued.token.as_str())).unwrap(), who);
        }
    }

    #[test]
    fn token_is_valid_until_expiry_and_expired_after() {
        let tokens = service();
        let who = identity(Role::Investor);
        let issued_at = Utc::now();
        let issued = tokens.issue_at(&who, issued_at).unwrap();
        assert_eq!(issued.expires_at, issued_at + Duration::hours(1));

        let almost = issued_at + Duration::minutes(59);
        assert_eq!(tokens.validate_at(Some(issued.token.as_str()), almost).unwrap(), who);
        assert_eq!(
            tokens.validate_at(Some(issued.token.as_str()), issued.expires_at).unwrap(),
            who
        );

        let after = issued.expires_at + Duration::seconds(1);
        assert_eq!(
            tokens.validate_at(Some(issued.token.as_str()), after),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn missing_credential_is_reported_as_missing() {
        let tokens = service();
        assert_eq!(tokens.validate(None), Err(AuthError::Missing));
        assert_eq!(tokens.validate(Some("")), Err(AuthError::Missing));
        assert_eq!(tokens.validate(Some("   ")), Err(AuthError::Missing));
    }

    #[test]
    fn garbage_and_foreign_tokens_are_invalid() {
        let tokens = service();
        assert_eq!(tokens.validate(Some("not-a-jwt")), Err(AuthError::Invalid));

        let other = TokenService::new(b"another-secret-another-secret-xx", Duration::hours(1));
        let foreign = other.issue(&identity(Role::Admin)).unwrap();
        assert_eq!(tokens.validate(Some(foreign.token.as_str())), Err(AuthError::Invalid));
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let tokens = service();
        let issued = tokens.issue(&identity(Role::Investor)).unwrap();
        let mut parts: Vec<String> = issued.token.split('.').map(String::from).collect();
        parts[1] = parts[1].chars().rev().collect();
        let tampered = parts.join(".");
        assert_eq!(tokens.validate(Some(tampered.as_str())), Err(AuthError::Invalid));
    }

    #[test]
    fn password_round_trip() {
        let stored = hash_password("correct horse").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert_eq!(verify_password("correct horse", &stored), Ok(true));
        assert_eq!(verify_password("correct h0rse", &stored), Ok(false));
        assert_ne!(stored, hash_password("correct horse").unwrap(), "salt must differ");
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        assert!(matches!(
            verify_password("correct horse", "garbage"),
            Err(AuthError::PasswordHash(_))
        ));
    }

    #[test]
    fn dummy_hash_never_matches_user_input() {
        assert!(dummy_hash().starts_with("$argon2id$"));
        assert_eq!(verify_password("hunter2hunter2", dummy_hash()), Ok(false));
    }

    #[test]
    fn expiry_overflow_is_an_error_not_a_panic() {
        let tokens = TokenService::new(SECRET, Duration::days(365));
        let near_end = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        assert!(matches!(
            tokens.issue_at(&identity(Role::Investor), near_end),
            Err(AuthError::TokenCreation(_))
        ));
    }

    #[tokio::test]
    async fn login_with_unknown_email_is_invalid_credentials() {
        let config = crate::config::Config::from_lookup(|key| {
            (key == crate::config::ENV_JWT_SECRET)
                .then(|| String::from_utf8_lossy(SECRET).into_owned())
        })
        .unwrap();
        let state = AppState::new(config, std::sync::Arc::new(adapters::InMemoryStore::new()));

        let err = login(
            &state,
            LoginRequest {
                email: "ghost@nexus.io".into(),
                password: "hunter2hunter2".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::InvalidCredentials)));
    }

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Ada@Example.COM ").unwrap(), "ada@example.com");
        assert!(normalize_email("ada.example.com").is_err());
        assert!(normalize_email("@example.com").is_err());
    }
}
