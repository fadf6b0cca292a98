//! Core `adapters` crate for abstracting the persistence layer behind the API.
//!
//! This crate defines the `StoreAdapter` trait, which outlines the generic
//! lookups and writes the backend needs from a document store (identities and
//! meetings), and provides the concrete implementations the backend can be
//! wired to.

pub mod errors;
pub mod memory;
pub mod models;

use async_trait::async_trait;
use uuid::Uuid;

pub use errors::StoreError;
pub use memory::InMemoryStore;
pub use models::*;

/// Persistence operations the backend relies on.
///
/// Implementations must be safe to share between request handlers; every
/// method takes `&self` and is expected to do its own synchronization.
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Stores a new identity. Fails with [`StoreError::Conflict`] when the
    /// email is already registered (case-insensitive).
    async fn insert_user(&self, user: UserRecord) -> Result<UserRecord, StoreError>;

    async fn user_by_id(&self, id: Uuid) -> Result<UserRecord, StoreError>;

    async fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Replaces an existing identity. Identities are never removed, callers
    /// change `status` instead.
    async fn update_user(&self, user: UserRecord) -> Result<UserRecord, StoreError>;

    /// Lists identities, optionally restricted to one role, oldest first.
    async fn users(&self, role: Option<Role>) -> Result<Vec<UserRecord>, StoreError>;

    async fn insert_meeting(&self, meeting: Meeting) -> Result<Meeting, StoreError>;

    /// Meetings the user organizes or participates in, ordered by start time
    /// with unscheduled meetings last.
    async fn meetings_for(&self, user_id: Uuid) -> Result<Vec<Meeting>, StoreError>;
}
