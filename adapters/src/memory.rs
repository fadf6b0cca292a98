//! In-memory implementation of the `StoreAdapter` trait.
//!
//! This file contains the process-local document store used for development
//! and tests. Collections are kept in `HashMap`s guarded by `tokio` locks, so
//! data lives only as long as the server process.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::{Meeting, Role, UserRecord};
use crate::StoreAdapter;

#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, UserRecord>>,
    meetings: RwLock<HashMap<Uuid, Meeting>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreAdapter for InMemoryStore {
    async fn insert_user(&self, mut user: UserRecord) -> Result<UserRecord, StoreError> {
        user.email = user.email.to_lowercase();

        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "email {} is already registered",
                user.email
            )));
        }
        if users.contains_key(&user.id) {
            return Err(StoreError::Conflict(format!("user {} already exists", user.id)));
        }

        debug!(user_id = %user.id, role = %user.role, "inserting user");
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<UserRecord, StoreError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let email = email.to_lowercase();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_user(&self, user: UserRecord) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().await;
        let slot = users
            .get_mut(&user.id)
            .ok_or_else(|| StoreError::not_found("user", user.id))?;
        *slot = user.clone();
        Ok(user)
    }

    async fn users(&self, role: Option<Role>) -> Result<Vec<UserRecord>, StoreError> {
        let mut found: Vec<UserRecord> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect();
        found.sort_by_key(|u| u.created_at);
        Ok(found)
    }

    async fn insert_meeting(&self, meeting: Meeting) -> Result<Meeting, StoreError> {
        let mut meetings = self.meetings.write().await;
        if meetings.contains_key(&meeting.id) {
            return Err(StoreError::Conflict(format!(
                "meeting {} already exists",
                meeting.id
            )));
        }

        debug!(meeting_id = %meeting.id, organizer = %meeting.organizer_id, "inserting meeting");
        meetings.insert(meeting.id, meeting.clone());
        Ok(meeting)
    }

    async fn meetings_for(&self, user_id: Uuid) -> Result<Vec<Meeting>, StoreError> {
        let mut found: Vec<Meeting> = self
            .meetings
            .read()
            .await
            .values()
            .filter(|m| m.involves(user_id))
            .cloned()
            .collect();
        // `None` sorts before `Some`, so order on (missing, time) to push
        // unscheduled meetings to the end.
        found.sort_by_key(|m| (m.start_time.is_none(), m.start_time));
        Ok(found)
    }
}
