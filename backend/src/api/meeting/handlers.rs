//! Handler functions for the meetings API.
//!
//! These functions schedule meetings, list the meetings a caller takes part
//! in, and turn that list into the caller's notification feed through
//! `services::notifications`.

use std::sync::Arc;

use adapters::{Meeting, MeetingStatus, Participant, ParticipantStatus, StoreError};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::{AuthUser, Role};
use crate::errors::AppError;
use crate::services::notifications::{notifications_for, Notification};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingRequest {
    pub title: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub participant_ids: Vec<Uuid>,
}

/// Schedules a meeting with the caller as organizer. Invitees start out
/// `pending`.
pub async fn create_meeting(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<CreateMeetingRequest>,
) -> Result<(StatusCode, Json<Meeting>), AppError> {
    let organizer = user.require(&[Role::Entrepreneur, Role::Investor])?;

    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title is required".into()));
    }
    if request.start_time < Utc::now() {
        return Err(AppError::Validation("meeting cannot start in the past".into()));
    }
    if matches!(request.end_time, Some(end) if end <= request.start_time) {
        return Err(AppError::Validation("endTime must be after startTime".into()));
    }

    let mut participants: Vec<Participant> = Vec::new();
    for user_id in request.participant_ids {
        if user_id == organizer.id || participants.iter().any(|p| p.user_id == user_id) {
            continue;
        }
        match state.store.user_by_id(user_id).await {
            Ok(_) => participants.push(Participant {
                user_id,
                status: ParticipantStatus::Pending,
            }),
            Err(StoreError::NotFound { .. }) => {
                return Err(AppError::Validation(format!("unknown participant {user_id}")))
            }
            Err(e) => return Err(e.into()),
        }
    }

    let meeting = state
        .store
        .insert_meeting(Meeting {
            id: Uuid::new_v4(),
            title: title.to_string(),
            start_time: Some(request.start_time),
            end_time: request.end_time,
            organizer_id: organizer.id,
            participants,
            status: MeetingStatus::Scheduled,
        })
        .await?;

    info!(
        meeting_id = %meeting.id,
        organizer = %organizer.id,
        participants = meeting.participants.len(),
        "meeting scheduled"
    );
    Ok((StatusCode::CREATED, Json(meeting)))
}

pub async fn list_meetings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<Meeting>>, AppError> {
    let meetings = state.store.meetings_for(user.0.id).await?;
    Ok(Json(meetings))
}

/// Reminders and upcoming-meeting notices for the caller at the current time.
/// Cancelled meetings never produce a notification.
pub async fn notifications(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<Notification>>, AppError> {
    let mut meetings = state.store.meetings_for(user.0.id).await?;
    meetings.retain(|m| m.status != MeetingStatus::Cancelled);

    Ok(Json(notifications_for(&meetings, Utc::now())))
}
