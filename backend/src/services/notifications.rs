//! Derives meeting notifications for a point in time.
//!
//! Given the meetings already fetched for a user and the current instant, this
//! module decides which meetings are worth surfacing: anything starting within
//! the next 24 hours is `Upcoming`, and anything starting within 15 minutes is
//! promoted to a `Reminder`. Nothing is retained between calls; each request
//! computes its notifications afresh and owns the result.

use adapters::Meeting;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Meetings starting later than this are not surfaced yet.
pub const UPCOMING_WINDOW_SECS: i64 = 24 * 60 * 60;

/// Meetings starting sooner than this become reminders.
pub const REMINDER_WINDOW_SECS: i64 = 15 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Reminder,
    Upcoming,
}

/// Classifies a single meeting relative to `now`.
///
/// Returns `None` for meetings that already started, start beyond the
/// upcoming window, or carry no start time at all.
pub fn kind_at(meeting: &Meeting, now: DateTime<Utc>) -> Option<NotificationKind> {
    let until = meeting.start_time? - now;

    if until < Duration::zero() || until > Duration::seconds(UPCOMING_WINDOW_SECS) {
        None
    } else if until < Duration::seconds(REMINDER_WINDOW_SECS) {
        Some(NotificationKind::Reminder)
    } else {
        Some(NotificationKind::Upcoming)
    }
}

/// Lazily selects and classifies the meetings that deserve a notification.
///
/// The iterator borrows `meetings` and holds no other state, so calling
/// `classify` again restarts the computation from scratch.
pub fn classify<'a>(
    meetings: &'a [Meeting],
    now: DateTime<Utc>,
) -> impl Iterator<Item = (&'a Meeting, NotificationKind)> + 'a {
    meetings
        .iter()
        .filter_map(move |meeting| kind_at(meeting, now).map(|kind| (meeting, kind)))
}

/// A notification ready to be rendered by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub meeting_id: Uuid,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub minutes_until_start: i64,
    pub message: String,
}

impl Notification {
    fn new(meeting: &Meeting, kind: NotificationKind, now: DateTime<Utc>) -> Option<Self> {
        let start_time = meeting.start_time?;
        let minutes_until_start = (start_time - now).num_minutes();

        let message = match kind {
            NotificationKind::Reminder if minutes_until_start == 0 => {
                format!("\"{}\" is starting now", meeting.title)
            }
            NotificationKind::Reminder => format!(
                "\"{}\" starts in {} minute{}",
                meeting.title,
                minutes_until_start,
                if minutes_until_start == 1 { "" } else { "s" }
            ),
            NotificationKind::Upcoming => format!(
                "\"{}\" is scheduled for {} UTC",
                meeting.title,
                start_time.format("%Y-%m-%d %H:%M")
            ),
        };

        Some(Self {
            kind,
            meeting_id: meeting.id,
            title: meeting.title.clone(),
            start_time,
            minutes_until_start,
            message,
        })
    }
}

/// Materializes [`classify`] into notifications, soonest first.
pub fn notifications_for(meetings: &[Meeting], now: DateTime<Utc>) -> Vec<Notification> {
    let mut notifications: Vec<Notification> = classify(meetings, now)
        .filter_map(|(meeting, kind)| Notification::new(meeting, kind, now))
        .collect();
    notifications.sort_by_key(|n| n.start_time);
    notifications
}
