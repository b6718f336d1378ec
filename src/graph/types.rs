//! Shared types for Microsoft Graph resources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A directory user, as returned by identity search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub display_name: String,
    pub email: String,
}

/// Someone on a meeting roster (organizer or attendee).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub display_name: String,
    pub email: String,
}

impl Participant {
    /// View this roster entry as a directory identity.
    pub fn to_identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// An online meeting with its roster.
#[derive(Debug, Clone)]
pub struct Meeting {
    pub id: String,
    pub subject: String,
    pub organizer: Participant,
    pub participants: Vec<Participant>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// A meeting transcript with its text content.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub id: String,
    pub meeting_id: String,
    pub content: String,
    pub created: Option<DateTime<Utc>>,
}

/// A Planner plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub id: String,
    pub title: String,
    pub owner: String,
}

/// A created Planner task.
#[derive(Debug, Clone)]
pub struct TrackedTask {
    pub id: String,
    pub plan_id: String,
    pub title: String,
    pub due_date: Option<String>,
}

/// A Graph change-notification subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub resource: String,
    pub change_type: String,
    pub notification_url: String,
    pub expiration_date_time: DateTime<Utc>,
    #[serde(default)]
    pub client_state: String,
}
