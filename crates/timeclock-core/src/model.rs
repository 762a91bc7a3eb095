//! Domain records shared by storage, orchestration and transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Work session identifier.
pub type SessionId = Uuid;

/// User identifier.
pub type UserId = String;

/// Id of the single account the server operates as.
pub const DEFAULT_USER_ID: &str = "default-user";

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub name: String,
}

impl User {
    /// The seeded demo account.
    #[must_use]
    pub fn default_user() -> Self {
        Self {
            id: DEFAULT_USER_ID.to_string(),
            username: "philip".to_string(),
            name: "Philip".to_string(),
        }
    }
}

/// A single clock-in/clock-out interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSession {
    /// Unique session identifier.
    pub id: SessionId,
    /// Owner of the session.
    pub user_id: UserId,
    /// When the user clocked in.
    pub clock_in_time: DateTime<Utc>,
    /// When the user clocked out, `None` while the session is open.
    pub clock_out_time: Option<DateTime<Utc>>,
    /// Whether the session is still open.
    pub is_active: bool,
}

impl WorkSession {
    /// Open a new session for `user_id`.
    #[must_use]
    pub fn open(user_id: impl Into<UserId>, clock_in_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            clock_in_time,
            clock_out_time: None,
            is_active: true,
        }
    }

    /// Mark the session closed at `clock_out_time`.
    pub fn close(&mut self, clock_out_time: DateTime<Utc>) {
        self.clock_out_time = Some(clock_out_time);
        self.is_active = false;
    }
}

/// Current working state of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkStatus {
    pub is_working: bool,
    pub active_session: Option<WorkSession>,
}

impl From<Option<WorkSession>> for WorkStatus {
    fn from(active_session: Option<WorkSession>) -> Self {
        Self {
            is_working: active_session.is_some(),
            active_session,
        }
    }
}
