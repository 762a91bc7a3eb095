//! Core traits for storage and chat providers.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use thiserror::Error;

use crate::{
    clock::day_window,
    model::{SessionId, User, UserId, WorkSession},
};

/// Sort order for session queries, by clock-in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first.
    Ascending,
    /// Newest first.
    #[default]
    Descending,
}

/// Session filter for queries.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    /// Filter by owner.
    pub user_id: Option<UserId>,
    /// Filter by active flag.
    pub active: Option<bool>,
    /// Only sessions clocked in at or after this instant.
    pub clocked_in_from: Option<DateTime<Utc>>,
    /// Only sessions clocked in strictly before this instant.
    pub clocked_in_before: Option<DateTime<Utc>>,
    /// Result ordering.
    pub order: SortOrder,
    /// Limit results.
    pub limit: Option<usize>,
}

impl SessionFilter {
    /// Filter matching every session of `user_id`.
    #[must_use]
    pub fn for_user(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    /// Whether `session` passes every criterion except `limit`.
    #[must_use]
    pub fn matches(&self, session: &WorkSession) -> bool {
        if let Some(ref user_id) = self.user_id {
            if session.user_id != *user_id {
                return false;
            }
        }
        if let Some(active) = self.active {
            if session.is_active != active {
                return false;
            }
        }
        if let Some(from) = self.clocked_in_from {
            if session.clock_in_time < from {
                return false;
            }
        }
        if let Some(before) = self.clocked_in_before {
            if session.clock_in_time >= before {
                return false;
            }
        }
        true
    }
}

/// Storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("User not found: {0}")]
    UserNotFound(UserId),
    #[error("Work session not found: {0}")]
    SessionNotFound(SessionId),
    #[error("User {0} already has an active work session")]
    AlreadyActive(UserId),
    #[error("Storage error: {0}")]
    Internal(String),
}

/// Trait for work session storage backends.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Get a user by ID.
    async fn get_user(&self, id: &str) -> Result<Option<User>, StorageError>;

    /// Get a user by username.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;

    /// Create a user with a generated ID.
    async fn create_user(&self, username: &str, name: &str) -> Result<User, StorageError>;

    /// Get a session by ID.
    async fn get(&self, id: SessionId) -> Result<Option<WorkSession>, StorageError>;

    /// Get the open session of a user, if any.
    async fn get_active(&self, user_id: &str) -> Result<Option<WorkSession>, StorageError>;

    /// Open a session for `user_id`.
    ///
    /// Fails with [`StorageError::AlreadyActive`] when the user already has an
    /// open session; the check and the insert are a single atomic step.
    async fn create(
        &self,
        user_id: &str,
        clock_in_time: DateTime<Utc>,
    ) -> Result<WorkSession, StorageError>;

    /// Close a session by ID.
    async fn close(
        &self,
        id: SessionId,
        clock_out_time: DateTime<Utc>,
    ) -> Result<WorkSession, StorageError>;

    /// Close the open session of `user_id`, if any, as one atomic step.
    async fn close_active(
        &self,
        user_id: &str,
        clock_out_time: DateTime<Utc>,
    ) -> Result<Option<WorkSession>, StorageError>;

    /// List sessions with optional filter.
    async fn list(&self, filter: SessionFilter) -> Result<Vec<WorkSession>, StorageError>;

    /// The `limit` most recent sessions of a user, newest first.
    async fn list_sessions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<WorkSession>, StorageError> {
        self.list(SessionFilter {
            order: SortOrder::Descending,
            limit: Some(limit),
            ..SessionFilter::for_user(user_id)
        })
        .await
    }

    /// Sessions of a user clocked in on calendar day `date`, oldest first.
    async fn list_sessions_for_date(
        &self,
        user_id: &str,
        date: NaiveDate,
        offset: FixedOffset,
    ) -> Result<Vec<WorkSession>, StorageError> {
        let (start, end) = day_window(date, offset);
        self.list(SessionFilter {
            clocked_in_from: Some(start),
            clocked_in_before: Some(end),
            order: SortOrder::Ascending,
            ..SessionFilter::for_user(user_id)
        })
        .await
    }
}

/// Chat provider error.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Malformed response: {0}")]
    Decode(String),
}

/// Trait for chat completion backends.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Complete a single-turn conversation.
    ///
    /// Returns `None` when the provider answered without any text.
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<Option<String>, ChatError>;
}
