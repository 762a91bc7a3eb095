//! Time clock for clocking one user in and out.

use std::sync::Arc;

use chrono::NaiveDate;
use timeclock_core::{
    Clock,
    model::{User, UserId, WorkSession, WorkStatus},
    traits::{SessionStorage, StorageError},
};

/// Default number of sessions returned by [`TimeClock::recent_sessions`].
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Time clock error.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    #[error("Storage error: {0}")]
    Storage(StorageError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidState(String),
}

impl From<StorageError> for ClockError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AlreadyActive(_) => Self::InvalidState("Already clocked in".to_string()),
            StorageError::UserNotFound(_) => Self::NotFound("User not found".to_string()),
            StorageError::SessionNotFound(_) => Self::NotFound("Work session not found".to_string()),
            other @ StorageError::Internal(_) => Self::Storage(other),
        }
    }
}

/// Clocks a single user in and out against a session store.
///
/// Owns its storage; share it behind an `Arc` for the lifetime of the server.
pub struct TimeClock<S>
where
    S: SessionStorage,
{
    storage: S,
    clock: Arc<dyn Clock>,
    user_id: UserId,
}

impl<S> TimeClock<S>
where
    S: SessionStorage,
{
    /// Create a new time clock acting as `user_id`.
    #[must_use]
    pub fn new(storage: S, clock: Arc<dyn Clock>, user_id: impl Into<UserId>) -> Self {
        Self {
            storage,
            clock,
            user_id: user_id.into(),
        }
    }

    /// The underlying store.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Id of the user this clock acts as.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Get the current user.
    ///
    /// # Errors
    /// Returns `NotFound` if the user does not exist.
    pub async fn user(&self) -> Result<User, ClockError> {
        self.storage
            .get_user(&self.user_id)
            .await?
            .ok_or_else(|| ClockError::NotFound("User not found".to_string()))
    }

    /// Get the current work status.
    ///
    /// # Errors
    /// Returns error if the store fails.
    pub async fn status(&self) -> Result<WorkStatus, ClockError> {
        Ok(self.storage.get_active(&self.user_id).await?.into())
    }

    /// Open a work session stamped with the current time.
    ///
    /// # Errors
    /// Returns `InvalidState` if the user is already clocked in.
    pub async fn clock_in(&self) -> Result<WorkSession, ClockError> {
        let session = self.storage.create(&self.user_id, self.clock.now()).await?;
        tracing::info!(session_id = %session.id, user_id = %self.user_id, "clocked in");
        Ok(session)
    }

    /// Close the open work session with the current time.
    ///
    /// # Errors
    /// Returns `InvalidState` if the user is not clocked in.
    pub async fn clock_out(&self) -> Result<WorkSession, ClockError> {
        let session = self
            .storage
            .close_active(&self.user_id, self.clock.now())
            .await?
            .ok_or_else(|| ClockError::InvalidState("No active work session".to_string()))?;
        tracing::info!(session_id = %session.id, user_id = %self.user_id, "clocked out");
        Ok(session)
    }

    /// The `limit` most recent sessions, newest first.
    ///
    /// # Errors
    /// Returns error if the store fails.
    pub async fn recent_sessions(&self, limit: usize) -> Result<Vec<WorkSession>, ClockError> {
        Ok(self.storage.list_sessions(&self.user_id, limit).await?)
    }

    /// Sessions clocked in on `date`, oldest first.
    ///
    /// # Errors
    /// Returns error if the store fails.
    pub async fn sessions_for_date(&self, date: NaiveDate) -> Result<Vec<WorkSession>, ClockError> {
        Ok(self
            .storage
            .list_sessions_for_date(&self.user_id, date, self.clock.offset())
            .await?)
    }

    /// Sessions clocked in today, oldest first.
    ///
    /// # Errors
    /// Returns error if the store fails.
    pub async fn sessions_today(&self) -> Result<Vec<WorkSession>, ClockError> {
        self.sessions_for_date(self.clock.today()).await
    }
}
