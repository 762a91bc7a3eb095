//! In-memory work session storage.

use std::{collections::HashMap, sync::RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use timeclock_core::{
    model::{SessionId, User, UserId, WorkSession},
    traits::{SessionFilter, SessionStorage, SortOrder, StorageError},
};
use uuid::Uuid;

/// In-memory storage implementation.
///
/// Useful for development and single-process deployments.
/// Data is lost on restart.
pub struct MemoryStorage {
    users: RwLock<HashMap<UserId, User>>,
    sessions: RwLock<HashMap<SessionId, WorkSession>>,
}

impl MemoryStorage {
    /// Create a new in-memory storage seeded with the default user.
    #[must_use]
    pub fn new() -> Self {
        let default_user = User::default_user();
        let mut users = HashMap::new();
        users.insert(default_user.id.clone(), default_user);

        Self {
            users: RwLock::new(users),
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StorageError {
    StorageError::Internal(e.to_string())
}

fn find_active<'a>(
    sessions: &'a HashMap<SessionId, WorkSession>,
    user_id: &str,
) -> Option<&'a WorkSession> {
    sessions
        .values()
        .find(|s| s.user_id == user_id && s.is_active)
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn get_user(&self, id: &str) -> Result<Option<User>, StorageError> {
        Ok(self.users.read().map_err(poisoned)?.get(id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        Ok(self
            .users
            .read()
            .map_err(poisoned)?
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, username: &str, name: &str) -> Result<User, StorageError> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            name: name.to_string(),
        };

        self.users
            .write()
            .map_err(poisoned)?
            .insert(user.id.clone(), user.clone());

        Ok(user)
    }

    async fn get(&self, id: SessionId) -> Result<Option<WorkSession>, StorageError> {
        Ok(self.sessions.read().map_err(poisoned)?.get(&id).cloned())
    }

    async fn get_active(&self, user_id: &str) -> Result<Option<WorkSession>, StorageError> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        Ok(find_active(&sessions, user_id).cloned())
    }

    async fn create(
        &self,
        user_id: &str,
        clock_in_time: DateTime<Utc>,
    ) -> Result<WorkSession, StorageError> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;

        if find_active(&sessions, user_id).is_some() {
            return Err(StorageError::AlreadyActive(user_id.to_string()));
        }

        let session = WorkSession::open(user_id, clock_in_time);
        sessions.insert(session.id, session.clone());
        tracing::debug!(session_id = %session.id, user_id, "work session opened");

        Ok(session)
    }

    async fn close(
        &self,
        id: SessionId,
        clock_out_time: DateTime<Utc>,
    ) -> Result<WorkSession, StorageError> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;

        let session = sessions
            .get_mut(&id)
            .ok_or(StorageError::SessionNotFound(id))?;

        session.close(clock_out_time);
        tracing::debug!(session_id = %id, "work session closed");

        Ok(session.clone())
    }

    async fn close_active(
        &self,
        user_id: &str,
        clock_out_time: DateTime<Utc>,
    ) -> Result<Option<WorkSession>, StorageError> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;

        let Some(session) = sessions
            .values_mut()
            .find(|s| s.user_id == user_id && s.is_active)
        else {
            return Ok(None);
        };

        session.close(clock_out_time);
        tracing::debug!(session_id = %session.id, user_id, "work session closed");

        Ok(Some(session.clone()))
    }

    async fn list(&self, filter: SessionFilter) -> Result<Vec<WorkSession>, StorageError> {
        let sessions = self.sessions.read().map_err(poisoned)?;

        let mut result: Vec<WorkSession> = sessions
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();

        match filter.order {
            SortOrder::Ascending => result.sort_by(|a, b| a.clock_in_time.cmp(&b.clock_in_time)),
            SortOrder::Descending => result.sort_by(|a, b| b.clock_in_time.cmp(&a.clock_in_time)),
        }

        if let Some(limit) = filter.limit {
            result.truncate(limit);
        }

        Ok(result)
    }
}
