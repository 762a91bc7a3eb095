//! Wire protocol for client-server communication.
//!
//! Domain records (`User`, `WorkSession`, `WorkStatus`) are sent as-is; this
//! module holds the request and reply bodies that only exist on the wire.

use serde::{Deserialize, Serialize};

/// Default number of sessions returned by the history route.
pub const DEFAULT_SESSIONS_LIMIT: usize = 10;

/// Query string of `GET /api/work-sessions`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SessionsQuery {
    pub limit: Option<usize>,
}

impl SessionsQuery {
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_SESSIONS_LIMIT)
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    /// The message, unless missing or blank.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

/// Reply of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// Error body.
///
/// Time-tracking routes answer `{"message": ...}`, the chat route answers
/// `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            error: None,
        }
    }

    #[must_use]
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            message: None,
            error: Some(error.into()),
        }
    }
}
