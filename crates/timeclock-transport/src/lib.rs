//! Transport layer for the time clock.
//!
//! Provides:
//! - Wire protocol (JSON)
//! - HTTP API routes (feature: http)

pub mod protocol;

#[cfg(feature = "http")]
pub mod http;

pub use protocol::{ChatReply, ChatRequest, ErrorBody, SessionsQuery};
