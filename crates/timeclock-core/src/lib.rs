//! Core abstractions for work-session time tracking.
//!
//! This crate provides the fundamental building blocks:
//! - `User`, `WorkSession`, `WorkStatus` - Domain records
//! - `Clock` - Injectable time source with calendar-day helpers
//! - Storage and chat provider traits

pub mod clock;
pub mod model;
pub mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use model::{DEFAULT_USER_ID, SessionId, User, UserId, WorkSession, WorkStatus};
pub use traits::{ChatProvider, SessionStorage};
