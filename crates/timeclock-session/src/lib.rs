//! Work session storage and orchestration.
//!
//! Provides:
//! - `TimeClock` - Clock in and out on behalf of one user
//! - Storage implementations (memory)

pub mod manager;
pub mod storage;

pub use manager::{ClockError, TimeClock};
