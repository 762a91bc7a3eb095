//! Chat assistant for the time-tracking app.
//!
//! Provides:
//! - OpenAI-compatible chat completion client
//! - `Assistant` with prompt building and fallback replies

pub mod assistant;
pub mod openai;

pub use assistant::{Assistant, work_context};
pub use openai::OpenAiChat;
