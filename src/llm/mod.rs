//! Chat provider abstractions.
//!
//! The engine never talks to a model; processors do, through the
//! [`ChatProvider`] seam defined here. The module ships the message types,
//! the provider trait and error, a scripted [`MockProvider`] for tests and
//! demos, and the [`Throttled`] pacing wrapper for providers with rate
//! limits.

pub mod message;
pub mod mock;
pub mod provider;
pub mod throttle;

pub use message::{Message, Role, ToolCall};
pub use mock::MockProvider;
pub use provider::{ChatProvider, ChatResponse, LlmError, TokenUsage};
pub use throttle::Throttled;
