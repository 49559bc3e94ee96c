//! Ready-made processors built on the engine.
//!
//! These are ordinary [`Processor`](crate::engine::Processor)
//! implementations, shipped both for direct use and as worked examples of
//! the engine's conventions: the chat node shows the self-loop pattern, and
//! the extraction node shows retry-action flow control with state-held
//! budgets.

pub mod chat;
pub mod extract;

pub use chat::{chat_loop, ChatProcessor, ChatState, ChatTurn};
pub use extract::{extraction_loop, ExtractProcessor, ExtractState};
