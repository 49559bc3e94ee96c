//! cogflow: a minimalist workflow engine.
//!
//! Applications are composed as directed graphs of computation units. A
//! [`Unit`] wraps a [`Processor`] — user logic split into prepare, execute
//! and finalize phases — with a retry budget, a fallback path and a bounded
//! worker pool. A [`Graph`] traverses stages by the [`Action`] each one
//! returns, threading one mutable state value through the whole walk. Both
//! implement [`Stage`], so graphs nest inside graphs and any stage can loop
//! back to itself.
//!
//! The engine is the substrate; the rest of the crate is the toolkit that
//! agent-style applications usually need around it: a chat-provider seam
//! with a scripted mock and a pacing wrapper ([`llm`]), a tool registry
//! ([`tools`]), structured-reply extraction ([`structured`]), prompt
//! synthesis ([`prompt`]) and ready-made conversational/extraction
//! processors ([`nodes`]). The engine depends on none of them.
//!
//! # A minimal flow
//!
//! ```ignore
//! use std::sync::Arc;
//! use cogflow::{Action, Graph, Stage, Unit};
//!
//! let step = Arc::new(Unit::new(MyProcessor::default(), 2, 8));
//! step.add_successor(Some(step.clone()), Some(Action::CONTINUE));
//!
//! let graph = Graph::new(step);
//! let mut state = MyState::default();
//! let last = graph.run(&mut state).await;
//! assert_eq!(last, Action::SUCCESS);
//! ```

pub mod config;
pub mod engine;
pub mod llm;
pub mod nodes;
pub mod prompt;
pub mod structured;
pub mod tools;

pub use config::AppConfig;
pub use engine::{Action, Graph, Processor, SharedStage, Stage, Unit};
