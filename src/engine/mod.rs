//! The workflow engine: units, graphs and action-routed traversal.
//!
//! Applications are composed from two kinds of stage:
//!
//! - **Unit**: wraps a [`Processor`] (prepare → execute → finalize) with a
//!   retry budget, a fallback path and a bounded worker pool.
//! - **Graph**: traverses stages by the [`Action`] each one returns, with a
//!   flow-level edge table of its own.
//!
//! ```text
//! ┌──────────────────────── Graph::run ────────────────────────┐
//! │   ┌────────────── Unit::run ──────────────┐                │
//! │   │ prepare ─▶ [items] ─▶ worker pool ─▶  │   action       │
//! │   │              (retry / fallback)       ├──▶ routing ──▶ │
//! │   │ [results] ─▶ finalize ─▶ Action       │   next stage   │
//! │   └───────────────────────────────────────┘                │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! One mutable state value is threaded through the whole traversal: stages
//! run strictly one at a time, so whatever a stage's `finalize` wrote is
//! visible to the next stage without further synchronization. Inside a unit's
//! fan-out only the prepared items travel to worker tasks; shared state never
//! does.
//!
//! Errors never cross a stage boundary. A failing item is retried and then
//! resolved by its processor's fallback; the only failure signal the engine
//! itself produces is [`Action::FAILURE`] from a graph with no start stage.

pub mod action;
pub mod graph;
pub mod processor;
pub mod stage;
pub mod unit;

pub use action::Action;
pub use graph::Graph;
pub use processor::Processor;
pub use stage::{SharedStage, Stage};
pub use unit::Unit;
