//! The runnable-stage abstraction shared by units and graphs.
//!
//! Anything that can run against a shared state and report an action is a
//! stage, and stages are what successor tables point at. Both
//! [`Unit`](crate::engine::Unit) and [`Graph`](crate::engine::Graph)
//! implement this trait, which is what lets graphs nest inside graphs.

use std::sync::Arc;

use async_trait::async_trait;

use super::action::Action;

/// Shared handle to a stage, as stored in successor tables.
pub type SharedStage<S> = Arc<dyn Stage<S>>;

/// A runnable stage over a shared state `S`.
///
/// The state is borrowed mutably for the duration of a run: the same value is
/// observed by every stage in a traversal and by the caller afterwards.
/// Successor tables are interior-mutable so stages can be wired after they
/// are shared, including to themselves (self-loops are an ordinary pattern,
/// not an error).
#[async_trait]
pub trait Stage<S: Send>: Send + Sync {
    /// Run the stage against the shared state and report the outcome.
    async fn run(&self, state: &mut S) -> Action;

    /// Look up the successor wired for `action`, if any.
    ///
    /// A miss is a miss: there is no implicit fall-through to
    /// [`Action::DEFAULT`]. Default routing is something a caller wires
    /// explicitly by omitting the action when adding a successor.
    fn successor(&self, action: &Action) -> Option<SharedStage<S>>;

    /// Wire `stage` as the successor for `action`, returning the stage so
    /// wiring calls can be chained.
    ///
    /// Passing `None` for the stage is a no-op. When the action is omitted
    /// the edge is stored under a type-specific default label (see the unit
    /// and graph documentation). An existing edge for the same action is
    /// overwritten.
    fn add_successor(
        &self,
        stage: Option<SharedStage<S>>,
        action: Option<Action>,
    ) -> Option<SharedStage<S>>;
}
