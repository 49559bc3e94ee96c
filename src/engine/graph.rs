//! Graph: action-routed traversal over composed stages.
//!
//! A graph holds a start stage and a flow-level successor table. Running it
//! walks stage to stage: each stage runs against the shared state, its action
//! is resolved first against the stage's own successors and then against the
//! graph's, and the walk ends when neither table has an edge for the action.
//! Because a graph is itself a stage, graphs nest inside graphs.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::action::Action;
use super::stage::{SharedStage, Stage};

/// A composite stage that traverses other stages by action.
///
/// Cycles are legal and intentionally undetected: wiring a stage back to
/// itself is the ordinary shape of an interactive loop or a retry edge, and
/// such a traversal ends when some stage returns an action nobody wired.
///
/// # Example
///
/// ```ignore
/// let step = Arc::new(Unit::new(MyProcessor::default(), 1, 1));
/// step.add_successor(Some(step.clone()), Some(Action::CONTINUE));
///
/// let graph = Graph::new(step);
/// let last = graph.run(&mut state).await;
/// ```
pub struct Graph<S> {
    start: Option<SharedStage<S>>,
    successors: RwLock<HashMap<Action, SharedStage<S>>>,
}

impl<S: Send> Graph<S> {
    /// Create a graph that starts at `start`.
    pub fn new(start: SharedStage<S>) -> Self {
        Self {
            start: Some(start),
            successors: RwLock::new(HashMap::new()),
        }
    }

    /// Create a graph with no start stage.
    ///
    /// Running it reports [`Action::FAILURE`] without touching any
    /// processor; a missing start is a wiring defect, not a crash.
    pub fn empty() -> Self {
        Self {
            start: None,
            successors: RwLock::new(HashMap::new()),
        }
    }

    /// Look up the flow-level successor wired for `action`.
    pub fn successor(&self, action: &Action) -> Option<SharedStage<S>> {
        self.successors
            .read()
            .expect("successor table lock poisoned")
            .get(action)
            .cloned()
    }

    /// Wire a flow-level successor, defaulting the edge label to
    /// [`Action::SUCCESS`] when no action is given. A `None` stage leaves
    /// the table untouched, matching the unit's behavior.
    pub fn add_successor(
        &self,
        stage: Option<SharedStage<S>>,
        action: Option<Action>,
    ) -> Option<SharedStage<S>> {
        let stage = stage?;
        let action = action.unwrap_or(Action::SUCCESS);
        self.successors
            .write()
            .expect("successor table lock poisoned")
            .insert(action, stage.clone());
        Some(stage)
    }

    async fn traverse(&self, state: &mut S) -> Action {
        let Some(start) = self.start.clone() else {
            tracing::warn!("graph run with no start stage");
            return Action::FAILURE;
        };

        let mut current = start;
        let mut last = Action::SUCCESS;
        loop {
            let action = current.run(state).await;
            tracing::debug!(action = %action, "stage finished");

            // The stage's own edges take priority over flow-level edges.
            let next = current
                .successor(&action)
                .or_else(|| Graph::successor(self, &action));
            last = action;
            match next {
                Some(stage) => current = stage,
                None => break,
            }
        }
        last
    }
}

#[async_trait]
impl<S: Send> Stage<S> for Graph<S> {
    async fn run(&self, state: &mut S) -> Action {
        self.traverse(state).await
    }

    fn successor(&self, action: &Action) -> Option<SharedStage<S>> {
        Graph::successor(self, action)
    }

    fn add_successor(
        &self,
        stage: Option<SharedStage<S>>,
        action: Option<Action>,
    ) -> Option<SharedStage<S>> {
        Graph::add_successor(self, stage, action)
    }
}
