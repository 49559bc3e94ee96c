//! End-to-end flows through units and graphs: fan-out feeding a downstream
//! stage, interactive self-loops, nested graphs, and mismatch termination.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use cogflow::engine::{Action, Graph, Processor, SharedStage, Stage, Unit};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct FlowError(String);

#[derive(Default)]
struct FlowState {
    pending: Vec<String>,
    harvested: Vec<String>,
    log: Vec<String>,
    ticks: usize,
}

/// Fans out over `pending`, uppercasing each entry; the entry named in
/// `flaky` fails once before succeeding.
struct Harvester {
    flaky: Option<String>,
    exec_calls: AtomicUsize,
    flaky_failures: AtomicUsize,
    outcome: Action,
}

impl Harvester {
    fn new() -> Self {
        Self {
            flaky: None,
            exec_calls: AtomicUsize::new(0),
            flaky_failures: AtomicUsize::new(0),
            outcome: Action::CONTINUE,
        }
    }

    fn with_flaky(mut self, item: &str) -> Self {
        self.flaky = Some(item.to_string());
        self
    }

    fn with_outcome(mut self, outcome: Action) -> Self {
        self.outcome = outcome;
        self
    }
}

#[async_trait]
impl Processor for Harvester {
    type State = FlowState;
    type Item = String;
    type Output = String;
    type Error = FlowError;

    fn prepare(&self, state: &mut FlowState) -> Vec<String> {
        std::mem::take(&mut state.pending)
    }

    async fn execute(&self, item: &String) -> Result<String, FlowError> {
        self.exec_calls.fetch_add(1, Ordering::SeqCst);
        if self.flaky.as_deref() == Some(item.as_str())
            && self.flaky_failures.fetch_add(1, Ordering::SeqCst) == 0
        {
            return Err(FlowError(format!("transient failure on {item}")));
        }
        Ok(item.to_uppercase())
    }

    fn fallback(&self, error: FlowError) -> String {
        format!("fallback({error})")
    }

    fn finalize(
        &self,
        state: &mut FlowState,
        _prep: Vec<String>,
        results: Vec<String>,
    ) -> Action {
        state.harvested = results;
        state.log.push("harvester".to_string());
        self.outcome.clone()
    }
}

/// Summarizes whatever the harvester left behind.
struct Reporter;

#[async_trait]
impl Processor for Reporter {
    type State = FlowState;
    type Item = usize;
    type Output = String;
    type Error = FlowError;

    fn prepare(&self, state: &mut FlowState) -> Vec<usize> {
        vec![state.harvested.len()]
    }

    async fn execute(&self, count: &usize) -> Result<String, FlowError> {
        Ok(format!("{count} items harvested"))
    }

    fn fallback(&self, error: FlowError) -> String {
        error.to_string()
    }

    fn finalize(
        &self,
        state: &mut FlowState,
        _prep: Vec<usize>,
        results: Vec<String>,
    ) -> Action {
        state.log.push("reporter".to_string());
        state.log.extend(results);
        Action::SUCCESS
    }
}

/// Counts ticks, continuing until the limit is reached.
struct Ticker {
    limit: usize,
}

#[async_trait]
impl Processor for Ticker {
    type State = FlowState;
    type Item = usize;
    type Output = String;
    type Error = FlowError;

    fn prepare(&self, state: &mut FlowState) -> Vec<usize> {
        vec![state.ticks]
    }

    async fn execute(&self, tick: &usize) -> Result<String, FlowError> {
        Ok(format!("tick {tick}"))
    }

    fn fallback(&self, error: FlowError) -> String {
        error.to_string()
    }

    fn finalize(
        &self,
        state: &mut FlowState,
        _prep: Vec<usize>,
        results: Vec<String>,
    ) -> Action {
        state.log.extend(results);
        state.ticks += 1;
        if state.ticks < self.limit {
            Action::CONTINUE
        } else {
            Action::SUCCESS
        }
    }
}

#[tokio::test]
async fn test_fan_out_feeds_downstream_stage() {
    let harvester = Arc::new(Unit::new(Harvester::new().with_flaky("b"), 1, 3));
    let reporter = Arc::new(Unit::new(Reporter, 0, 1));
    harvester.add_successor(
        Some(reporter as SharedStage<FlowState>),
        Some(Action::CONTINUE),
    );

    let graph = Graph::new(harvester.clone() as SharedStage<FlowState>);
    let mut state = FlowState {
        pending: vec!["a".into(), "b".into(), "c".into()],
        ..FlowState::default()
    };

    let action = graph.run(&mut state).await;

    assert_eq!(action, Action::SUCCESS);
    assert_eq!(state.harvested, vec!["A", "B", "C"]);
    assert_eq!(
        state.log,
        vec!["harvester", "reporter", "3 items harvested"]
    );
}

#[tokio::test]
async fn test_self_loop_ticks_in_order() {
    let ticker = Arc::new(Unit::new(Ticker { limit: 5 }, 0, 1));
    ticker.add_successor(
        Some(ticker.clone() as SharedStage<FlowState>),
        Some(Action::CONTINUE),
    );

    let graph = Graph::new(ticker as SharedStage<FlowState>);
    let mut state = FlowState::default();

    let action = graph.run(&mut state).await;

    assert_eq!(action, Action::SUCCESS);
    assert_eq!(state.ticks, 5);
    assert_eq!(
        state.log,
        vec!["tick 0", "tick 1", "tick 2", "tick 3", "tick 4"]
    );
}

#[tokio::test]
async fn test_nested_graph_runs_inline() {
    // outer: harvester -> inner; inner: ticker then reporter.
    let ticker = Arc::new(Unit::new(Ticker { limit: 1 }, 0, 1));
    let reporter = Arc::new(Unit::new(Reporter, 0, 1));
    ticker.add_successor(
        Some(reporter as SharedStage<FlowState>),
        Some(Action::SUCCESS),
    );
    let inner = Arc::new(Graph::new(ticker as SharedStage<FlowState>));

    let harvester = Arc::new(Unit::new(Harvester::new(), 0, 2));
    harvester.add_successor(
        Some(inner as SharedStage<FlowState>),
        Some(Action::CONTINUE),
    );

    let outer = Graph::new(harvester as SharedStage<FlowState>);
    let mut state = FlowState {
        pending: vec!["x".into(), "y".into()],
        ..FlowState::default()
    };

    let action = outer.run(&mut state).await;

    assert_eq!(action, Action::SUCCESS);
    assert_eq!(state.log[0], "harvester");
    assert_eq!(state.log[1], "tick 0");
    assert_eq!(state.log[2], "reporter");
}

#[tokio::test]
async fn test_unwired_failure_stops_the_flow() {
    let harvester = Arc::new(Unit::new(
        Harvester::new().with_outcome(Action::FAILURE),
        0,
        1,
    ));
    let reporter = Arc::new(Unit::new(Reporter, 0, 1));
    harvester.add_successor(
        Some(reporter as SharedStage<FlowState>),
        Some(Action::CONTINUE),
    );

    let graph = Graph::new(harvester as SharedStage<FlowState>);
    let mut state = FlowState {
        pending: vec!["only".into()],
        ..FlowState::default()
    };

    let action = graph.run(&mut state).await;

    assert_eq!(action, Action::FAILURE);
    assert_eq!(state.log, vec!["harvester"]);
}

#[tokio::test]
async fn test_caller_state_survives_the_traversal() {
    let ticker = Arc::new(Unit::new(Ticker { limit: 2 }, 0, 1));
    ticker.add_successor(
        Some(ticker.clone() as SharedStage<FlowState>),
        Some(Action::CONTINUE),
    );

    let graph = Graph::new(ticker as SharedStage<FlowState>);
    let mut state = FlowState {
        log: vec!["preexisting".into()],
        ..FlowState::default()
    };

    graph.run(&mut state).await;

    // The same value the caller handed in carries both its old contents and
    // every mutation the stages made.
    assert_eq!(state.log, vec!["preexisting", "tick 0", "tick 1"]);
    assert_eq!(state.ticks, 2);
}

#[tokio::test]
async fn test_flow_level_edge_catches_retry() {
    // The harvester reports retry; nothing is wired on the unit itself, but
    // the graph routes retry back to a second harvester pass.
    let first = Arc::new(Unit::new(
        Harvester::new().with_outcome(Action::RETRY),
        0,
        1,
    ));
    let second = Arc::new(Unit::new(Reporter, 0, 1));

    let graph = Graph::new(first as SharedStage<FlowState>);
    graph.add_successor(
        Some(second as SharedStage<FlowState>),
        Some(Action::RETRY),
    );

    let mut state = FlowState {
        pending: vec!["a".into()],
        ..FlowState::default()
    };
    let action = graph.run(&mut state).await;

    assert_eq!(action, Action::SUCCESS);
    assert_eq!(state.log[0], "harvester");
    assert_eq!(state.log[1], "reporter");
}
