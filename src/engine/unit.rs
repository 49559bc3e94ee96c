//! Unit: a stage that drives one processor with retry, fallback and a
//! bounded worker pool.
//!
//! A unit run is one tick of the three-phase contract: prepare a batch,
//! fan the batch out across worker tasks with per-item retry, then finalize.
//! Results stay index-aligned with the prepared items no matter in which
//! order workers finish, and no error ever escapes a run; the only signal a
//! unit emits is the action its processor's `finalize` returns.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::action::Action;
use super::processor::Processor;
use super::stage::{SharedStage, Stage};

/// A computation unit wrapping a [`Processor`] with a retry budget, a worker
/// pool and an action-keyed successor table.
///
/// `max_retries` counts retries, so each item gets `max_retries + 1` attempts
/// before its fallback result is taken. `workers` is clamped to at least one
/// and, at run time, to the batch size.
///
/// # Example
///
/// ```ignore
/// let unit = Arc::new(Unit::new(MyProcessor::default(), 2, 8));
/// unit.add_successor(Some(unit.clone()), Some(Action::CONTINUE));
/// let action = Graph::new(unit).run(&mut state).await;
/// ```
pub struct Unit<P: Processor> {
    processor: Arc<P>,
    max_retries: usize,
    workers: usize,
    successors: RwLock<HashMap<Action, SharedStage<P::State>>>,
}

impl<P: Processor> Unit<P> {
    /// Create a unit around `processor`.
    ///
    /// A `workers` value of zero is treated as one; anything else would
    /// stall the pool.
    pub fn new(processor: P, max_retries: usize, workers: usize) -> Self {
        Self {
            processor: Arc::new(processor),
            max_retries,
            workers: workers.max(1),
            successors: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the retry budget.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Replace the worker count, clamped to at least one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Look up the successor wired for `action`.
    pub fn successor(&self, action: &Action) -> Option<SharedStage<P::State>> {
        self.successors
            .read()
            .expect("successor table lock poisoned")
            .get(action)
            .cloned()
    }

    /// Wire a successor, defaulting the edge label to [`Action::DEFAULT`]
    /// when no action is given. A `None` stage leaves the table untouched.
    pub fn add_successor(
        &self,
        stage: Option<SharedStage<P::State>>,
        action: Option<Action>,
    ) -> Option<SharedStage<P::State>> {
        let stage = stage?;
        let action = action.unwrap_or(Action::DEFAULT);
        self.successors
            .write()
            .expect("successor table lock poisoned")
            .insert(action, stage.clone());
        Some(stage)
    }

    async fn run_batch(&self, state: &mut P::State) -> Action {
        let prep = self.processor.prepare(state);
        if prep.is_empty() {
            return self.processor.finalize(state, Vec::new(), Vec::new());
        }

        let n = prep.len();
        let workers = self.workers.min(n);

        let (prep, results) = if workers == 1 {
            let mut results = Vec::with_capacity(n);
            for item in &prep {
                results.push(run_attempts(self.processor.as_ref(), item, self.max_retries).await);
            }
            (prep, results)
        } else {
            fan_out(Arc::clone(&self.processor), prep, workers, self.max_retries).await
        };

        self.processor.finalize(state, prep, results)
    }
}

/// Execute one item with up to `max_retries + 1` attempts, falling back on
/// the final error when every attempt has failed.
async fn run_attempts<P: Processor>(
    processor: &P,
    item: &P::Item,
    max_retries: usize,
) -> P::Output {
    for attempt in 0..max_retries {
        match processor.execute(item).await {
            Ok(output) => return output,
            Err(error) => {
                tracing::warn!(attempt, %error, "item execution failed; retrying");
            }
        }
    }
    match processor.execute(item).await {
        Ok(output) => output,
        Err(error) => {
            tracing::warn!(%error, "item execution exhausted its attempts; using fallback");
            processor.fallback(error)
        }
    }
}

/// Drain a batch through a pool of worker tasks.
///
/// Workers pull `(index, item)` pairs from a shared queue until it is empty,
/// so the pool self-balances when items take uneven time. Each completed item
/// travels back with its index and both vectors are rebuilt in prep order
/// before `finalize` sees them.
async fn fan_out<P: Processor>(
    processor: Arc<P>,
    prep: Vec<P::Item>,
    workers: usize,
    max_retries: usize,
) -> (Vec<P::Item>, Vec<P::Output>) {
    let n = prep.len();
    let queue: Arc<Mutex<VecDeque<(usize, P::Item)>>> =
        Arc::new(Mutex::new(prep.into_iter().enumerate().collect()));

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let queue = Arc::clone(&queue);
        let processor = Arc::clone(&processor);
        handles.push(tokio::spawn(async move {
            let mut completed = Vec::new();
            loop {
                let next = queue.lock().await.pop_front();
                let Some((pos, item)) = next else { break };
                let output = run_attempts(processor.as_ref(), &item, max_retries).await;
                completed.push((pos, item, output));
            }
            completed
        }));
    }

    let mut completed = Vec::with_capacity(n);
    for handle in handles {
        completed.extend(handle.await.expect("fan-out worker panicked"));
    }
    completed.sort_by_key(|entry| entry.0);

    let mut prep = Vec::with_capacity(n);
    let mut results = Vec::with_capacity(n);
    for (_, item, output) in completed {
        prep.push(item);
        results.push(output);
    }
    (prep, results)
}

#[async_trait]
impl<P: Processor> Stage<P::State> for Unit<P> {
    async fn run(&self, state: &mut P::State) -> Action {
        self.run_batch(state).await
    }

    fn successor(&self, action: &Action) -> Option<SharedStage<P::State>> {
        Unit::successor(self, action)
    }

    fn add_successor(
        &self,
        stage: Option<SharedStage<P::State>>,
        action: Option<Action>,
    ) -> Option<SharedStage<P::State>> {
        Unit::add_successor(self, stage, action)
    }
}
