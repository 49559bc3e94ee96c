//! The three-phase contract a unit of work implements.
//!
//! A processor describes one tick of work: derive a batch of independent
//! items from shared state, execute each item (possibly concurrently, with
//! retries), then reduce the results back into state and pick the next
//! action. The surrounding [`Unit`](crate::engine::Unit) owns scheduling,
//! retry and fallback; processors own only the domain logic.

use async_trait::async_trait;

use super::action::Action;

/// User-supplied logic driven by a [`Unit`](crate::engine::Unit).
///
/// The three phases run in a fixed order on every unit tick:
///
/// 1. [`prepare`](Processor::prepare) derives the batch of work items.
/// 2. [`execute`](Processor::execute) runs once per item, fanned out across
///    the unit's worker pool and retried on failure. When every attempt for
///    an item has failed, [`fallback`](Processor::fallback) produces that
///    item's result instead.
/// 3. [`finalize`](Processor::finalize) reduces the collected results into
///    state and returns the action that routes the enclosing traversal.
///
/// # Phase contracts
///
/// - `prepare` must be deterministic with respect to the state it observes
///   and must return items that are safe to execute in any order. It is never
///   retried. An empty batch is legal and skips straight to `finalize`.
/// - `execute` must be idempotent and stateless across invocations: the unit
///   may call it several times for the same item, concurrently with sibling
///   items. It must not touch shared state; copy what it needs into the item
///   during `prepare`.
/// - `fallback` must be total. It is the graceful-degradation result for an
///   item whose attempts are exhausted, and `finalize` must be able to
///   interpret it.
/// - `finalize` always runs exactly once per tick and must return an action;
///   there is no "no decision" outcome. `results` is index-aligned with
///   `prep`, and both are empty when `prepare` returned no work.
#[async_trait]
pub trait Processor: Send + Sync + 'static {
    /// Shared state threaded through the enclosing traversal.
    type State: Send;

    /// One independent piece of work derived by `prepare`.
    type Item: Send + Sync + 'static;

    /// The result of executing (or falling back on) one item.
    type Output: Send + 'static;

    /// The failure type `execute` signals; absorbed by retry and fallback
    /// inside the unit, never surfaced to the traversal.
    type Error: std::error::Error + Send + 'static;

    /// Derive the batch of work items for this tick.
    ///
    /// Along with `finalize`, this is one of the two phases allowed to
    /// mutate shared state; `execute` runs on worker tasks without access
    /// to it.
    fn prepare(&self, state: &mut Self::State) -> Vec<Self::Item>;

    /// Do the work for one item.
    ///
    /// Errors are reported out; the unit owns the retry budget and the
    /// fallback path, so implementations should not retry internally.
    async fn execute(&self, item: &Self::Item) -> Result<Self::Output, Self::Error>;

    /// Produce a result for an item whose attempts are exhausted.
    ///
    /// Receives the error from the final attempt. Must not fail.
    fn fallback(&self, error: Self::Error) -> Self::Output;

    /// Reduce the batch results into state and choose the next action.
    fn finalize(
        &self,
        state: &mut Self::State,
        prep: Vec<Self::Item>,
        results: Vec<Self::Output>,
    ) -> Action;
}
