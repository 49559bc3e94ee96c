//! A structured-output processor: prompt, generate, parse, retry.
//!
//! The processor asks a provider for a payload matching a declared schema
//! and parses the reply into a typed value. Transport failures are absorbed
//! by the unit's retry/fallback; a reply that *arrives* but cannot be parsed
//! is a flow-level problem, reported as [`Action::RETRY`] with the parse
//! error recorded in state so the next prompt can steer the model, and as
//! [`Action::FAILURE`] once the state-held attempt budget runs out.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::engine::{Action, Graph, Processor, SharedStage, Unit};
use crate::llm::{ChatProvider, LlmError, Message};
use crate::prompt::SchemaPrompt;
use crate::structured::extract_structured;

/// State of one extraction flow.
pub struct ExtractState<T> {
    /// Raw data handed to the model.
    pub input: String,
    /// The typed value once a reply parses.
    pub parsed: Option<T>,
    /// Parse attempts spent so far.
    pub attempts: usize,
    /// Parse attempts allowed before giving up.
    pub max_attempts: usize,
    /// Parse error from the most recent attempt.
    pub last_error: Option<String>,
}

impl<T> ExtractState<T> {
    pub fn new(input: impl Into<String>, max_attempts: usize) -> Self {
        Self {
            input: input.into(),
            parsed: None,
            attempts: 0,
            max_attempts: max_attempts.max(1),
            last_error: None,
        }
    }
}

/// Processor extracting a `T` from free-form input via a provider.
pub struct ExtractProcessor<T> {
    provider: Arc<dyn ChatProvider>,
    schema: SchemaPrompt,
    _target: PhantomData<fn() -> T>,
}

impl<T> ExtractProcessor<T> {
    pub fn new(provider: Arc<dyn ChatProvider>, schema: SchemaPrompt) -> Self {
        Self {
            provider,
            schema,
            _target: PhantomData,
        }
    }
}

#[async_trait]
impl<T> Processor for ExtractProcessor<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    type State = ExtractState<T>;
    type Item = String;
    type Output = String;
    type Error = LlmError;

    fn prepare(&self, state: &mut ExtractState<T>) -> Vec<String> {
        if state.parsed.is_some() {
            return Vec::new();
        }
        let mut context = Vec::new();
        if let Some(error) = &state.last_error {
            context.push(format!(
                "Your previous reply could not be parsed ({error}). \
                 Answer with only the fenced block this time."
            ));
        }
        vec![self.schema.parsing_prompt(&state.input, &context)]
    }

    async fn execute(&self, prompt: &String) -> Result<String, LlmError> {
        let response = self
            .provider
            .generate(&[Message::user(prompt.clone())], &[])
            .await?;
        Ok(response.message.content)
    }

    fn fallback(&self, error: LlmError) -> String {
        // An empty reply parses as nothing, which finalize reports like any
        // other unusable answer.
        tracing::warn!(%error, "extraction request failed after retries");
        String::new()
    }

    fn finalize(
        &self,
        state: &mut ExtractState<T>,
        _prep: Vec<String>,
        results: Vec<String>,
    ) -> Action {
        if state.parsed.is_some() {
            return Action::SUCCESS;
        }
        let Some(reply) = results.first() else {
            return Action::SUCCESS;
        };

        match extract_structured::<T>(reply) {
            Ok(value) => {
                state.parsed = Some(value);
                state.last_error = None;
                Action::SUCCESS
            }
            Err(error) => {
                state.attempts += 1;
                state.last_error = Some(error.to_string());
                if state.attempts >= state.max_attempts {
                    tracing::warn!(attempts = state.attempts, "extraction attempts exhausted");
                    Action::FAILURE
                } else {
                    Action::RETRY
                }
            }
        }
    }
}

/// Wire an extraction unit into a graph that re-enters itself on
/// [`Action::RETRY`] until the state's attempt budget decides the outcome.
pub fn extraction_loop<T>(
    provider: Arc<dyn ChatProvider>,
    schema: SchemaPrompt,
    max_retries: usize,
) -> Graph<ExtractState<T>>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    let unit = Arc::new(Unit::new(
        ExtractProcessor::<T>::new(provider, schema),
        max_retries,
        1,
    ));
    unit.add_successor(
        Some(unit.clone() as SharedStage<ExtractState<T>>),
        Some(Action::RETRY),
    );
    Graph::new(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Stage;
    use crate::llm::MockProvider;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Contact {
        name: String,
        email: String,
    }

    fn schema() -> SchemaPrompt {
        SchemaPrompt::yaml()
            .field("name", "string", "Full name")
            .field("email", "string", "Email address")
    }

    #[tokio::test]
    async fn test_clean_reply_parses_first_time() {
        let provider = Arc::new(MockProvider::new([
            "```yaml\nname: Ada\nemail: ada@example.com\n```",
        ]));
        let graph = extraction_loop::<Contact>(provider.clone(), schema(), 0);

        let mut state = ExtractState::new("Ada <ada@example.com>", 3);
        let action = graph.run(&mut state).await;

        assert_eq!(action, Action::SUCCESS);
        assert_eq!(state.attempts, 0);
        assert_eq!(
            state.parsed,
            Some(Contact {
                name: "Ada".into(),
                email: "ada@example.com".into()
            })
        );
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_garbled_reply_retries_then_succeeds() {
        let provider = Arc::new(MockProvider::new([
            "Sure! The contact is Ada.",
            "```yaml\nname: Ada\nemail: ada@example.com\n```",
        ]));
        let graph = extraction_loop::<Contact>(provider.clone(), schema(), 0);

        let mut state = ExtractState::new("Ada <ada@example.com>", 3);
        let action = graph.run(&mut state).await;

        assert_eq!(action, Action::SUCCESS);
        assert_eq!(state.attempts, 1);
        assert!(state.parsed.is_some());
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_retry_prompt_carries_parse_feedback() {
        let provider = Arc::new(MockProvider::new(["no structure here at all"]));
        let processor = ExtractProcessor::<Contact>::new(provider, schema());

        let mut state = ExtractState::new("Ada", 5);
        state.last_error = Some("no structured payload found in response".into());

        let prompts = processor.prepare(&mut state);
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("could not be parsed"));
    }

    #[tokio::test]
    async fn test_attempt_budget_exhaustion_fails_the_flow() {
        let provider = Arc::new(MockProvider::new(["still just prose"]));
        let graph = extraction_loop::<Contact>(provider.clone(), schema(), 0);

        let mut state = ExtractState::new("Ada", 2);
        let action = graph.run(&mut state).await;

        assert_eq!(action, Action::FAILURE);
        assert_eq!(state.attempts, 2);
        assert!(state.parsed.is_none());
        assert!(state.last_error.is_some());
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_transport_outage_counts_as_a_parse_attempt() {
        // Retries exhaust inside the unit, fallback produces an empty reply,
        // and the flow-level budget decides what happens next.
        let provider = Arc::new(
            MockProvider::new(["```yaml\nname: Ada\nemail: a@b.c\n```"]).failing_first(2),
        );
        let graph = extraction_loop::<Contact>(provider.clone(), schema(), 1);

        let mut state = ExtractState::new("Ada", 3);
        let action = graph.run(&mut state).await;

        // Tick 1: two transport failures exhaust the unit budget, fallback
        // yields an unusable reply, flow retries. Tick 2: provider recovered.
        assert_eq!(action, Action::SUCCESS);
        assert_eq!(state.attempts, 1);
        assert!(state.parsed.is_some());
        assert_eq!(provider.call_count(), 3);
    }
}
