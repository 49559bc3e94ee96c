//! A scripted provider for tests and demos.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::tools::ToolSchema;

use super::message::Message;
use super::provider::{ChatProvider, ChatResponse, LlmError, TokenUsage};

/// Replays a fixed list of responses, cycling when it runs out.
///
/// Optionally fails the first `fail_first` calls with a transport error,
/// which is how the retry and fallback paths get exercised without a real
/// back-end.
pub struct MockProvider {
    name: String,
    responses: Vec<String>,
    fail_first: usize,
    calls: AtomicUsize,
}

impl MockProvider {
    /// Create a provider that replays `responses` in order.
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: "mock".to_string(),
            responses: responses.into_iter().map(Into::into).collect(),
            fail_first: 0,
            calls: AtomicUsize::new(0),
        }
    }

    /// Rename the provider (shows up in logs and provider errors).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Fail the first `count` calls with a transport error before the
    /// scripted responses start flowing.
    pub fn failing_first(mut self, count: usize) -> Self {
        self.fail_first = count;
        self
    }

    /// Number of `generate` calls so far, failures included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn generate(
        &self,
        messages: &[Message],
        _tools: &[ToolSchema],
    ) -> Result<ChatResponse, LlmError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        if call < self.fail_first {
            return Err(LlmError::transport("scripted transport failure"));
        }
        if self.responses.is_empty() {
            return Err(LlmError::config("no responses configured"));
        }

        let scripted = call - self.fail_first;
        let content = &self.responses[scripted % self.responses.len()];
        let prompt_len: usize = messages.iter().map(|m| m.content.len()).sum();

        Ok(ChatResponse::new(Message::assistant(content))
            .with_usage(TokenUsage::new(prompt_len as u64 / 4, content.len() as u64 / 4)))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn default_model(&self) -> &str {
        "mock-chat-v1"
    }
}
