//! The provider-agnostic chat generation seam.
//!
//! Processors talk to a model back-end through [`ChatProvider`]; the engine
//! itself never does. Implementations bridge to a hosted API, a local
//! runtime, or the scripted [`MockProvider`](crate::llm::MockProvider) used
//! throughout the test suite.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tools::ToolSchema;

use super::message::Message;

/// Token counts reported by a provider for one completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Create a usage record with the total derived from the parts.
    pub fn new(input: u64, output: u64) -> Self {
        Self {
            input_tokens: input,
            output_tokens: output,
            total_tokens: input + output,
        }
    }
}

impl std::ops::Add for TokenUsage {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            input_tokens: self.input_tokens + other.input_tokens,
            output_tokens: self.output_tokens + other.output_tokens,
            total_tokens: self.total_tokens + other.total_tokens,
        }
    }
}

/// A completed generation: the assistant's message plus optional usage.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub message: Message,
    pub usage: Option<TokenUsage>,
}

impl ChatResponse {
    /// Wrap a message with no usage information.
    pub fn new(message: Message) -> Self {
        Self {
            message,
            usage: None,
        }
    }

    /// Attach usage statistics.
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Failures crossing the provider boundary.
///
/// Malformed *content* is deliberately not represented here; a reply that
/// arrives but cannot be parsed is an
/// [`ExtractError`](crate::structured::ExtractError), so callers can tell a
/// broken transport from a model that answered badly.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The request never completed (network, timeout, process death).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The provider answered with an error of its own.
    #[error("provider {provider} rejected the request: {message}")]
    Provider { provider: String, message: String },

    /// The provider was constructed or configured incorrectly.
    #[error("invalid provider configuration: {0}")]
    Config(String),
}

impl LlmError {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a provider-side error.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// A chat generation back-end.
///
/// `generate` receives the full conversation and the schemas of tools the
/// model may call; tool calls come back embedded in the response message.
/// Rate limiting is a provider concern (see
/// [`Throttled`](crate::llm::Throttled)), never an engine concern.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Generate the next assistant message for a conversation.
    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
    ) -> Result<ChatResponse, LlmError>;

    /// Provider name, for logging.
    fn name(&self) -> &str;

    /// Default model identifier for this provider.
    fn default_model(&self) -> &str;
}
