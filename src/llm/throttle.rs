//! Minimum-interval pacing for chat providers.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::tools::ToolSchema;

use super::message::Message;
use super::provider::{ChatProvider, ChatResponse, LlmError};

/// Wraps a provider so consecutive requests are at least `interval` apart.
///
/// Callers are serialized through the ticker, so the wrapper also paces a
/// unit's fan-out when worker tasks share one provider. Pacing happens below
/// the engine's retry loop: a retried call waits its turn like any other.
pub struct Throttled<P> {
    inner: P,
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl<P> Throttled<P> {
    /// Pace `inner` to at most one request per `interval`.
    pub fn new(inner: P, interval: Duration) -> Self {
        Self {
            inner,
            interval,
            last_request: Mutex::new(None),
        }
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[async_trait]
impl<P: ChatProvider> ChatProvider for Throttled<P> {
    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
    ) -> Result<ChatResponse, LlmError> {
        self.pace().await;
        self.inner.generate(messages, tools).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn default_model(&self) -> &str {
        self.inner.default_model()
    }
}
