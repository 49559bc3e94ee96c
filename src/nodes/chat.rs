//! A conversational processor that drives a chat provider.
//!
//! Each tick consumes one queued user input: prepare snapshots the
//! transcript with the new input appended, execute asks the provider for a
//! reply, and finalize appends the reply and keeps the loop going while
//! input remains. Wired to itself on [`Action::CONTINUE`], the unit becomes
//! an interactive loop.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::engine::{Action, Graph, Processor, SharedStage, Unit};
use crate::llm::{ChatProvider, LlmError, Message};

/// Conversation state threaded through a chat flow.
#[derive(Default)]
pub struct ChatState {
    /// Full conversation so far, system prompt included.
    pub transcript: Vec<Message>,
    /// User inputs waiting to be consumed, one per tick.
    pub queued: VecDeque<String>,
    /// Completed ticks.
    pub turns: usize,
    /// When the last assistant reply landed.
    pub last_reply_at: Option<DateTime<Utc>>,
}

impl ChatState {
    /// Fresh state with an optional system prompt.
    pub fn new(system_prompt: Option<&str>) -> Self {
        let mut state = Self::default();
        if let Some(prompt) = system_prompt {
            state.transcript.push(Message::system(prompt));
        }
        state
    }

    /// Queue user inputs to be consumed in order.
    pub fn with_queued<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.queued.extend(inputs.into_iter().map(Into::into));
        self
    }

    /// Queue one more user input.
    pub fn queue(&mut self, input: impl Into<String>) {
        self.queued.push_back(input.into());
    }

    /// The most recent assistant reply, if any.
    pub fn last_reply(&self) -> Option<&Message> {
        self.transcript
            .iter()
            .rev()
            .find(|m| m.role == crate::llm::Role::Assistant)
    }
}

/// One tick of conversation: the transcript snapshot to send.
pub struct ChatTurn {
    pub messages: Vec<Message>,
}

/// Processor generating one assistant reply per queued user input.
pub struct ChatProcessor {
    provider: Arc<dyn ChatProvider>,
}

impl ChatProcessor {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Processor for ChatProcessor {
    type State = ChatState;
    type Item = ChatTurn;
    type Output = Message;
    type Error = LlmError;

    fn prepare(&self, state: &mut ChatState) -> Vec<ChatTurn> {
        let Some(input) = state.queued.pop_front() else {
            return Vec::new();
        };
        state.transcript.push(Message::user(input));
        vec![ChatTurn {
            messages: state.transcript.clone(),
        }]
    }

    async fn execute(&self, turn: &ChatTurn) -> Result<Message, LlmError> {
        let response = self.provider.generate(&turn.messages, &[]).await?;
        Ok(response.message)
    }

    fn fallback(&self, error: LlmError) -> Message {
        tracing::warn!(%error, "chat generation failed after retries");
        Message::assistant("I ran into a problem generating a reply; please try again.")
    }

    fn finalize(
        &self,
        state: &mut ChatState,
        _prep: Vec<ChatTurn>,
        results: Vec<Message>,
    ) -> Action {
        for reply in results {
            state.transcript.push(reply);
        }
        state.turns += 1;
        state.last_reply_at = Some(Utc::now());

        if state.queued.is_empty() {
            Action::SUCCESS
        } else {
            Action::CONTINUE
        }
    }
}

/// Wire a chat unit into a self-looping graph: the unit re-enters itself on
/// [`Action::CONTINUE`] until the input queue drains.
pub fn chat_loop(provider: Arc<dyn ChatProvider>, max_retries: usize) -> Graph<ChatState> {
    let unit = Arc::new(Unit::new(ChatProcessor::new(provider), max_retries, 1));
    unit.add_successor(
        Some(unit.clone() as SharedStage<ChatState>),
        Some(Action::CONTINUE),
    );
    Graph::new(unit)
}
