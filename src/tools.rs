//! Tool registry and execution seam.
//!
//! Models request tool invocations as [`ToolCall`]s riding on chat messages;
//! the registry resolves each call by name and always hands back a
//! [`ToolOutcome`] carrying the call's id, so failures flow to the model as
//! content instead of aborting the surrounding flow.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::ToolCall;

/// Description of a tool as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object.
    pub parameters: serde_json::Value,
}

impl ToolSchema {
    /// Create a schema; `parameters` should be a JSON Schema object.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Failures raised by tool lookup or execution.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    Unknown(String),

    #[error("invalid arguments: {0}")]
    InvalidArgs(#[from] serde_json::Error),

    #[error("tool execution failed: {0}")]
    Execution(String),
}

impl ToolError {
    /// Create an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }
}

/// Result of one tool call, correlated by the call's id.
///
/// Errors are carried as flagged content so the conversation can continue;
/// downstream processors decide whether an errored outcome matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub id: String,
    pub content: String,
    pub is_error: bool,
}

impl ToolOutcome {
    /// A successful outcome.
    pub fn ok(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// A failed outcome; `content` describes the failure.
    pub fn error(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            is_error: true,
        }
    }
}

/// An invocable tool.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The schema advertised to the model.
    fn schema(&self) -> ToolSchema;

    /// Run the tool against a JSON arguments object.
    async fn invoke(&self, args: serde_json::Value) -> Result<String, ToolError>;
}

/// Shared handle to a tool.
pub type DynTool = Arc<dyn Tool>;

/// Lifts a plain function into a [`Tool`].
///
/// ```
/// use cogflow::tools::{FnTool, Tool, ToolError};
/// use serde_json::json;
///
/// let adder = FnTool::new(
///     "add",
///     "Add two integers",
///     json!({"type": "object", "properties": {"a": {"type": "integer"}, "b": {"type": "integer"}}}),
///     |args| {
///         let a = args["a"].as_i64().unwrap_or(0);
///         let b = args["b"].as_i64().unwrap_or(0);
///         Ok((a + b).to_string())
///     },
/// );
/// assert_eq!(adder.schema().name, "add");
/// ```
pub struct FnTool<F> {
    schema: ToolSchema,
    handler: F,
}

impl<F> FnTool<F>
where
    F: Fn(serde_json::Value) -> Result<String, ToolError> + Send + Sync,
{
    /// Wrap `handler` with the given schema.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
        handler: F,
    ) -> Self {
        Self {
            schema: ToolSchema::new(name, description, parameters),
            handler,
        }
    }
}

#[async_trait]
impl<F> Tool for FnTool<F>
where
    F: Fn(serde_json::Value) -> Result<String, ToolError> + Send + Sync,
{
    fn schema(&self) -> ToolSchema {
        self.schema.clone()
    }

    async fn invoke(&self, args: serde_json::Value) -> Result<String, ToolError> {
        (self.handler)(args)
    }
}

/// Name-indexed collection of tools.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, DynTool>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its schema name, replacing any previous entry.
    pub fn register(&mut self, tool: DynTool) {
        let name = tool.schema().name;
        self.tools.insert(name, tool);
    }

    /// Register several tools at once.
    pub fn register_all(&mut self, tools: Vec<DynTool>) {
        for tool in tools {
            self.register(tool);
        }
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&DynTool> {
        self.tools.get(name)
    }

    /// Schemas of every registered tool, for embedding in a request.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    /// Registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Whether a tool with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute one call, converting every failure into an error-flagged
    /// outcome under the call's id.
    pub async fn execute_call(&self, call: &ToolCall) -> ToolOutcome {
        let Some(tool) = self.get(&call.name) else {
            return ToolOutcome::error(&call.id, ToolError::Unknown(call.name.clone()).to_string());
        };
        match tool.invoke(call.args.clone()).await {
            Ok(content) => ToolOutcome::ok(&call.id, content),
            Err(error) => {
                tracing::warn!(tool = %call.name, %error, "tool call failed");
                ToolOutcome::error(&call.id, error.to_string())
            }
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}
