use async_trait::async_trait;
use serde_json::Value;

/// A single tool invocation requested by the MCP client.
#[derive(Debug, Clone)]
pub struct ToolCall {
    /// Opaque identifier (forwarded verbatim in the output)
    pub id: String,
    pub name: String,
    /// Parsed JSON arguments
    pub args: Value,
}

/// The result of executing a tool: a single text content block holding the
/// JSON-encoded response envelope.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub call_id: String,
    pub content: String,
    /// True when the tool resolved to a failure envelope.
    pub is_error: bool,
}

impl ToolOutput {
    /// Successful result.
    pub fn ok(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Failure result.  `content` should already be a failure envelope.
    pub fn err(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: true,
        }
    }
}

/// Trait every zilmon tool implements.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON Schema for parameters
    fn parameters_schema(&self) -> Value;
    /// Execute the tool.  Failures are envelopes via [`ToolOutput::err`],
    /// never panics or protocol errors.
    async fn execute(&self, call: &ToolCall) -> ToolOutput;
}
