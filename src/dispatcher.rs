use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::ToolResult;
use crate::models::message::Message;
use crate::models::tool::ToolCallRequest;
use crate::registry::ToolRegistry;

/// Runs tool calls requested by the model against the registered tools
pub struct Dispatcher<'a> {
    registry: &'a ToolRegistry,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a ToolRegistry) -> Self {
        Self { registry }
    }

    /// Run one tool call and wrap its output in a tool message.
    ///
    /// An unknown tool or malformed arguments are errors. A handler that fails still
    /// produces a tool message, so the model can see the failure and react to it.
    pub fn dispatch(&self, request: &ToolCallRequest) -> ToolResult<Message> {
        let tool = self.registry.resolve(&request.name)?;
        let arguments = tool.schema.parse_arguments(&request.arguments)?;

        debug!(tool = %request.name, id = %request.id, "dispatching tool call");
        let content = match (tool.function)(&arguments) {
            Ok(output) => render_output(output),
            Err(e) => {
                warn!(tool = %request.name, id = %request.id, error = %e, "tool reported a failure");
                format!("Error: {:#}", e)
            }
        };

        Ok(Message::tool(&request.id, &request.name, content))
    }
}

/// Text is passed through as is, anything else is sent as compact JSON
fn render_output(output: Value) -> String {
    match output {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
