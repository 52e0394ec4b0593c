use serde::Serialize;
use std::fmt;

use super::tool::ToolCallRequest;
use crate::errors::HistoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };
        f.write_str(name)
    }
}

/// A single entry of the conversation history
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Option<String>,
    /// Tool calls requested by an assistant message
    pub tool_calls: Vec<ToolCallRequest>,
    /// The call a tool message answers
    pub tool_call_id: Option<String>,
    /// The tool that produced a tool message
    pub name: Option<String>,
}

impl Message {
    fn new(role: Role, content: Option<String>) -> Self {
        Self {
            role,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
        }
    }

    pub fn system<S: Into<String>>(text: S) -> Self {
        Self::new(Role::System, Some(text.into()))
    }

    pub fn user<S: Into<String>>(text: S) -> Self {
        Self::new(Role::User, Some(text.into()))
    }

    pub fn assistant<S: Into<String>>(text: S) -> Self {
        Self::new(Role::Assistant, Some(text.into()))
    }

    /// An assistant message that asks for tools to be run, with optional accompanying text
    pub fn assistant_with_tool_calls(text: Option<String>, tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls,
            ..Self::new(Role::Assistant, text)
        }
    }

    /// The result of running a tool, answering the call with the given id
    pub fn tool<I, N, C>(tool_call_id: I, name: N, content: C) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        C: Into<String>,
    {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
            ..Self::new(Role::Tool, Some(content.into()))
        }
    }

    /// The text of the message, empty when there is none
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Check the structure a message of this role must have
    pub fn validate(&self) -> Result<(), HistoryError> {
        let malformed = |reason: &str| HistoryError::Malformed {
            role: self.role.to_string(),
            reason: reason.to_string(),
        };

        if self.role != Role::Assistant && self.has_tool_calls() {
            return Err(malformed("only assistant messages may request tools"));
        }
        if self.role != Role::Tool && self.tool_call_id.is_some() {
            return Err(malformed("only tool messages may carry a tool call id"));
        }

        match self.role {
            Role::System | Role::User => {
                if self.content.is_none() {
                    return Err(malformed("content is required"));
                }
            }
            Role::Assistant => {}
            Role::Tool => {
                if self.tool_call_id.as_deref().map_or(true, str::is_empty) {
                    return Err(malformed("a tool call id is required"));
                }
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> String {
        let calls: Vec<String> = self
            .tool_calls
            .iter()
            .map(|call| format!("tool_call:{}:{}", call.id, call.name))
            .collect();
        format!("message:{}\n{}\n{}", self.role, self.text(), calls.join("\n"))
    }
}
