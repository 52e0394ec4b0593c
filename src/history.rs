use std::collections::HashSet;

use crate::errors::HistoryError;
use crate::models::message::{Message, Role};
use crate::models::tool::ToolCallRequest;

/// The append-only conversation log, resent in full on every model query
#[derive(Debug, Clone, Default)]
pub struct History {
    messages: Vec<Message>,
}

impl History {
    /// Start a history seeded with the system prompt
    pub fn new<S: Into<String>>(system_prompt: S) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    /// Append a message after checking its structure.
    ///
    /// A tool message must answer one of the calls still pending from the latest assistant message.
    pub fn append(&mut self, message: Message) -> Result<(), HistoryError> {
        message.validate()?;

        if let Some(call_id) = message.tool_call_id.as_deref() {
            if !self.unanswered_calls().iter().any(|call| call.id == call_id) {
                return Err(HistoryError::UnmatchedToolResult(call_id.to_string()));
            }
        }

        self.messages.push(message);
        Ok(())
    }

    /// A copy of every message in order
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Tool calls of the latest assistant message that no tool message has answered yet
    pub fn unanswered_calls(&self) -> Vec<ToolCallRequest> {
        let Some(position) = self
            .messages
            .iter()
            .rposition(|m| m.role == Role::Assistant)
        else {
            return Vec::new();
        };

        let answered: HashSet<&str> = self.messages[position + 1..]
            .iter()
            .filter_map(|m| m.tool_call_id.as_deref())
            .collect();

        self.messages[position]
            .tool_calls
            .iter()
            .filter(|call| !answered.contains(call.id.as_str()))
            .cloned()
            .collect()
    }
}
