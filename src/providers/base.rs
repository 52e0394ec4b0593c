use std::collections::HashSet;

use crate::errors::TransportError;
use crate::models::message::Message;
use crate::models::tool::{ToolCallRequest, ToolSchema};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Usage {
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    pub total_tokens: Option<i64>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i64>,
        output_tokens: Option<i64>,
        total_tokens: Option<i64>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// What the model answered in one round
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    /// Plain text, the turn is over
    FinalAnswer(String),
    /// The model wants tools run before it continues
    ToolRequests {
        calls: Vec<ToolCallRequest>,
        text: Option<String>,
    },
}

impl ModelResponse {
    /// Tool call ids must be non-empty and unique within one reply, since each
    /// tool message answers exactly one of them
    pub fn validate(&self) -> Result<(), TransportError> {
        let ModelResponse::ToolRequests { calls, .. } = self else {
            return Ok(());
        };

        let mut seen = HashSet::new();
        for call in calls {
            if call.id.is_empty() {
                return Err(TransportError::MalformedResponse(format!(
                    "tool call to {} without an id",
                    call.name
                )));
            }
            if !seen.insert(call.id.as_str()) {
                return Err(TransportError::MalformedResponse(format!(
                    "tool call id {} is used more than once",
                    call.id
                )));
            }
        }
        Ok(())
    }

    /// The assistant message to record in the history
    pub fn to_message(&self) -> Message {
        match self {
            ModelResponse::FinalAnswer(text) => Message::assistant(text.as_str()),
            ModelResponse::ToolRequests { calls, text } => {
                Message::assistant_with_tool_calls(text.clone(), calls.clone())
            }
        }
    }
}

/// Base trait for model providers
pub trait Provider: Send + Sync {
    /// Send the whole conversation and the tool catalogue, and wait for the next assistant reply
    fn query(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
    ) -> Result<(ModelResponse, Usage), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::Role;

    #[test]
    fn test_validate_tool_call_ids() {
        assert!(ModelResponse::FinalAnswer(String::new()).validate().is_ok());

        let response = ModelResponse::ToolRequests {
            calls: vec![
                ToolCallRequest::new("c1", "get_weather", "{}"),
                ToolCallRequest::new("c2", "get_weather", "{}"),
            ],
            text: None,
        };
        assert!(response.validate().is_ok());

        let response = ModelResponse::ToolRequests {
            calls: vec![ToolCallRequest::new("", "get_weather", "{}")],
            text: None,
        };
        assert!(matches!(
            response.validate(),
            Err(TransportError::MalformedResponse(_))
        ));

        let response = ModelResponse::ToolRequests {
            calls: vec![
                ToolCallRequest::new("c1", "get_weather", "{}"),
                ToolCallRequest::new("c1", "get_weather", "{}"),
            ],
            text: None,
        };
        assert!(matches!(
            response.validate(),
            Err(TransportError::MalformedResponse(ref message)) if message.contains("c1")
        ));
    }

    #[test]
    fn test_response_to_message() {
        let message = ModelResponse::FinalAnswer("It's sunny today.".to_string()).to_message();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.text(), "It's sunny today.");
        assert!(!message.has_tool_calls());

        let response = ModelResponse::ToolRequests {
            calls: vec![ToolCallRequest::new("call_1", "get_weather", "{}")],
            text: None,
        };
        let message = response.to_message();
        assert!(message.content.is_none());
        assert_eq!(message.tool_calls[0].name, "get_weather");
    }
}
