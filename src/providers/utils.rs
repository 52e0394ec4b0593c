use serde_json::{json, Value};

use super::base::{ModelResponse, Usage};
use crate::errors::TransportError;
use crate::models::message::{Message, Role};
use crate::models::tool::{ToolCallRequest, ToolSchema};

/// Convert internal Message format to OpenAI's API message specification
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| match message.role {
            Role::System | Role::User => json!({
                "role": message.role,
                "content": message.text(),
            }),
            Role::Assistant => {
                let mut converted = json!({
                    "role": "assistant",
                    "content": message.content,
                });
                if message.has_tool_calls() {
                    let tool_calls: Vec<Value> = message
                        .tool_calls
                        .iter()
                        .map(|call| {
                            json!({
                                "id": call.id,
                                "type": "function",
                                "function": {
                                    "name": call.name,
                                    "arguments": call.arguments,
                                }
                            })
                        })
                        .collect();
                    converted["tool_calls"] = json!(tool_calls);
                }
                converted
            }
            Role::Tool => json!({
                "role": "tool",
                "tool_call_id": message.tool_call_id,
                "name": message.name,
                "content": message.text(),
            }),
        })
        .collect()
}

/// Convert internal Tool format to OpenAI's API tool specification
pub fn tools_to_openai_spec(tools: &[ToolSchema]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "type": "function",
                "function": {
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.parameters_json(),
                }
            })
        })
        .collect()
}

/// Convert OpenAI's API response to a model response
pub fn openai_response_to_model_response(response: &Value) -> Result<ModelResponse, TransportError> {
    let reply = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| {
            TransportError::MalformedResponse("missing choices[0].message".to_string())
        })?;

    let text = reply
        .get("content")
        .and_then(Value::as_str)
        .map(str::to_string);

    let mut calls = Vec::new();
    if let Some(tool_calls) = reply.get("tool_calls").and_then(Value::as_array) {
        for tool_call in tool_calls {
            let id = tool_call["id"].as_str().ok_or_else(|| {
                TransportError::MalformedResponse("tool call without an id".to_string())
            })?;
            let name = tool_call["function"]["name"].as_str().ok_or_else(|| {
                TransportError::MalformedResponse(format!("tool call {} without a function name", id))
            })?;
            let arguments = match &tool_call["function"]["arguments"] {
                Value::String(arguments) => arguments.clone(),
                Value::Null => String::new(),
                // Some servers send the object itself rather than its text
                other => other.to_string(),
            };
            calls.push(ToolCallRequest::new(id, name, arguments));
        }
    }

    let response = if calls.is_empty() {
        ModelResponse::FinalAnswer(text.unwrap_or_default())
    } else {
        ModelResponse::ToolRequests { calls, text }
    };
    response.validate()?;
    Ok(response)
}

pub fn get_usage(data: &Value) -> Usage {
    let Some(usage) = data.get("usage") else {
        return Usage::default();
    };

    let input_tokens = usage
        .get("prompt_tokens")
        .and_then(|v| v.as_i64());

    let output_tokens = usage
        .get("completion_tokens")
        .and_then(|v| v.as_i64());

    let total_tokens = usage
        .get("total_tokens")
        .and_then(|v| v.as_i64())
        .or_else(|| match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => input.checked_add(output),
            _ => None,
        });

    Usage::new(input_tokens, output_tokens, total_tokens)
}

/// Turn an `error` object of an API response into a transport error
pub fn openai_error_to_transport_error(error: &Value) -> TransportError {
    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown error")
        .to_string();

    match error.get("code").and_then(|c| c.as_str()) {
        Some("context_length_exceeded") | Some("string_above_max_length") => {
            TransportError::ContextLengthExceeded(message)
        }
        _ => TransportError::Api(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tool::{Parameter, ParameterType};
    use anyhow::Result;

    const OPENAI_TOOL_USE_RESPONSE: &str = r#"{
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "1",
                    "type": "function",
                    "function": {
                        "name": "example_fn",
                        "arguments": "{\"param\": \"value\"}"
                    }
                }]
            }
        }],
        "usage": {
            "prompt_tokens": 10,
            "completion_tokens": 25,
            "total_tokens": 35
        }
    }"#;

    #[test]
    fn test_messages_to_openai_spec() {
        let spec = messages_to_openai_spec(&[Message::user("Hello")]);

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0], json!({"role": "user", "content": "Hello"}));
    }

    #[test]
    fn test_messages_to_openai_spec_complex() {
        let messages = vec![
            Message::system("Be brief."),
            Message::user("How is the weather?"),
            Message::assistant_with_tool_calls(
                None,
                vec![ToolCallRequest::new("1", "get_weather", "{}")],
            ),
            Message::tool("1", "get_weather", "sunny"),
            Message::assistant("It's sunny today."),
        ];

        let spec = messages_to_openai_spec(&messages);

        assert_eq!(spec.len(), 5);
        assert_eq!(spec[0]["role"], "system");
        assert_eq!(spec[1]["content"], "How is the weather?");
        assert_eq!(spec[2]["role"], "assistant");
        assert!(spec[2]["content"].is_null());
        assert_eq!(spec[2]["tool_calls"][0]["id"], "1");
        assert_eq!(spec[2]["tool_calls"][0]["type"], "function");
        assert_eq!(spec[2]["tool_calls"][0]["function"]["arguments"], "{}");
        assert_eq!(spec[3]["role"], "tool");
        assert_eq!(spec[3]["tool_call_id"], "1");
        assert_eq!(spec[3]["name"], "get_weather");
        assert_eq!(spec[3]["content"], "sunny");
        assert_eq!(spec[4]["content"], "It's sunny today.");
        assert!(spec[4].get("tool_calls").is_none());
    }

    #[test]
    fn test_tools_to_openai_spec() {
        let tool = ToolSchema::new("run_in_container", "Execute a command").with_parameter(
            Parameter::required("command", ParameterType::String, "The shell command"),
        );

        let spec = tools_to_openai_spec(&[tool]);

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["type"], "function");
        assert_eq!(spec[0]["function"]["name"], "run_in_container");
        assert_eq!(spec[0]["function"]["parameters"]["required"], json!(["command"]));
    }

    #[test]
    fn test_tools_to_openai_spec_empty() {
        assert!(tools_to_openai_spec(&[]).is_empty());
    }

    #[test]
    fn test_openai_response_to_message_text() -> Result<()> {
        let response = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "Hello from John Cena!"
                }
            }]
        });

        let message = openai_response_to_model_response(&response)?;
        assert_eq!(
            message,
            ModelResponse::FinalAnswer("Hello from John Cena!".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_openai_response_empty_reply_is_final() -> Result<()> {
        let response = json!({"choices": [{"message": {"role": "assistant", "content": null}}]});
        assert_eq!(
            openai_response_to_model_response(&response)?,
            ModelResponse::FinalAnswer(String::new())
        );

        let response =
            json!({"choices": [{"message": {"role": "assistant", "content": "", "tool_calls": []}}]});
        assert_eq!(
            openai_response_to_model_response(&response)?,
            ModelResponse::FinalAnswer(String::new())
        );
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_valid_tooluse() -> Result<()> {
        let response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;

        match openai_response_to_model_response(&response)? {
            ModelResponse::ToolRequests { calls, text } => {
                assert!(text.is_none());
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0], ToolCallRequest::new("1", "example_fn", r#"{"param": "value"}"#));
            }
            other => panic!("expected tool requests, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_openai_response_keeps_invalid_arguments_raw() -> Result<()> {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        response["choices"][0]["message"]["tool_calls"][0]["function"]["arguments"] =
            json!("invalid json {");

        match openai_response_to_model_response(&response)? {
            ModelResponse::ToolRequests { calls, .. } => {
                assert_eq!(calls[0].arguments, "invalid json {");
            }
            other => panic!("expected tool requests, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_openai_response_missing_fields() -> Result<()> {
        let result = openai_response_to_model_response(&json!({"id": "chatcmpl-1"}));
        assert!(matches!(result, Err(TransportError::MalformedResponse(_))));

        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        response["choices"][0]["message"]["tool_calls"][0]["function"] = json!({});
        let result = openai_response_to_model_response(&response);
        assert!(matches!(result, Err(TransportError::MalformedResponse(_))));
        Ok(())
    }

    #[test]
    fn test_openai_response_rejects_empty_call_id() -> Result<()> {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        response["choices"][0]["message"]["tool_calls"][0]["id"] = json!("");

        let result = openai_response_to_model_response(&response);
        assert!(matches!(result, Err(TransportError::MalformedResponse(_))));
        Ok(())
    }

    #[test]
    fn test_openai_response_rejects_repeated_call_id() -> Result<()> {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        let call = response["choices"][0]["message"]["tool_calls"][0].clone();
        response["choices"][0]["message"]["tool_calls"] = json!([call.clone(), call]);

        let result = openai_response_to_model_response(&response);
        assert!(matches!(
            result,
            Err(TransportError::MalformedResponse(ref message)) if message.contains("more than once")
        ));
        Ok(())
    }

    #[test]
    fn test_get_usage() -> Result<()> {
        let response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        assert_eq!(get_usage(&response), Usage::new(Some(10), Some(25), Some(35)));
        Ok(())
    }

    #[test]
    fn test_get_usage_calculated_total() {
        let response = json!({"usage": {"prompt_tokens": 10, "completion_tokens": 20}});
        assert_eq!(get_usage(&response).total_tokens, Some(30));
        assert_eq!(get_usage(&json!({})), Usage::default());
    }

    #[test]
    fn test_get_usage_large_counts() {
        let response = json!({"usage": {"prompt_tokens": 3_000_000_000u64, "completion_tokens": 1}});
        let usage = get_usage(&response);
        assert_eq!(usage.input_tokens, Some(3_000_000_000));
        assert_eq!(usage.total_tokens, Some(3_000_000_001));
    }

    #[test]
    fn test_openai_error_to_transport_error() {
        let error = json!({
            "code": "context_length_exceeded",
            "message": "This message is too long"
        });
        assert_eq!(
            openai_error_to_transport_error(&error).to_string(),
            "Input message too long. Message: This message is too long"
        );

        let error = json!({"code": "other_error", "message": "Some other error"});
        assert!(matches!(
            openai_error_to_transport_error(&error),
            TransportError::Api(ref message) if message == "Some other error"
        ));
    }
}
