use reqwest::blocking::Client; // blocking API, the chat loop makes sync calls
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

use super::{
    base::{ModelResponse, Provider, Usage},
    configs::OpenAiProviderConfig,
    utils::{
        get_usage, messages_to_openai_spec, openai_error_to_transport_error,
        openai_response_to_model_response, tools_to_openai_spec,
    },
};
use crate::errors::TransportError;
use crate::models::message::Message;
use crate::models::tool::ToolSchema;

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn post(&self, payload: Value) -> Result<Value, TransportError> {
        let url = format!("{}v1/chat/completions", self.config.host);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()?;

        let status = response.status();
        if status == StatusCode::OK {
            return response
                .json()
                .map_err(|e| TransportError::MalformedResponse(e.to_string()));
        }

        // Error bodies usually carry {"error": {"message": ...}}, fall back to the raw text
        let body = response.text().unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(body);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(TransportError::Auth {
                status: status.as_u16(),
                message,
            }),
            // No retries here, a failed request ends the turn
            _ => Err(TransportError::Status {
                status: status.as_u16(),
                message,
            }),
        }
    }
}

impl Provider for OpenAiProvider {
    fn query(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
    ) -> Result<(ModelResponse, Usage), TransportError> {
        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_to_openai_spec(messages),
        });

        if !tools.is_empty() {
            payload["tools"] = json!(tools_to_openai_spec(tools));
            payload["tool_choice"] = json!("auto");
        }

        debug!(model = %self.config.model, messages = messages.len(), tools = tools.len(), "querying model");
        let response = self.post(payload)?;

        if let Some(error) = response.get("error") {
            return Err(openai_error_to_transport_error(error));
        }

        let model_response = openai_response_to_model_response(&response)?;
        let usage = get_usage(&response);
        info!(
            input_tokens = ?usage.input_tokens,
            output_tokens = ?usage.output_tokens,
            total_tokens = ?usage.total_tokens,
            "model replied"
        );

        Ok((model_response, usage))
    }
}
