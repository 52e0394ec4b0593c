use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::errors::TransportError;
use crate::models::message::Message;
use crate::models::tool::ToolSchema;
use crate::providers::base::{ModelResponse, Provider, Usage};

/// A mock provider that returns pre-configured responses and records what it was sent
#[derive(Clone, Default)]
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<Result<ModelResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Result<ModelResponse, TransportError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            requests: Arc::default(),
        }
    }

    /// The history snapshot received by each query so far
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

impl Provider for MockProvider {
    fn query(
        &self,
        messages: &[Message],
        _tools: &[ToolSchema],
    ) -> Result<(ModelResponse, Usage), TransportError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        match self.responses.lock().unwrap().pop_front() {
            Some(response) => response.map(|r| (r, Usage::default())),
            // Return empty response if no more pre-configured responses
            None => Ok((ModelResponse::FinalAnswer(String::new()), Usage::default())),
        }
    }
}
