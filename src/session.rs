use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::dispatcher::Dispatcher;
use crate::errors::TurnError;
use crate::history::History;
use crate::models::message::Message;
use crate::models::tool::ToolCallRequest;
use crate::prompt::{InputType, Prompt};
use crate::providers::base::{ModelResponse, Provider};
use crate::registry::ToolRegistry;

/// Where a turn currently stands, once the user's message is in the history
#[derive(Debug)]
enum TurnState {
    AwaitingModelResponse,
    DispatchingTools(Vec<ToolCallRequest>),
    Done(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Blank input, nothing was sent
    Ignored,
    /// The model's final answer
    Answered(String),
}

/// A chat session: one history, one set of tools and one model, for the life of the process
pub struct Session<'a> {
    provider: Box<dyn Provider + 'a>,
    registry: ToolRegistry,
    history: History,
    prompt: Box<dyn Prompt + 'a>,
    config: SessionConfig,
}

impl<'a> Session<'a> {
    pub fn new(
        provider: Box<dyn Provider + 'a>,
        registry: ToolRegistry,
        system_prompt: &str,
        prompt: Box<dyn Prompt + 'a>,
        config: SessionConfig,
    ) -> Self {
        Session {
            provider,
            registry,
            history: History::new(system_prompt),
            prompt,
            config,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Read user input until the user leaves. A failed turn is reported and the prompt comes back.
    pub fn start(&mut self) -> Result<()> {
        info!(tools = ?self.registry.names(), "starting session");

        loop {
            let input = self.prompt.get_input()?;
            match input.input_type {
                InputType::Message => {
                    if let Some(content) = &input.content {
                        if let Err(e) = self.process_turn(content) {
                            error!(error = %e, "turn aborted");
                            self.prompt.render_error(&e);
                        }
                    }
                }
                InputType::AskAgain => continue,
                InputType::Exit => break,
            }
        }

        self.prompt.close();
        Ok(())
    }

    /// Run one user turn to completion: query the model, run any tools it asks for and
    /// query it again, until it answers with plain text.
    pub fn process_turn(&mut self, input: &str) -> Result<TurnOutcome, TurnError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(TurnOutcome::Ignored);
        }

        self.close_unanswered_calls()?;
        self.history.append(Message::user(input))?;

        let tools = self.registry.schemas();
        let mut rounds = 0;
        let mut state = TurnState::AwaitingModelResponse;

        loop {
            state = match state {
                TurnState::AwaitingModelResponse => {
                    if let Some(max_rounds) = self.config.max_rounds {
                        if rounds >= max_rounds {
                            return Err(TurnError::RoundLimit(max_rounds));
                        }
                    }
                    rounds += 1;

                    self.prompt.show_busy();
                    let reply = self.provider.query(&self.history.snapshot(), &tools);
                    self.prompt.hide_busy();
                    let (response, _usage) = reply?;
                    response.validate()?;

                    let message = response.to_message();
                    debug!(round = rounds, "{}", message.summary());
                    self.history.append(message.clone())?;
                    self.prompt.render(&message);

                    match response {
                        ModelResponse::FinalAnswer(text) => TurnState::Done(text),
                        ModelResponse::ToolRequests { calls, .. } => {
                            TurnState::DispatchingTools(calls)
                        }
                    }
                }
                TurnState::DispatchingTools(calls) => {
                    let dispatcher = Dispatcher::new(&self.registry);
                    for call in &calls {
                        let result = dispatcher.dispatch(call)?;
                        self.history.append(result.clone())?;
                        self.prompt.render(&result);
                    }
                    TurnState::AwaitingModelResponse
                }
                TurnState::Done(text) => {
                    info!(rounds, history = self.history.len(), "turn complete");
                    return Ok(TurnOutcome::Answered(text));
                }
            };
        }
    }

    /// Answer the calls an aborted turn left behind, so the next request is well formed
    fn close_unanswered_calls(&mut self) -> Result<(), TurnError> {
        for call in self.history.unanswered_calls() {
            warn!(id = %call.id, tool = %call.name, "closing tool call left by an aborted turn");
            let reason = match self.registry.resolve(&call.name) {
                Ok(_) => "the turn was aborted before it ran".to_string(),
                Err(e) => e.to_string(),
            };
            self.history.append(Message::tool(
                call.id,
                call.name,
                format!("Error: tool call was not executed: {}", reason),
            ))?;
        }
        Ok(())
    }
}
