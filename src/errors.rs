use thiserror::Error;

/// Problems with the process environment, reported before the chat loop starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set.")]
    MissingVar(String),

    #[error("Environment variable '{key}' has an invalid value: {reason}")]
    InvalidVar { key: String, reason: String },
}

/// Every way a model query can fail. The loop treats them all alike: the turn is aborted.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Server error: {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Model API error: {0}")]
    Api(String),

    #[error("Input message too long. Message: {0}")]
    ContextLengthExceeded(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Invalid tool name '{0}', it must match [a-zA-Z0-9_-]+")]
    InvalidName(String),

    #[error("Unknown tool requested: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for tool '{tool}': {reason}")]
    ArgumentParse { tool: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    #[error("Malformed {role} message: {reason}")]
    Malformed { role: String, reason: String },

    #[error("Tool result '{0}' does not answer any pending tool call")]
    UnmatchedToolResult(String),
}

/// Reasons a single turn stops before the model gives a final answer.
#[derive(Error, Debug)]
pub enum TurnError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("Stopped after {0} model rounds without a final answer")]
    RoundLimit(usize),
}

pub type ToolResult<T> = Result<T, ToolError>;
