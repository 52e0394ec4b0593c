use std::env;

use crate::errors::ConfigError;

pub trait EnvConfig {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self, ConfigError>
    where
        Self: Sized;

    /// Helper function to get environment variables with error handling
    fn get_env(
        key: &str,
        required: bool,
        default: Option<String>,
    ) -> Result<Option<String>, ConfigError> {
        match env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) if !required => Ok(default),
            Err(env::VarError::NotPresent) => Err(ConfigError::MissingVar(key.to_string())),
            Err(e) => Err(ConfigError::InvalidVar {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

pub const MAX_ROUNDS_VAR: &str = "TOOLCHAT_MAX_ROUNDS";

/// Settings for the chat loop itself
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionConfig {
    /// Upper bound on model queries within one turn, unbounded when `None`
    pub max_rounds: Option<usize>,
}

impl SessionConfig {
    pub fn parse_max_rounds(value: &str) -> Result<usize, ConfigError> {
        match value.trim().parse::<usize>() {
            Ok(rounds) if rounds > 0 => Ok(rounds),
            _ => Err(ConfigError::InvalidVar {
                key: MAX_ROUNDS_VAR.to_string(),
                reason: format!("expected a positive integer, got '{}'", value),
            }),
        }
    }
}

impl EnvConfig for SessionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_rounds = Self::get_env(MAX_ROUNDS_VAR, false, None)?
            .map(|value| Self::parse_max_rounds(&value))
            .transpose()?;

        Ok(Self { max_rounds })
    }
}
