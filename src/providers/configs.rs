use crate::config::EnvConfig;
use crate::errors::ConfigError;

pub const DEFAULT_HOST: &str = "https://api.openai.com/";
pub const DEFAULT_MODEL: &str = "o4-mini";

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiProviderConfig {
    pub api_key: String,
    pub host: String,
    pub model: String,
}

impl OpenAiProviderConfig {
    pub fn new(api_key: String, host: String) -> Self {
        let host = if host.ends_with('/') {
            host
        } else {
            format!("{}/", host)
        };
        Self {
            api_key,
            host,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }
}

impl EnvConfig for OpenAiProviderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = Self::get_env("OPENAI_API_KEY", true, None)?
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;
        if api_key.trim().is_empty() {
            return Err(ConfigError::InvalidVar {
                key: "OPENAI_API_KEY".to_string(),
                reason: "the key is empty".to_string(),
            });
        }

        let host = Self::get_env("OPENAI_API_HOST", false, Some(DEFAULT_HOST.to_string()))?
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        Ok(Self::new(api_key, host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_gets_trailing_slash() {
        let config = OpenAiProviderConfig::new("key".to_string(), "http://127.0.0.1:1234".to_string());
        assert_eq!(config.host, "http://127.0.0.1:1234/");

        let config = OpenAiProviderConfig::new("key".to_string(), DEFAULT_HOST.to_string());
        assert_eq!(config.host, DEFAULT_HOST);
    }

    // No other test may touch OPENAI_API_KEY
    #[test]
    fn test_from_env_requires_a_key() {
        std::env::remove_var("OPENAI_API_KEY");
        assert_eq!(
            OpenAiProviderConfig::from_env(),
            Err(ConfigError::MissingVar("OPENAI_API_KEY".to_string()))
        );

        std::env::set_var("OPENAI_API_KEY", "  ");
        assert!(matches!(
            OpenAiProviderConfig::from_env(),
            Err(ConfigError::InvalidVar { ref key, .. }) if key == "OPENAI_API_KEY"
        ));

        std::env::set_var("OPENAI_API_KEY", "sk-test");
        let config = OpenAiProviderConfig::from_env();
        std::env::remove_var("OPENAI_API_KEY");
        assert_eq!(config.map(|c| c.api_key), Ok("sk-test".to_string()));
    }

    #[test]
    fn test_default_and_custom_model() {
        let config = OpenAiProviderConfig::new("key".to_string(), DEFAULT_HOST.to_string());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.with_model("gpt-4o").model, "gpt-4o");
    }
}
