//! AI oracle configuration.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Configuration for the completeness and classification oracles.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Gemini API key (completeness oracle).
    pub gemini_api_key: Option<String>,

    /// OpenAI API key (classification oracle).
    pub openai_api_key: Option<String>,

    /// Gemini model name.
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// OpenAI model name.
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Completeness request timeout in seconds.
    #[serde(default = "default_completeness_timeout")]
    pub completeness_timeout_secs: u64,

    /// Classification request timeout in seconds.
    #[serde(default = "default_classification_timeout")]
    pub classification_timeout_secs: u64,
}

impl AiConfig {
    /// Completeness timeout as a Duration.
    pub fn completeness_timeout(&self) -> Duration {
        Duration::from_secs(self.completeness_timeout_secs)
    }

    /// Classification timeout as a Duration.
    pub fn classification_timeout(&self) -> Duration {
        Duration::from_secs(self.classification_timeout_secs)
    }

    /// Validate AI configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.gemini_api_key.as_deref().map_or(true, str::is_empty) {
            return Err(ValidationError::MissingRequired("AI__GEMINI_API_KEY"));
        }
        if self.openai_api_key.as_deref().map_or(true, str::is_empty) {
            return Err(ValidationError::MissingRequired("AI__OPENAI_API_KEY"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            openai_api_key: None,
            gemini_model: default_gemini_model(),
            openai_model: default_openai_model(),
            completeness_timeout_secs: default_completeness_timeout(),
            classification_timeout_secs: default_classification_timeout(),
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_completeness_timeout() -> u64 {
    10
}

fn default_classification_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_keys_are_required() {
        let mut config = AiConfig {
            gemini_api_key: Some("g-key".to_string()),
            openai_api_key: None,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.openai_api_key = Some("o-key".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn timeouts_convert_to_durations() {
        let config = AiConfig::default();
        assert_eq!(config.completeness_timeout(), Duration::from_secs(10));
        assert_eq!(config.classification_timeout(), Duration::from_secs(30));
    }
}
