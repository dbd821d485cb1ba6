//! Dialogue completion configuration.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Input-completion timing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DialogueConfig {
    /// Seconds of silence before a buffered utterance is force-completed.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl DialogueConfig {
    /// Timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate dialogue configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidDialogueTimeout);
        }
        Ok(())
    }
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_ten_seconds() {
        let config = DialogueConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = DialogueConfig { timeout_secs: 0 };
        assert!(config.validate().is_err());
    }
}
