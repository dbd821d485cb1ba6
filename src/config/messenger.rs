//! Messenger platform configuration.

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// Messenger webhook and send-API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MessengerConfig {
    /// Token echoed during the webhook verification exchange.
    pub verify_token: String,

    /// Page access token for the Graph send API.
    pub page_access_token: Secret<String>,

    /// App secret for payload signature verification; unset disables it.
    pub app_secret: Option<Secret<String>>,

    /// Graph API base URL, version segment included.
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
}

impl MessengerConfig {
    /// The page access token value.
    pub fn page_access_token(&self) -> &str {
        self.page_access_token.expose_secret()
    }

    /// The app secret value, when configured.
    pub fn app_secret(&self) -> Option<&str> {
        self.app_secret.as_ref().map(|s| s.expose_secret().as_str())
    }

    /// Validate messenger configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.verify_token.trim().is_empty() {
            return Err(ValidationError::MissingRequired("MESSENGER__VERIFY_TOKEN"));
        }
        if self.page_access_token().trim().is_empty() {
            return Err(ValidationError::MissingRequired(
                "MESSENGER__PAGE_ACCESS_TOKEN",
            ));
        }
        Ok(())
    }
}

fn default_graph_base_url() -> String {
    "https://graph.facebook.com/v19.0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(verify: &str, token: &str) -> MessengerConfig {
        MessengerConfig {
            verify_token: verify.to_string(),
            page_access_token: Secret::new(token.to_string()),
            app_secret: None,
            graph_base_url: default_graph_base_url(),
        }
    }

    #[test]
    fn accepts_a_complete_config() {
        assert!(config("verify", "page-token").validate().is_ok());
    }

    #[test]
    fn rejects_empty_tokens() {
        assert!(config("", "page-token").validate().is_err());
        assert!(config("verify", " ").validate().is_err());
    }
}
