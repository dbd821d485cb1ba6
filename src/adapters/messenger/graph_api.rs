//! Reply dispatcher over the Messenger Graph API.
//!
//! Sends `me/messages` with the page access token in the query string.
//! Platform rejections carry a structured error object; token expiry
//! (code 190) and missing permission (code 10) get dedicated log lines
//! because they need operator action rather than a retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::domain::foundation::SenderId;
use crate::ports::{DispatchError, ReplyDispatcher};

const TOKEN_EXPIRED_CODE: i64 = 190;
const PERMISSION_CODE: i64 = 10;

/// Configuration for the Graph API dispatcher.
#[derive(Debug, Clone)]
pub struct GraphApiConfig {
    page_access_token: Secret<String>,
    /// Base URL for the Graph API, version segment included.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl GraphApiConfig {
    /// Creates a configuration with the given page access token.
    pub fn new(page_access_token: impl Into<String>) -> Self {
        Self {
            page_access_token: Secret::new(page_access_token.into()),
            base_url: "https://graph.facebook.com/v19.0".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn token(&self) -> &str {
        self.page_access_token.expose_secret()
    }
}

/// `ReplyDispatcher` over the Messenger send API.
pub struct GraphApiDispatcher {
    config: GraphApiConfig,
    client: Client,
}

impl GraphApiDispatcher {
    /// Creates a dispatcher with the given configuration.
    pub fn new(config: GraphApiConfig) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DispatchError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/me/messages?access_token={}",
            self.config.base_url,
            self.config.token()
        )
    }
}

#[async_trait]
impl ReplyDispatcher for GraphApiDispatcher {
    async fn send_reply(&self, sender: &SenderId, text: &str) -> Result<bool, DispatchError> {
        let request = SendMessageRequest {
            recipient: Recipient {
                id: sender.as_str().to_string(),
            },
            message: MessageBody {
                text: text.to_string(),
            },
        };

        let response = self
            .client
            .post(self.messages_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| DispatchError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(sender = %sender, "reply delivered");
            return Ok(true);
        }

        let body: PlatformErrorEnvelope = response.json().await.unwrap_or_default();
        match body.error {
            Some(platform) => {
                match platform.code {
                    TOKEN_EXPIRED_CODE => {
                        error!(sender = %sender, "page access token expired or invalid")
                    }
                    PERMISSION_CODE => {
                        error!(sender = %sender, "app lacks permission to message this sender")
                    }
                    code => warn!(
                        sender = %sender,
                        code,
                        message = %platform.message,
                        "platform rejected the send"
                    ),
                }
                Err(DispatchError::Platform {
                    code: platform.code,
                    message: platform.message,
                })
            }
            None => Err(DispatchError::Network(format!(
                "unexpected status {status} with no error body"
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest {
    recipient: Recipient,
    message: MessageBody,
}

#[derive(Debug, Serialize)]
struct Recipient {
    id: String,
}

#[derive(Debug, Serialize)]
struct MessageBody {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct PlatformErrorEnvelope {
    error: Option<PlatformError>,
}

#[derive(Debug, Deserialize)]
struct PlatformError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}
