//! OpenAI-backed classification oracle.
//!
//! Sends the classification guide, the dynamic label list, the formatted
//! history, and the user message through the chat completions API and
//! returns the model's raw text untouched. Structural validation belongs
//! to the classification parser, not this adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::ports::{ClassificationOracle, OracleError};

const SYSTEM_TEMPLATE: &str = "\
你是一個專業的客服問題分類專家。請根據分類規則，將用戶的問題歸入其中一個類別，\
並評估你的信心程度（0 到 1 之間的小數）。\n\
重要：請只回傳一個原始 JSON 對象，格式為 {\"category\": \"類別\", \"confidence\": 0.95}。\
不要添加任何反引號、代碼塊標記或解釋文字。";

/// Configuration for the OpenAI classification oracle.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    api_key: Secret<String>,
    /// Model to use (e.g. "gpt-4o-mini").
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Sampling temperature; low for deterministic labels.
    pub temperature: f32,
}

impl OpenAiConfig {
    /// Creates a configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
            temperature: 0.3,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Classification oracle over the chat completions endpoint.
pub struct OpenAiClassificationOracle {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiClassificationOracle {
    /// Creates an oracle with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OracleError::network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn build_request(
        &self,
        history: &str,
        message: &str,
        options: &[String],
        guide: &str,
    ) -> ChatRequest {
        let user_prompt = format!(
            "可用類別: [{}]\n\n分類規則:\n{}\n\n對話歷史:\n{}\n\n用戶訊息: {}",
            options.join(", "),
            guide,
            history,
            message
        );
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_TEMPLATE.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt,
                },
            ],
            temperature: self.config.temperature,
        }
    }

    fn map_send_error(&self, error: reqwest::Error) -> OracleError {
        if error.is_timeout() {
            OracleError::Timeout {
                timeout_secs: self.config.timeout.as_secs() as u32,
            }
        } else if error.is_connect() {
            OracleError::network(format!("connection failed: {error}"))
        } else {
            OracleError::network(error.to_string())
        }
    }
}

#[async_trait]
impl ClassificationOracle for OpenAiClassificationOracle {
    async fn classify(
        &self,
        history: &str,
        message: &str,
        options: &[String],
        guide: &str,
    ) -> Result<String, OracleError> {
        let request = self.build_request(history, message, options, guide);

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => OracleError::AuthenticationFailed,
                429 => OracleError::RateLimited {
                    retry_after_secs: 30,
                },
                500..=599 => OracleError::unavailable(format!("server error {status}: {body}")),
                _ => OracleError::network(format!("unexpected status {status}: {body}")),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::parse(format!("failed to decode response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OracleError::parse("no choices in response"))?;

        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_options_guide_history_and_message() {
        let oracle = OpenAiClassificationOracle::new(OpenAiConfig::new("k")).unwrap();
        let options = vec!["物流".to_string(), "退貨".to_string()];
        let request = oracle.build_request("用戶: 你好", "還沒到貨", &options, "物流: 配送");

        let user = &request.messages[1].content;
        assert!(user.contains("物流, 退貨"));
        assert!(user.contains("物流: 配送"));
        assert!(user.contains("用戶: 你好"));
        assert!(user.contains("還沒到貨"));
    }

    #[test]
    fn response_shape_decodes() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"category\":\"物流\",\"confidence\":0.9}"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.choices[0].message.content.contains("物流"));
    }
}
