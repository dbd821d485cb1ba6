//! Gemini-backed completeness oracle.
//!
//! Asks a Gemini model whether the accumulated text is a finished
//! utterance. The model is instructed to answer with the literal strings
//! "true" or "false"; anything else is a parse error, which the dialogue
//! machine treats as "not complete".

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ports::{CompletenessOracle, OracleError};

const SYSTEM_TEMPLATE: &str = "\
你是一個專門判斷使用者訊息是否輸入完畢的語言模型。\n\
你會收到一段對話內容（可能包含使用者分次輸入的訊息）。\n\
請根據語意完整性、未完句、語氣是否暗示還在思考等指標，判斷使用者是否已完成此次發言。\n\
請只輸出以下其中一個字串（格式很重要）：\n\
- true → 使用者輸入已結束，可以回應。\n\
- false → 使用者可能還會繼續輸入，請等待。";

/// Configuration for the Gemini completeness oracle.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    api_key: Secret<String>,
    /// Model to use (e.g. "gemini-1.5-pro").
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Creates a configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gemini-1.5-pro".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: Duration::from_secs(10),
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

/// Completeness oracle over Gemini's generateContent endpoint.
pub struct GeminiCompletenessOracle {
    config: GeminiConfig,
    client: Client,
}

impl GeminiCompletenessOracle {
    /// Creates an oracle with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OracleError::network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url,
            self.config.model,
            self.config.api_key()
        )
    }

    fn build_request(&self, text: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: format!("{SYSTEM_TEMPLATE}\n\n用戶輸入: \"{text}\""),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: 8,
            },
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
impl CompletenessOracle for GeminiCompletenessOracle {
    async fn is_input_complete(&self, text: &str) -> Result<bool, OracleError> {
        let response = self
            .client
            .post(self.generate_url())
            .json(&self.build_request(text))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => OracleError::AuthenticationFailed,
                429 => OracleError::RateLimited {
                    retry_after_secs: 30,
                },
                500..=599 => OracleError::unavailable(format!("server error {status}: {body}")),
                _ => OracleError::network(format!("unexpected status {status}: {body}")),
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| OracleError::parse(format!("failed to decode response: {e}")))?;

        let answer = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| OracleError::parse("no candidates in response"))?;

        let verdict = answer.trim().eq_ignore_ascii_case("true");
        debug!(verdict, raw = %answer.trim(), "completeness verdict");
        Ok(verdict)
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}
