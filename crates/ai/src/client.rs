//! HTTP client for the chat-completions sentiment classifier.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::parse::{parse_sentiment, SentimentResult};

/// Default API endpoint when `AI_BASE_URL` is unset.
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
/// Default model when `AI_MODEL` is unset.
const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
/// Default request timeout in seconds when `AI_TIMEOUT_SECS` is unset.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// System prompt sent with every classification request.
const SYSTEM_PROMPT: &str = "You are a sentiment analysis assistant for client \
    relationship management. Classify the sentiment of the following client \
    communication. Respond with only a JSON object of the form \
    {\"sentiment\": \"positive\" | \"neutral\" | \"negative\", \
    \"score\": <number between -1.0 and 1.0>, \
    \"reasoning\": \"<one short sentence>\"}.";

/// Connection settings for the classifier API.
///
/// | Env var           | Default                         |
/// |-------------------|---------------------------------|
/// | `AI_BASE_URL`     | `https://openrouter.ai/api/v1`  |
/// | `AI_API_KEY`      | (empty)                         |
/// | `AI_MODEL`        | `openai/gpt-4o-mini`            |
/// | `AI_TIMEOUT_SECS` | `30`                            |
#[derive(Debug, Clone)]
pub struct SentimentConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl SentimentConfig {
    /// Load settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let timeout_secs = std::env::var("AI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            base_url: std::env::var("AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: std::env::var("AI_API_KEY").unwrap_or_default(),
            model: std::env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// One completed classification.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub sentiment: SentimentResult,
    /// Total tokens billed for the request, as reported by the API.
    pub tokens_used: i64,
    /// True when the model's reply was unusable and the neutral
    /// fallback was substituted.
    pub degraded: bool,
}

/// Errors from talking to the classifier API. Both variants are
/// transient from the pipeline's point of view.
#[derive(Debug, thiserror::Error)]
pub enum SentimentClientError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("API returned status {0}")]
    Status(u16),
}

// Response shape of the chat-completions endpoint, reduced to the
// fields we read.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: i64,
}

/// Classifier over an OpenAI-compatible chat-completions endpoint.
pub struct SentimentClient {
    http: reqwest::Client,
    config: SentimentConfig,
}

impl SentimentClient {
    pub fn new(config: SentimentConfig) -> Result<Self, SentimentClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SentimentClientError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// The configured model identifier, for audit logging.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Classify one piece of client communication.
    ///
    /// Transport and HTTP failures are returned as errors so the
    /// caller can retry. A reply the model produced but we cannot
    /// parse is not retryable (the next attempt would likely fail the
    /// same way), so it degrades to [`SentimentResult::neutral`] with
    /// `degraded` set.
    pub async fn analyze(&self, text: &str) -> Result<Analysis, SentimentClientError> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": text },
            ],
            "temperature": 0.0,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SentimentClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SentimentClientError::Status(status.as_u16()));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| SentimentClientError::Transport(e.to_string()))?;
        let tokens_used = chat.usage.map(|u| u.total_tokens).unwrap_or(0);

        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default();

        match parse_sentiment(content) {
            Ok(sentiment) => Ok(Analysis {
                sentiment,
                tokens_used,
                degraded: false,
            }),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    model = %self.config.model,
                    "unusable classifier reply, substituting neutral sentiment"
                );
                Ok(Analysis {
                    sentiment: SentimentResult::neutral(),
                    tokens_used,
                    degraded: true,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        // from_env reads process-global state, so exercise the
        // fallback values directly.
        let config = SentimentConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };
        let client = SentimentClient::new(config).expect("client should build");
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[test]
    fn chat_response_deserializes() {
        let raw = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "{\"sentiment\": \"positive\", \"score\": 0.7}"}}
            ],
            "usage": {"prompt_tokens": 80, "completion_tokens": 20, "total_tokens": 100}
        }"#;
        let chat: ChatResponse = serde_json::from_str(raw).expect("should deserialize");
        assert_eq!(chat.choices.len(), 1);
        assert_eq!(chat.usage.map(|u| u.total_tokens), Some(100));
    }

    #[test]
    fn chat_response_without_usage_deserializes() {
        let raw = r#"{"choices": []}"#;
        let chat: ChatResponse = serde_json::from_str(raw).expect("should deserialize");
        assert!(chat.choices.is_empty());
        assert!(chat.usage.is_none());
    }
}
