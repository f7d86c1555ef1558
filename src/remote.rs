//! Remote assistant client.
//!
//! Sends one user utterance to an OpenAI-compatible chat completions
//! endpoint and extracts the reply text. One request, one attempt: retry
//! policy belongs to whoever is asking, not here. Callers never see a raw
//! transport error, only a [`RemoteError`] kind plus a readable detail.

use crate::config::RemoteConfig;
use crate::error::{AssistantError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

/// Taxonomized remote completion failure.
///
/// The controller turns each kind into distinct user-facing wording, so
/// the kinds must stay distinguishable even when the detail strings are
/// not.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The endpoint rejected the credential (401/403).
    #[error("authentication rejected: {0}")]
    Unauthorized(String),

    /// The endpoint refused the request for quota reasons (429).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The request never completed: DNS, connectivity, TLS, or an elapsed
    /// timeout.
    #[error("network failure: {0}")]
    Network(String),

    /// The endpoint answered but the payload did not carry a reply.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Any other endpoint failure.
    #[error("remote failure: {0}")]
    Other(String),
}

/// Port for the remote completion capability.
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Complete a single user utterance. One attempt, no retry.
    async fn complete(&self, utterance: &str) -> std::result::Result<String, RemoteError>;
}

/// Chat-completions client for an OpenAI-compatible endpoint.
pub struct RemoteAssistantClient {
    client: reqwest::Client,
    api_url: String,
    api_model: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
}

impl RemoteAssistantClient {
    /// Create a new client from configuration.
    ///
    /// The API key reference is resolved eagerly so a missing credential
    /// env var fails at startup, not mid-conversation.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be resolved or the HTTP client
    /// cannot be built.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let api_key = config.api_key.resolve()?.unwrap_or_default();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AssistantError::Config(format!("HTTP client build failed: {e}")))?;

        info!(
            "remote assistant configured: {} model={}",
            config.api_url, config.api_model
        );

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_model: config.api_model.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Completion endpoint URL, accepting base URLs with or without the
    /// `/v1` suffix.
    fn endpoint(&self) -> String {
        let base = self.api_url.strip_suffix("/v1").unwrap_or(&self.api_url);
        let base = base.trim_end_matches('/');
        format!("{base}/v1/chat/completions")
    }

    /// Map an HTTP error status to the appropriate failure kind.
    fn map_http_error(status: reqwest::StatusCode, body: &str) -> RemoteError {
        let message = extract_error_message(body);
        match status.as_u16() {
            401 | 403 => RemoteError::Unauthorized(message),
            429 => RemoteError::RateLimited(message),
            code => RemoteError::Other(format!("HTTP {code}: {message}")),
        }
    }
}

/// Extract a readable message from a provider error response body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_owned())
}

/// Pull the reply text out of a choices-style envelope.
///
/// Missing or empty content is a failure, never an empty reply.
fn extract_reply(payload: &serde_json::Value) -> Option<String> {
    let content = payload["choices"][0]["message"]["content"].as_str()?;
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    Some(content.to_owned())
}

#[async_trait]
impl CompletionPort for RemoteAssistantClient {
    async fn complete(&self, utterance: &str) -> std::result::Result<String, RemoteError> {
        let body = serde_json::json!({
            "model": self.api_model,
            "messages": [{ "role": "user", "content": utterance }],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        let mut request = self.client.post(self.endpoint()).json(&body);
        if !self.api_key.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RemoteError::Network(format!("request timed out: {e}"))
            } else {
                RemoteError::Network(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(Self::map_http_error(status, &body_text));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RemoteError::Malformed(format!("invalid JSON payload: {e}")))?;

        let Some(reply) = extract_reply(&payload) else {
            return Err(RemoteError::Malformed(
                "payload carries no reply text".to_owned(),
            ));
        };

        info!("remote reply received ({} chars)", reply.len());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::config::ApiKeyRef;

    fn client_for(url: &str) -> RemoteAssistantClient {
        RemoteAssistantClient::new(&RemoteConfig {
            api_url: url.to_owned(),
            api_key: ApiKeyRef::None,
            ..RemoteConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn endpoint_tolerates_v1_and_trailing_slash() {
        assert_eq!(
            client_for("https://api.openai.com").endpoint(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            client_for("https://api.openai.com/v1").endpoint(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            client_for("http://localhost:11434/").endpoint(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn http_statuses_map_to_failure_kinds() {
        let unauthorized = RemoteAssistantClient::map_http_error(
            reqwest::StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Incorrect API key"}}"#,
        );
        assert_eq!(
            unauthorized,
            RemoteError::Unauthorized("Incorrect API key".to_owned())
        );

        let forbidden =
            RemoteAssistantClient::map_http_error(reqwest::StatusCode::FORBIDDEN, "nope");
        assert!(matches!(forbidden, RemoteError::Unauthorized(_)));

        let limited = RemoteAssistantClient::map_http_error(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"slow down"}}"#,
        );
        assert_eq!(limited, RemoteError::RateLimited("slow down".to_owned()));

        let server = RemoteAssistantClient::map_http_error(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "boom",
        );
        assert_eq!(server, RemoteError::Other("HTTP 500: boom".to_owned()));
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        assert_eq!(extract_error_message("not json at all"), "not json at all");
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"quota exceeded"}}"#),
            "quota exceeded"
        );
    }

    #[test]
    fn reply_extraction_requires_content() {
        let ok = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "París" } }]
        });
        assert_eq!(extract_reply(&ok), Some("París".to_owned()));

        let empty_choices = serde_json::json!({ "choices": [] });
        assert_eq!(extract_reply(&empty_choices), None);

        let no_content = serde_json::json!({
            "choices": [{ "message": { "role": "assistant" } }]
        });
        assert_eq!(extract_reply(&no_content), None);

        let blank = serde_json::json!({
            "choices": [{ "message": { "content": "   " } }]
        });
        assert_eq!(extract_reply(&blank), None);
    }
}
