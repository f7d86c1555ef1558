//! Configuration types for the voice assistant.

use crate::error::{AssistantError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration for the assistant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Speech capture settings.
    pub capture: CaptureConfig,
    /// Speech synthesis settings.
    pub synthesis: SynthesisConfig,
    /// Remote completion endpoint settings.
    pub remote: RemoteConfig,
    /// Conversation loop behavior.
    pub conversation: ConversationConfig,
}

impl AssistantConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AssistantError::Config(format!("failed to read config {}: {e}", path.display()))
        })?;
        toml::from_str(&raw)
            .map_err(|e| AssistantError::Config(format!("invalid config {}: {e}", path.display())))
    }
}

/// Speech capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// BCP 47 language tag passed to the recognition engine.
    pub language: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            language: "es-ES".to_owned(),
        }
    }
}

/// Speech synthesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// BCP 47 language tag for synthesized speech.
    pub language: String,
    /// Speaking rate (1.0 = normal).
    pub rate: f32,
    /// Voice pitch (1.0 = normal).
    pub pitch: f32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            language: "es-ES".to_owned(),
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

/// API key reference for the remote completion endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiKeyRef {
    /// No API key; requests are sent without an Authorization header.
    #[default]
    None,
    /// Inline literal key (discouraged; prefer env).
    Literal { value: String },
    /// Resolve the key from an environment variable.
    Env { var: String },
}

impl ApiKeyRef {
    /// Resolve the reference to an actual key.
    ///
    /// # Errors
    ///
    /// Returns an error if the referenced environment variable is missing
    /// or empty.
    pub fn resolve(&self) -> Result<Option<String>> {
        match self {
            Self::None => Ok(None),
            Self::Literal { value } => Ok(Some(value.clone())),
            Self::Env { var } => {
                let value = std::env::var(var).map_err(|_| {
                    AssistantError::Config(format!("API key env var is missing: {var}"))
                })?;
                if value.trim().is_empty() {
                    return Err(AssistantError::Config(format!(
                        "API key env var is empty: {var}"
                    )));
                }
                Ok(Some(value))
            }
        }
    }
}

/// Remote completion endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Provider base URL, with or without the `/v1` suffix.
    pub api_url: String,
    /// Model identifier sent with each request.
    pub api_model: String,
    /// Bearer credential reference.
    pub api_key: ApiKeyRef,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Bounded wait for a reply, in seconds. The endpoint gets exactly one
    /// attempt; an elapsed timeout surfaces as a network failure.
    pub request_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com".to_owned(),
            api_model: "gpt-4o-mini".to_owned(),
            api_key: ApiKeyRef::None,
            temperature: 0.7,
            max_tokens: 256,
            request_timeout_secs: 30,
        }
    }
}

/// What to do when the recognition engine stops on its own.
///
/// Both behaviors exist in the wild: some front ends immediately reopen the
/// microphone, others wait for the user to start listening again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndOfCapturePolicy {
    /// Return to idle; the user must start listening again.
    #[default]
    ReturnToIdle,
    /// Reopen capture after `restart_delay_ms`.
    Restart,
}

/// Conversation loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Behavior when capture ends without an explicit stop.
    pub end_of_capture: EndOfCapturePolicy,
    /// Delay before reopening capture under [`EndOfCapturePolicy::Restart`],
    /// in milliseconds.
    pub restart_delay_ms: u64,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            end_of_capture: EndOfCapturePolicy::ReturnToIdle,
            restart_delay_ms: 500,
        }
    }
}
