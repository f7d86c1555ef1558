//! Speech synthesis port.
//!
//! Speech output is best-effort: a runtime without a speaker still runs a
//! full conversation, it just runs it silently. Implementations must never
//! leave the caller waiting on an utterance that can no longer complete.

use crate::config::SynthesisConfig;
use async_trait::async_trait;

/// A unit of speech output corresponding to one response text.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Text to render as speech.
    pub text: String,
    /// BCP 47 language tag.
    pub language: String,
    /// Speaking rate (1.0 = normal).
    pub rate: f32,
    /// Voice pitch (1.0 = normal).
    pub pitch: f32,
}

impl Utterance {
    /// Build an utterance for the configured voice.
    #[must_use]
    pub fn new(text: impl Into<String>, config: &SynthesisConfig) -> Self {
        Self {
            text: text.into(),
            language: config.language.clone(),
            rate: config.rate,
            pitch: config.pitch,
        }
    }
}

/// Speech synthesis failure.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    /// Playback started but did not complete.
    #[error("playback failed: {0}")]
    Playback(String),
}

/// Speech synthesis engine.
///
/// `speak` resolves once the utterance has finished playing and reports a
/// [`SynthesisError`] if playback fails. A runtime without synthesis
/// support resolves immediately without error ([`NullSynthesis`] is that
/// rule as a type). `cancel_all` discards queued and playing utterances;
/// callers invoke it before opening a new capture session so the
/// microphone does not hear the assistant's own voice.
#[async_trait]
pub trait SpeechSynthesis: Send {
    /// Render an utterance as audible speech and wait for completion.
    async fn speak(&mut self, utterance: &Utterance) -> Result<(), SynthesisError>;

    /// Discard any queued or in-progress utterances.
    async fn cancel_all(&mut self);
}

/// Synthesis for runtimes without a speaker: every utterance completes
/// immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSynthesis;

#[async_trait]
impl SpeechSynthesis for NullSynthesis {
    async fn speak(&mut self, _utterance: &Utterance) -> Result<(), SynthesisError> {
        Ok(())
    }

    async fn cancel_all(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utterance_carries_configured_voice() {
        let config = SynthesisConfig::default();
        let utterance = Utterance::new("Abriendo YouTube", &config);
        assert_eq!(utterance.text, "Abriendo YouTube");
        assert_eq!(utterance.language, "es-ES");
        assert!((utterance.rate - 1.0).abs() < f32::EPSILON);
        assert!((utterance.pitch - 1.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn null_synthesis_never_blocks() {
        let mut synthesis = NullSynthesis;
        let utterance = Utterance::new("hola", &SynthesisConfig::default());
        synthesis.speak(&utterance).await.expect("null synthesis cannot fail");
        synthesis.cancel_all().await;
    }
}
