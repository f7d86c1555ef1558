//! Speech capture port.
//!
//! Wraps a platform continuous speech recognition engine behind a uniform
//! event stream: start confirmation, finalized transcripts, categorized
//! errors, and an end-of-capture marker. Interim results never cross this
//! boundary.

use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Buffer size for capture event channels.
pub const CAPTURE_CHANNEL_SIZE: usize = 16;

/// Events emitted by a speech capture engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// The engine started listening.
    Started,
    /// A finalized transcript. May be empty or whitespace-only.
    Transcript(String),
    /// The engine reported an error.
    Error(CaptureErrorKind),
    /// The engine stopped on its own (end of speech, engine timeout).
    Ended,
}

/// Categorized speech recognition errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureErrorKind {
    /// No speech was detected. Recoverable; never surfaced to the user.
    NoSpeech,
    /// Microphone permission was denied. Fatal for the session.
    PermissionDenied,
    /// Audio could not be captured from the device.
    AudioCapture,
    /// Network failure inside the recognition engine.
    Network,
    /// The runtime has no speech recognition capability. Fatal for the session.
    Unsupported,
    /// An engine error code with no mapping here.
    Unknown(String),
}

impl CaptureErrorKind {
    /// Normalize a raw engine error code.
    #[must_use]
    pub fn from_engine_code(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeech,
            "not-allowed" | "permission-denied" => Self::PermissionDenied,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            other => Self::Unknown(other.to_owned()),
        }
    }

    /// Whether this error ends the session: capture must not be reopened.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::Unsupported)
    }

    /// Whether this error is silent: recoverable and never shown to the user.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::NoSpeech)
    }
}

/// Continuous speech capture engine.
///
/// `open` requests device permission before the first capture attempt; a
/// denial is reported as [`CaptureEvent::Error`] with
/// [`CaptureErrorKind::PermissionDenied`] on the returned stream, never
/// swallowed. The engine keeps listening across utterances until `close`
/// is called; when it stops on its own it emits [`CaptureEvent::Ended`],
/// and the caller decides whether to reopen.
#[async_trait]
pub trait SpeechCapture: Send {
    /// Start capturing with the given BCP 47 language tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be constructed at all.
    /// Runtime conditions (permission, device loss) are reported as
    /// events on the stream instead.
    async fn open(&mut self, language: &str) -> Result<mpsc::Receiver<CaptureEvent>>;

    /// Stop capturing and release the device.
    async fn close(&mut self);
}
