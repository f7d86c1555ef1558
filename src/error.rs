//! Error types for the assistant.

/// Top-level error type for the voice assistant.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Speech capture device or recognition engine error.
    #[error("capture error: {0}")]
    Capture(String),

    /// Speech synthesis error.
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// Remote completion endpoint error.
    #[error("remote error: {0}")]
    Remote(String),

    /// Browser action dispatch error.
    #[error("action error: {0}")]
    Action(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AssistantError>;
