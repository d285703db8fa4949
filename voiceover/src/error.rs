use thiserror::Error;

/// Failures surfaced by speech services.
///
/// Provider-specific errors never escape a service; they are folded into
/// [`VoiceoverError::ProviderUnavailable`] or [`VoiceoverError::SynthesisFailed`].
/// Filesystem errors from the cache are passed through untouched.
#[derive(Debug, Error)]
pub enum VoiceoverError {
    #[error(
        "missing credential: set {} in the environment or in a .env file",
        .vars.join(", ")
    )]
    MissingCredential { vars: Vec<String> },
    #[error("speech provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("no voices available from the speech provider")]
    NoVoicesAvailable,
    #[error("invalid option: {0}")]
    InvalidOption(String),
    #[error("failed to generate speech: {0}")]
    SynthesisFailed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result type used throughout this crate.
pub type Result<T> = std::result::Result<T, VoiceoverError>;
