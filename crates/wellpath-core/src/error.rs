//! Error types for channel storage, survey integration and configuration.

/// Errors raised by [`ChannelFile`](crate::channel::ChannelFile) adapters.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel '{name}' has {actual} samples, index has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("channel '{0}' already exists")]
    DuplicateName(String),
    #[error("invalid channel name: '{0}'")]
    InvalidName(String),
}

/// Errors raised by [`SurveyIntegrator`](crate::survey::SurveyIntegrator).
///
/// Survey output feeds well placement, so every operation fails fast
/// instead of writing partial results.
#[derive(Debug, thiserror::Error)]
pub enum SurveyError {
    #[error("required survey channel '{0}' not found")]
    MissingChannel(String),
    #[error("cannot create survey output channel '{name}': {source}")]
    ChannelCreation {
        name: String,
        #[source]
        source: ChannelError,
    },
}

/// Errors raised while loading [`Tolerances`](crate::config::Tolerances).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid tolerance document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
}
