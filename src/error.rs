//! Error types for the destiny quiz.

use std::time::Duration;

/// Top-level error type.
///
/// Only startup can fail with one of these. Once a session is running, every
/// failure has a fallback that keeps the step sequence moving.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of a single reading generation call.
///
/// All of these are caught at the gate boundary and turned into a fallback
/// reading or an empty slot; none reach the screens.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Output for {reading} reading was cut off at the token limit")]
    Truncated { reading: &'static str },

    #[error("Empty response for {reading} reading")]
    EmptyResponse { reading: &'static str },

    #[error("Malformed {reading} reading: {reason}")]
    Malformed {
        reading: &'static str,
        reason: String,
    },

    #[error("Invalid {reading} reading: {reason}")]
    Invalid {
        reading: &'static str,
        reason: String,
    },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
