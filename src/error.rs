//! Error types for temporal-provider

use thiserror::Error;

/// Errors that can occur while planning or applying Temporal resources
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Malformed duration string (e.g. `"5x"`, `""`)
    #[error("Invalid duration '{input}': {reason}")]
    InvalidDuration { input: String, reason: String },

    /// Malformed schedule spec string (field count, domain, range, step, shorthand)
    #[error("Invalid schedule spec '{input}': {reason}")]
    InvalidSpec { input: String, reason: String },

    /// Attribute failed plan-time validation
    #[error("Invalid value for attribute '{attribute}': {reason}")]
    Validation { attribute: String, reason: String },

    /// Remote entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote entity already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Remote call failed
    #[error("Temporal error: {0}")]
    Client(String),

    /// Provider configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProviderError {
    pub(crate) fn invalid_duration(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDuration {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_spec(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSpec {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn validation(attribute: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            attribute: attribute.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error means the remote entity is gone
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;
