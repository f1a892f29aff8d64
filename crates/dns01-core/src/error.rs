//! Error types for the DNS-01 solver
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for solver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DNS-01 solver
#[derive(Error, Debug)]
pub enum Error {
    /// No record matches the requested name and type
    ///
    /// This is an expected condition: it drives create-on-present and
    /// no-op-on-cleanup and is never returned from `present`/`cleanup`.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Configuration errors (payload decoding, missing credentials)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The referenced credentials secret could not be fetched
    #[error("failed to load secret {namespace}/{name}: {message}")]
    Secret {
        /// Namespace the secret was looked up in
        namespace: String,
        /// Secret name
        name: String,
        /// Underlying cause
        message: String,
    },

    /// Challenge action other than `Present` or `CleanUp`
    #[error("unsupported challenge action: {0}")]
    UnsupportedAction(String),

    /// Provider-specific error, passed through untranslated
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Secret store I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown solver name
    #[error("Unknown solver: {0}")]
    UnknownSolver(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a secret fetch error
    pub fn secret(
        namespace: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Secret {
            namespace: namespace.into(),
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported action error
    pub fn unsupported_action(action: impl Into<String>) -> Self {
        Self::UnsupportedAction(action.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this is the distinguished "record not found" condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
