//! Common error types for Lifeline.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`LifelineError`].
pub type LifelineResult<T> = Result<T, LifelineError>;

/// Errors shared by every Lifeline crate.
#[derive(Error, Diagnostic, Debug)]
pub enum LifelineError {
    /// No entity is registered under this container ID.
    #[error("Container not found: {id}")]
    #[diagnostic(code(lifeline::entity::not_found))]
    EntityNotFound {
        /// The container ID that was not found.
        id: String,
    },

    /// No notification channel exists with this ID.
    #[error("Notification channel not found: {id}")]
    #[diagnostic(code(lifeline::channel::not_found))]
    ChannelNotFound {
        /// The channel ID that was not found.
        id: String,
    },

    /// Invalid container ID format.
    #[error("Invalid container ID: {id}")]
    #[diagnostic(
        code(lifeline::entity::invalid_id),
        help("Container IDs are alphanumeric with hyphens, underscores and dots, 1-128 characters")
    )]
    InvalidContainerId {
        /// The invalid container ID.
        id: String,
    },

    /// The container runtime could not be reached or answered with an error.
    #[error("Container runtime error: {message}")]
    #[diagnostic(
        code(lifeline::runtime),
        help("Check that the Docker socket is reachable and readable by this process")
    )]
    Runtime {
        /// The error message.
        message: String,
    },

    /// The runtime event subscription ended.
    #[error("Runtime event stream closed")]
    #[diagnostic(
        code(lifeline::runtime::stream_closed),
        help("The connection to the container runtime was lost; restart the daemon")
    )]
    EventStreamClosed,

    /// A store read or write failed.
    #[error("Storage error: {message}")]
    #[diagnostic(code(lifeline::storage))]
    Storage {
        /// The error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(lifeline::io))]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    #[diagnostic(code(lifeline::serialization))]
    Serialization(String),

    /// A notification target could not be parsed.
    #[error("Invalid notification target '{target}': {reason}")]
    #[diagnostic(
        code(lifeline::notify::invalid_target),
        help("Targets are URLs such as 'https://example.com/hook' or 'slack://A/B/C'")
    )]
    InvalidTarget {
        /// The offending target.
        target: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No transport is registered for the target's scheme.
    #[error("Unsupported notification transport: {scheme}")]
    #[diagnostic(
        code(lifeline::notify::unsupported),
        help("Supported schemes: http, https, generic, slack, discord, telegram, ntfy")
    )]
    UnsupportedTransport {
        /// The unknown scheme.
        scheme: String,
    },

    /// A transport failed to deliver a message.
    #[error("Failed to send notification via {transport}: {message}")]
    #[diagnostic(code(lifeline::notify::send))]
    Send {
        /// The transport scheme used.
        transport: String,
        /// The error message.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(lifeline::config))]
    Config {
        /// The error message.
        message: String,
    },

    /// Internal error (should not happen).
    #[error("Internal error: {message}")]
    #[diagnostic(code(lifeline::internal), help("This is a bug, please report it"))]
    Internal {
        /// The error message.
        message: String,
    },
}

impl LifelineError {
    /// Returns true for errors that mean "the thing asked for does not exist".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::EntityNotFound { .. } | Self::ChannelNotFound { .. }
        )
    }

    /// Returns true for errors caused by bad caller input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidContainerId { .. }
                | Self::InvalidTarget { .. }
                | Self::UnsupportedTransport { .. }
                | Self::Config { .. }
        )
    }

    /// Shorthand for a [`LifelineError::Storage`] error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Shorthand for a [`LifelineError::Runtime`] error.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for LifelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
