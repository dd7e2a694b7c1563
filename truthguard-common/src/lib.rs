//! Common types and utilities shared across TruthGuard crates.
//!
//! This crate defines the shared error type, observability helpers, and the
//! small enums every other crate agrees on. It stays dependency-light so the
//! analysis core, the transport, and the binaries can all depend on it.
//!
//! # Overview
//!
//! - [`TruthGuardError`] and [`Result`]: shared error handling
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use truthguard_common::TruthGuardError;
//!
//! let err = TruthGuardError::Validation("text must not be empty".into());
//! assert!(err.is_recoverable());
//! assert_eq!(err.to_string(), "Validation error: text must not be empty");
//! ```

pub mod observability;

/// Error kinds surfaced by the analysis pipeline.
///
/// Every variant is recoverable at the interaction boundary: the controller
/// returns to idle and hands the error back to the caller.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TruthGuardError {
    /// The analysis service could not be reached or answered with a non-2xx status.
    #[error("Transport error{}: {message}", status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The service answered, but without enough data to derive a verdict or confidence.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The submitted input was rejected before any request was issued.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A submission is already in flight.
    #[error("An analysis is already in progress")]
    Busy,

    /// The in-flight analysis was aborted or reset.
    #[error("Analysis was cancelled")]
    Cancelled,

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TruthGuardError {
    /// Shorthand for a transport failure that never reached an HTTP status.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// All analysis errors leave the process usable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }

    /// Short text suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { .. } | Self::MalformedResponse(_) => {
                "Analysis failed. Please try again.".to_string()
            }
            Self::Validation(reason) => format!("Cannot analyze yet: {reason}"),
            Self::Busy => "An analysis is already running.".to_string(),
            Self::Cancelled => "Analysis was cancelled.".to_string(),
            Self::Config(reason) => format!("TruthGuard is misconfigured: {reason}"),
        }
    }
}

/// Convenient alias for results that use [`TruthGuardError`].
pub type Result<T> = std::result::Result<T, TruthGuardError>;
