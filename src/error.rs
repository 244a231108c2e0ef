//! Unified error handling for the palisade crate
//!
//! Domain-specific errors live next to the modules that raise them; this
//! module consolidates them into a single [`Error`] enum for use across
//! module boundaries, with a coarse [`ErrorCategory`] classification for
//! handling strategies.
//!
//! Note that RCON failures deliberately do NOT travel through this type on
//! the hot path: the session manager surfaces them as `Option`/`bool`
//! return values so its callers branch on failure instead of handling
//! errors (see [`crate::rcon::RconSession`]).

use std::io;
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::notifications::NotifyError;
pub use crate::rcon::RconError;
pub use crate::scheduler::ScheduleError;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// RCON transport errors (connect, command execution)
    Rcon,
    /// Chat-platform errors (send, delete, gateway)
    Chat,
    /// Scheduler and schedule-parsing errors
    Scheduler,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

/// Unified error type for the palisade crate
#[derive(Error, Debug)]
pub enum Error {
    /// RCON transport errors
    #[error("RCON error: {0}")]
    Rcon(#[from] RconError),

    /// Chat-platform errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Scheduler errors
    #[error("Scheduler error: {0}")]
    Schedule(#[from] ScheduleError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Check if this error is transient and worth retrying
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Rcon(e) => e.is_recoverable(),
            Self::Notify(_) => true,
            Self::Schedule(_) => false,
            Self::Io(_) => true,
            Self::Json(_) => false,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Rcon(_) => ErrorCategory::Rcon,
            Self::Notify(_) => ErrorCategory::Chat,
            Self::Schedule(_) => ErrorCategory::Scheduler,
            Self::Config(_) => ErrorCategory::Config,
            Self::Io(_) | Self::Json(_) | Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let err = Error::from(RconError::Connect("refused".into()));
        assert_eq!(err.category(), ErrorCategory::Rcon);

        let err = Error::from(NotifyError::Platform("gateway down".into()));
        assert_eq!(err.category(), ErrorCategory::Chat);
    }

    #[test]
    fn test_is_recoverable() {
        let err = Error::from(RconError::Connect("refused".into()));
        assert!(err.is_recoverable());

        let err = Error::config("missing token");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("RCON_PORT must be numeric");
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(err.to_string().contains("RCON_PORT"));
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("something went wrong");
        assert_eq!(err.category(), ErrorCategory::Other);
    }
}
