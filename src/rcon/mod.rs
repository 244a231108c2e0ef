//! RCON session management
//!
//! Game-server RCON transports are flaky: short-lived TCP sessions that the
//! server drops between commands, timeouts under load, restarts. This module
//! centralizes connection ownership, lazy reconnection, and bounded retry so
//! that no other component ever handles a low-level transport failure;
//! callers see `Option<String>` / `bool` results, never errors.

pub mod sanitize;
pub mod session;
pub mod transport;

pub use sanitize::sanitize_broadcast;
pub use session::{RconSession, SessionConfig};
pub use transport::{RconConnector, RconLink, ZomboidConnector};

use thiserror::Error;

/// Errors raised by the RCON transport layer
///
/// These never escape [`RconSession`]; they exist for the transport seam and
/// for attempt-level logging.
#[derive(Error, Debug)]
pub enum RconError {
    /// Opening or authenticating the connection failed
    #[error("RCON connect failed: {0}")]
    Connect(String),

    /// Executing a command on an established connection failed
    #[error("RCON command failed: {0}")]
    Exec(String),
}

impl RconError {
    /// Transport failures are transient by definition; the session manager
    /// retries them with a fresh connection.
    pub fn is_recoverable(&self) -> bool {
        true
    }
}

/// Result type for RCON transport operations
pub type RconResult<T> = Result<T, RconError>;
