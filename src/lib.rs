//! palisade - Game-server warden bot
//!
//! A single-process bot that bridges a Project Zomboid server's RCON console
//! with a Discord guild: player join/leave relaying, a staged restart
//! countdown, moderator commands, and an HTTP liveness endpoint.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Environment-driven configuration and validation
//! - [`rcon`] - RCON session management with retry and reconnection
//! - [`presence`] - Player-list polling and join/leave diffing
//! - [`restart`] - The staged restart countdown sequencer
//! - [`scheduler`] - Recurring wall-clock restart trigger
//! - [`notifications`] - Chat notification seam and the Discord sink
//! - [`discord`] - Gateway client, command dispatch, cooldowns
//! - [`http`] - Liveness and health endpoints
//!
//! # Example
//!
//! ```no_run
//! use palisade::config::BotConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = BotConfig::from_env()?;
//!     config.validate()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod discord;
pub mod error;
pub mod http;
pub mod notifications;
pub mod presence;
pub mod rcon;
pub mod restart;
pub mod scheduler;
pub mod state;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::BotConfig;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::notifications::{MessageRef, Notifier};
    pub use crate::presence::PresenceTracker;
    pub use crate::rcon::{RconConnector, RconLink, RconSession};
    pub use crate::restart::{RestartFlag, RestartOutcome, RestartSequencer};
    pub use crate::scheduler::ScheduleSpec;
    pub use crate::state::BotState;
}
