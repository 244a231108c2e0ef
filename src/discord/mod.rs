//! Discord gateway integration
//!
//! The thin outer shell of the bot: gateway client setup, the event handler,
//! text-command parsing and dispatch, and per-(command, user) cooldowns.
//! Everything with actual control-flow complexity lives in the library
//! modules this layer calls into.

pub mod client;
pub mod commands;
pub mod cooldown;
pub mod handler;

pub use client::build_client;
pub use commands::{parse_command, parse_greeting, Command, Greeting};
pub use cooldown::{CooldownStatus, CooldownTracker};
pub use handler::Handler;
