//! Shared bot state
//!
//! One explicit context object instead of ambient globals: constructed once
//! at startup, handed to the gateway handler and the HTTP surface as an
//! `Arc`, torn down on the shutdown signal.

use std::sync::Arc;
use std::time::Instant;

use crate::config::BotConfig;
use crate::discord::CooldownTracker;
use crate::presence::PresenceTracker;
use crate::rcon::RconSession;
use crate::restart::{RestartFlag, RestartSequencer};

/// Shared application state
pub struct BotState {
    /// Loaded configuration
    pub config: BotConfig,

    /// RCON session manager
    pub session: Arc<RconSession>,

    /// Player presence tracker
    pub presence: Arc<PresenceTracker>,

    /// Restart sequencer
    pub sequencer: Arc<RestartSequencer>,

    /// Restart-in-progress flag
    pub restart_flag: Arc<RestartFlag>,

    /// Per-(command, user) cooldowns
    pub cooldowns: CooldownTracker,

    /// Process start time, for the health endpoint's uptime field
    pub start_time: Instant,
}
