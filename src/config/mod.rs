//! Configuration management for the warden bot
//!
//! All configuration is environment-provided. Required variables are checked
//! up front and reported as a single enumerated list so a misconfigured
//! deployment fails immediately instead of limping along.

use anyhow::{Context, Result};
use std::time::Duration;

use crate::scheduler::ScheduleSpec;

/// Required environment variables; startup fails if any is missing or blank.
const REQUIRED_VARS: [&str; 5] = [
    "DISCORD_TOKEN",
    "RCON_HOST",
    "RCON_PORT",
    "RCON_PASSWORD",
    "NOTIFICATIONS_CHANNEL_ID",
];

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Discord bot token
    pub discord_token: String,

    /// Game-server RCON host
    pub rcon_host: String,

    /// Game-server RCON port
    pub rcon_port: u16,

    /// Game-server RCON password
    pub rcon_password: String,

    /// Channel for join/leave and restart notifications
    pub notifications_channel_id: u64,

    /// Channel for greeting/member relays
    pub target_channel_id: u64,

    /// Default channel for cross-posted announcements
    pub announcement_channel_id: u64,

    /// Role allowed to run privileged commands; `None` falls back to the
    /// Administrator permission
    pub admin_role_id: Option<u64>,

    /// Restart schedule, e.g. `every 8h` or `04:00,12:00,20:00`
    pub restart_schedule: String,

    /// HTTP liveness port
    pub http_port: u16,

    /// Player-list poll interval in seconds
    pub poll_interval_secs: u64,
}

impl BotConfig {
    /// Load configuration from environment variables
    ///
    /// Fails with an enumerated list of every missing required variable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .filter(|name| lookup(name).map_or(true, |v| v.trim().is_empty()))
            .copied()
            .collect();

        if !missing.is_empty() {
            anyhow::bail!(
                "missing required environment variables: {}",
                missing.join(", ")
            );
        }

        let discord_token = lookup("DISCORD_TOKEN").unwrap_or_default();
        let rcon_host = lookup("RCON_HOST").unwrap_or_default();
        let rcon_password = lookup("RCON_PASSWORD").unwrap_or_default();

        let rcon_port = lookup("RCON_PORT")
            .unwrap_or_default()
            .trim()
            .parse::<u16>()
            .context("RCON_PORT must be a valid port number")?;

        let notifications_channel_id = parse_id(&lookup, "NOTIFICATIONS_CHANNEL_ID")?
            .context("NOTIFICATIONS_CHANNEL_ID is required")?;

        // Secondary channels fall back to the notifications channel.
        let target_channel_id =
            parse_id(&lookup, "TARGET_CHANNEL_ID")?.unwrap_or(notifications_channel_id);
        let announcement_channel_id =
            parse_id(&lookup, "ANNOUNCEMENT_CHANNEL_ID")?.unwrap_or(notifications_channel_id);

        let admin_role_id = parse_id(&lookup, "ADMIN_ROLE_ID")?;

        let restart_schedule =
            lookup("RESTART_SCHEDULE").unwrap_or_else(|| String::from("every 8h"));

        let http_port = match lookup("HTTP_PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .context("HTTP_PORT must be a valid port number")?,
            None => 3000,
        };

        let poll_interval_secs = match lookup("POLL_INTERVAL_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .context("POLL_INTERVAL_SECS must be a number of seconds")?,
            None => 30,
        };

        Ok(Self {
            discord_token,
            rcon_host,
            rcon_port,
            rcon_password,
            notifications_channel_id,
            target_channel_id,
            announcement_channel_id,
            admin_role_id,
            restart_schedule,
            http_port,
            poll_interval_secs,
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.rcon_port == 0 {
            anyhow::bail!("RCON_PORT must be greater than 0");
        }

        if self.poll_interval_secs == 0 {
            anyhow::bail!("POLL_INTERVAL_SECS must be greater than 0");
        }

        ScheduleSpec::parse(&self.restart_schedule)
            .with_context(|| format!("invalid RESTART_SCHEDULE '{}'", self.restart_schedule))?;

        Ok(())
    }

    /// Get the player-list poll interval as a Duration
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// RCON address in `host:port` form
    #[must_use]
    pub fn rcon_address(&self) -> String {
        format!("{}:{}", self.rcon_host, self.rcon_port)
    }

    /// Format as display string, masking secrets
    pub fn display(&self) -> String {
        format!(
            "Warden Bot Configuration\n\
             {:-<40}\n\
             RCON Address: {}\n\
             RCON Password: ****\n\
             Discord Token: ****\n\
             Notifications Channel: {}\n\
             Target Channel: {}\n\
             Announcement Channel: {}\n\
             Admin Role: {}\n\
             Restart Schedule: {}\n\
             HTTP Port: {}\n\
             Poll Interval: {}s",
            "",
            self.rcon_address(),
            self.notifications_channel_id,
            self.target_channel_id,
            self.announcement_channel_id,
            self.admin_role_id
                .map_or_else(|| String::from("(administrator permission)"), |id| id.to_string()),
            self.restart_schedule,
            self.http_port,
            self.poll_interval_secs,
        )
    }
}

/// Parse an optional numeric identifier variable; blank counts as unset.
fn parse_id(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<u64>> {
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => {
            let id = v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{name} must be a numeric identifier"))?;
            if id == 0 {
                anyhow::bail!("{name} must be non-zero");
            }
            Ok(Some(id))
        }
        _ => Ok(None),
    }
}
