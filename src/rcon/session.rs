//! RCON session manager
//!
//! Owns the single RCON connection. Commands are serialized through an async
//! mutex, the handle is rebuilt lazily whenever an attempt fails, and every
//! failure mode collapses into `Option` / `bool` results at this boundary.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::sanitize::sanitize_broadcast;
use super::transport::{RconConnector, RconLink};
use super::RconResult;

/// Retry behavior for RCON command execution
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum attempts per command
    pub max_attempts: u32,

    /// Fixed delay between failed attempts
    pub retry_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
        }
    }
}

/// The RCON session manager
///
/// At most one connection handle is alive at a time. A failed attempt drops
/// the handle so the next attempt reconnects from scratch; stale-handle close
/// errors are swallowed by the drop.
pub struct RconSession {
    connector: Arc<dyn RconConnector>,
    link: Mutex<Option<Box<dyn RconLink>>>,
    config: SessionConfig,
}

impl RconSession {
    /// Create a session manager with default retry behavior
    pub fn new(connector: Arc<dyn RconConnector>) -> Self {
        Self::with_config(connector, SessionConfig::default())
    }

    /// Create a session manager with custom retry behavior
    pub fn with_config(connector: Arc<dyn RconConnector>, config: SessionConfig) -> Self {
        Self {
            connector,
            link: Mutex::new(None),
            config,
        }
    }

    /// Execute a raw RCON command
    ///
    /// Attempts up to `max_attempts` times, reconnecting before each attempt
    /// if the stored handle is gone or stale, sleeping `retry_delay` between
    /// failures. Returns the first successful response, or `None` once all
    /// attempts are exhausted. Never returns an error.
    pub async fn send_command(&self, command: &str) -> Option<String> {
        let mut link = self.link.lock().await;

        for attempt in 1..=self.config.max_attempts {
            match self.attempt(&mut link, command).await {
                Ok(response) => {
                    debug!(command, attempt, "RCON command succeeded");
                    return Some(response);
                }
                Err(e) => {
                    // Invalidate the handle so the next attempt reconnects.
                    *link = None;
                    warn!(
                        command,
                        attempt,
                        max_attempts = self.config.max_attempts,
                        error = %e,
                        "RCON command attempt failed"
                    );

                    if attempt < self.config.max_attempts {
                        tokio::time::sleep(self.config.retry_delay).await;
                    }
                }
            }
        }

        error!(command, "RCON command failed after all attempts exhausted");
        None
    }

    /// Broadcast a message to all players in-game
    ///
    /// The text is sanitized first; if nothing survives sanitization the
    /// broadcast is refused without touching the network. Returns `false`
    /// iff the message was not delivered.
    pub async fn broadcast(&self, text: &str) -> bool {
        let sanitized = sanitize_broadcast(text);
        if sanitized.is_empty() {
            warn!("refusing to broadcast empty message");
            return false;
        }

        let command = format!("servermsg \"{sanitized}\"");
        match self.send_command(&command).await {
            Some(_) => {
                info!(message = %sanitized, "in-game broadcast delivered");
                true
            }
            None => false,
        }
    }

    /// Whether a connection handle is currently held
    pub async fn is_connected(&self) -> bool {
        self.link.lock().await.is_some()
    }

    /// Drop the stored connection handle, if any
    ///
    /// Close errors are ignored; the transport shuts the socket down on drop.
    pub async fn disconnect(&self) {
        let mut link = self.link.lock().await;
        if link.take().is_some() {
            info!("RCON connection closed");
        }
    }

    /// One attempt: ensure a live handle, then execute.
    async fn attempt(
        &self,
        slot: &mut Option<Box<dyn RconLink>>,
        command: &str,
    ) -> RconResult<String> {
        self.ensure_link(slot).await?;
        match slot.as_mut() {
            Some(link) => link.exec(command).await,
            None => Err(super::RconError::Connect(String::from(
                "connection handle missing after connect",
            ))),
        }
    }

    /// Reuse the stored handle when present and authenticated, otherwise
    /// replace it. A failed connect leaves the slot empty so the next call
    /// starts from scratch.
    async fn ensure_link(&self, slot: &mut Option<Box<dyn RconLink>>) -> RconResult<()> {
        if slot.as_ref().is_some_and(|link| link.is_authenticated()) {
            return Ok(());
        }

        *slot = None;
        match self.connector.connect().await {
            Ok(link) => {
                info!("RCON connection established");
                *slot = Some(link);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "failed to connect to RCON");
                Err(e)
            }
        }
    }
}
