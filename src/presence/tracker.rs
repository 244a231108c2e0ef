//! Presence polling and join/leave diffing
//!
//! Each poll takes a full snapshot of the previous set, parses the current
//! player list, and applies the two set differences. Updates are
//! notify-then-mutate per player: if the process dies mid-loop, the stored
//! set still matches exactly what has been announced so far.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::notifications::Notifier;
use crate::rcon::RconSession;

use super::history::NoticeHistory;
use super::parser::parse_player_list;

/// Timing configuration for the tracker
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// How often to poll the player list
    pub poll_interval: Duration,

    /// Delay before a player's leave notices are deleted
    pub leave_delete_delay: Duration,

    /// How often the history purge sweep runs
    pub sweep_interval: Duration,

    /// Maximum age of a history entry before the sweep drops it
    pub history_max_age: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            leave_delete_delay: Duration::from_secs(3),
            sweep_interval: Duration::from_secs(30 * 60),
            history_max_age: Duration::from_secs(60 * 60),
        }
    }
}

/// The presence tracker
pub struct PresenceTracker {
    session: Arc<RconSession>,
    notifier: Arc<dyn Notifier>,
    notify_channel: u64,
    players: RwLock<BTreeSet<String>>,
    history: Arc<NoticeHistory>,
    config: TrackerConfig,
}

impl PresenceTracker {
    /// Create a tracker that announces into `notify_channel`
    pub fn new(
        session: Arc<RconSession>,
        notifier: Arc<dyn Notifier>,
        notify_channel: u64,
        config: TrackerConfig,
    ) -> Self {
        Self {
            session,
            notifier,
            notify_channel,
            players: RwLock::new(BTreeSet::new()),
            history: Arc::new(NoticeHistory::new()),
            config,
        }
    }

    /// Run one poll cycle
    ///
    /// A failed `players` command abandons the cycle: the stored set is left
    /// untouched and the failure is only logged. This makes polls harmless
    /// no-ops while the server is down or restarting.
    pub async fn poll(&self) {
        let Some(response) = self.session.send_command("players").await else {
            warn!("player poll abandoned, RCON unavailable");
            return;
        };

        let current = parse_player_list(&response);
        let previous = self.players.read().await.clone();

        let joined: Vec<String> = current.difference(&previous).cloned().collect();
        let left: Vec<String> = previous.difference(&current).cloned().collect();

        if !joined.is_empty() || !left.is_empty() {
            debug!(
                joined = joined.len(),
                left = left.len(),
                online = current.len(),
                "presence delta"
            );
        }

        for player in joined {
            self.announce_join(&player).await;
            self.players.write().await.insert(player);
        }

        for player in left {
            self.announce_leave(&player).await;
            self.players.write().await.remove(&player);
        }
    }

    /// Snapshot of the currently-known-online players
    pub async fn snapshot(&self) -> BTreeSet<String> {
        self.players.read().await.clone()
    }

    /// Number of currently-known-online players
    pub async fn online_count(&self) -> usize {
        self.players.read().await.len()
    }

    /// Clear the tracked set
    ///
    /// Called when a restart is confirmed: whatever we knew is stale.
    pub async fn clear(&self) {
        self.players.write().await.clear();
        info!("presence set cleared");
    }

    /// Spawn the recurring poll loop; the first poll runs immediately.
    pub fn spawn_poll_loop(self: Arc<Self>) -> JoinHandle<()> {
        info!(
            interval_secs = self.config.poll_interval.as_secs(),
            "starting player monitoring"
        );
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.poll_interval);
            loop {
                ticker.tick().await;
                // Task boundary: a panic in one cycle must not kill the loop.
                if std::panic::AssertUnwindSafe(self.poll())
                    .catch_unwind()
                    .await
                    .is_err()
                {
                    error!("presence poll panicked");
                }
            }
        })
    }

    /// Spawn the recurring history purge sweep.
    pub fn spawn_history_sweep(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.sweep_interval);
            // The immediate first tick would purge an empty map; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let max_age = chrono::Duration::from_std(self.config.history_max_age)
                    .unwrap_or_else(|_| chrono::Duration::hours(1));
                let purged = self.history.purge_older_than(max_age).await;
                if purged > 0 {
                    debug!(purged, "notification history sweep");
                }
            }
        })
    }

    async fn announce_join(&self, player: &str) {
        info!(player, "player joined");
        let text = format!("🎮 **{player}** joined the server! 🟢");
        match self.notifier.send(self.notify_channel, &text).await {
            Ok(message) => self.history.record(player, message).await,
            Err(e) => error!(player, error = %e, "failed to send join notification"),
        }
    }

    async fn announce_leave(&self, player: &str) {
        info!(player, "player left");
        let text = format!("🎮 **{player}** left the server. 🔴");
        match self.notifier.send(self.notify_channel, &text).await {
            Ok(message) => {
                self.history.record(player, message).await;
                self.schedule_notice_cleanup(player);
            }
            Err(e) => error!(player, error = %e, "failed to send leave notification"),
        }
    }

    /// Delete everything recorded for a player after the configured delay.
    fn schedule_notice_cleanup(&self, player: &str) {
        let history = Arc::clone(&self.history);
        let notifier = Arc::clone(&self.notifier);
        let player = player.to_string();
        let delay = self.config.leave_delete_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            for message in history.take(&player).await {
                if let Err(e) = notifier.delete(&message).await {
                    warn!(
                        player,
                        message_id = message.message_id,
                        error = %e,
                        "failed to delete leave notification"
                    );
                }
            }
        });
    }
}
