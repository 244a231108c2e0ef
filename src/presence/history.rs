//! Notification message bookkeeping
//!
//! Associates each player with the notification messages posted about them,
//! so leave notices can be deleted shortly after delivery. Entries carry a
//! timestamp and are purged once they exceed a maximum age, keeping the map
//! bounded even for players whose messages were never cleaned up.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::notifications::MessageRef;

/// Messages recorded for one player
#[derive(Debug, Clone)]
struct PlayerNotices {
    messages: Vec<MessageRef>,
    recorded_at: DateTime<Utc>,
}

/// Per-player notification message history
#[derive(Default)]
pub struct NoticeHistory {
    entries: Mutex<HashMap<String, PlayerNotices>>,
}

impl NoticeHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message sent about a player
    ///
    /// The timestamp is set when the player's entry is first created and is
    /// deliberately not refreshed on later messages, so an entry's age
    /// reflects how long it has been accumulating.
    pub async fn record(&self, player: &str, message: MessageRef) {
        let mut entries = self.entries.lock().await;
        entries
            .entry(player.to_string())
            .or_insert_with(|| PlayerNotices {
                messages: Vec::new(),
                recorded_at: Utc::now(),
            })
            .messages
            .push(message);
    }

    /// Remove and return every message recorded for a player
    pub async fn take(&self, player: &str) -> Vec<MessageRef> {
        let mut entries = self.entries.lock().await;
        entries
            .remove(player)
            .map(|notices| notices.messages)
            .unwrap_or_default()
    }

    /// Drop entries older than `max_age`, returning how many were removed
    pub async fn purge_older_than(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|player, notices| {
            let keep = notices.recorded_at > cutoff;
            if !keep {
                debug!(player, "purged stale notification history");
            }
            keep
        });
        before - entries.len()
    }

    /// Number of players currently tracked
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the history is empty
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
