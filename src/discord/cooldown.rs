//! Per-(command, user) cooldowns
//!
//! Simple spam protection: each command has a window, and a repeated
//! invocation by the same user inside the window is rejected with the exact
//! remaining time. Expired records are pruned on every check so the map
//! stays bounded by the set of recently active users.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Result of a cooldown check
#[derive(Debug, Clone, Copy)]
pub struct CooldownStatus {
    /// Whether the invocation was rejected
    pub on_cooldown: bool,

    /// Time left until the command may be used again
    pub remaining: Duration,
}

impl CooldownStatus {
    fn ready() -> Self {
        Self {
            on_cooldown: false,
            remaining: Duration::ZERO,
        }
    }

    fn blocked(remaining: Duration) -> Self {
        Self {
            on_cooldown: true,
            remaining,
        }
    }

    /// Remaining time in seconds, for user-facing messages
    pub fn remaining_secs(&self) -> f64 {
        self.remaining.as_secs_f64()
    }
}

/// Cooldown bookkeeping for all commands
pub struct CooldownTracker {
    windows: HashMap<&'static str, Duration>,
    default_window: Duration,
    last_use: Mutex<HashMap<(String, u64), Instant>>,
}

impl CooldownTracker {
    /// Create a tracker with the production windows
    pub fn new() -> Self {
        Self {
            windows: HashMap::from([
                ("restart", Duration::from_secs(60)),
                ("announce", Duration::from_secs(10)),
                ("players", Duration::from_secs(5)),
                ("post", Duration::from_secs(10)),
            ]),
            default_window: Duration::from_secs(5),
            last_use: Mutex::new(HashMap::new()),
        }
    }

    /// The window configured for a command
    pub fn window_for(&self, command: &str) -> Duration {
        self.windows
            .get(command)
            .copied()
            .unwrap_or(self.default_window)
    }

    /// Check and, if allowed, record an invocation
    pub async fn check(&self, command: &str, user_id: u64) -> CooldownStatus {
        let window = self.window_for(command);
        let now = Instant::now();
        let mut last_use = self.last_use.lock().await;

        // Prune records whose windows have fully elapsed.
        last_use.retain(|(cmd, _), used| now.duration_since(*used) < self.window_for(cmd));

        let key = (command.to_string(), user_id);
        if let Some(used) = last_use.get(&key) {
            let elapsed = now.duration_since(*used);
            if elapsed < window {
                return CooldownStatus::blocked(window - elapsed);
            }
        }

        last_use.insert(key, now);
        CooldownStatus::ready()
    }
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new()
    }
}
