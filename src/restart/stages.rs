//! Restart countdown stage table
//!
//! Immutable configuration for the countdown: each stage carries the in-game
//! warning, an optional Discord mirror, and how long to wait before the next
//! stage. Stages must announce strictly decreasing time remaining, so a
//! misordered table is rejected at construction instead of confusing players
//! at three in the morning.

use std::time::Duration;

/// One timed step of the restart countdown
#[derive(Debug, Clone)]
pub struct RestartStage {
    /// Human-readable time-remaining label, e.g. "5 minutes"
    pub label: String,

    /// Announced time remaining, used for the ordering invariant
    pub remaining_secs: u64,

    /// Warning broadcast in-game
    pub warning: String,

    /// Optional parallel Discord notification
    pub notice: Option<String>,

    /// How long to wait after this stage before advancing
    pub wait: Duration,
}

impl RestartStage {
    /// Create a stage with a Discord mirror
    pub fn with_notice(
        label: impl Into<String>,
        remaining_secs: u64,
        warning: impl Into<String>,
        notice: impl Into<String>,
        wait: Duration,
    ) -> Self {
        Self {
            label: label.into(),
            remaining_secs,
            warning: warning.into(),
            notice: Some(notice.into()),
            wait,
        }
    }

    /// Create an in-game-only stage
    pub fn quiet(
        label: impl Into<String>,
        remaining_secs: u64,
        warning: impl Into<String>,
        wait: Duration,
    ) -> Self {
        Self {
            label: label.into(),
            remaining_secs,
            warning: warning.into(),
            notice: None,
            wait,
        }
    }
}

/// Validated, ordered sequence of countdown stages
#[derive(Debug, Clone)]
pub struct StageTable {
    stages: Vec<RestartStage>,
}

impl StageTable {
    /// Build a table, rejecting empty or non-decreasing stage sequences
    pub fn new(stages: Vec<RestartStage>) -> Result<Self, String> {
        if stages.is_empty() {
            return Err(String::from("stage table must not be empty"));
        }

        for pair in stages.windows(2) {
            if pair[1].remaining_secs >= pair[0].remaining_secs {
                return Err(format!(
                    "stages must announce strictly decreasing time remaining ({} then {})",
                    pair[0].label, pair[1].label
                ));
            }
        }

        Ok(Self { stages })
    }

    /// Iterate the stages in countdown order
    pub fn iter(&self) -> std::slice::Iter<'_, RestartStage> {
        self.stages.iter()
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the table is empty (never true for a constructed table)
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Total countdown duration (the sum of every stage wait)
    pub fn total_wait(&self) -> Duration {
        self.stages.iter().map(|s| s.wait).sum()
    }
}

impl Default for StageTable {
    /// The production countdown: five-minute lead-in, escalating warnings,
    /// Discord mirrors down to the one-minute mark.
    fn default() -> Self {
        let stages = vec![
            RestartStage::with_notice(
                "5 minutes",
                300,
                "⚠️ SERVER RESTART IN 5 MINUTES! Please find a safe spot!",
                "**Server will restart in 5 minutes!** ⏰",
                Duration::from_secs(120),
            ),
            RestartStage::with_notice(
                "3 minutes",
                180,
                "⚠️ SERVER RESTART IN 3 MINUTES!",
                "**Server will restart in 3 minutes!** ⏰",
                Duration::from_secs(60),
            ),
            RestartStage::with_notice(
                "2 minutes",
                120,
                "⚠️ SERVER RESTART IN 2 MINUTES!",
                "**Server will restart in 2 minutes!** ⏰",
                Duration::from_secs(60),
            ),
            RestartStage::with_notice(
                "1 minute",
                60,
                "⚠️ SERVER RESTART IN 1 MINUTE! SAVE NOW!",
                "**Server will restart in 1 minute!** 🚨",
                Duration::from_secs(30),
            ),
            RestartStage::quiet(
                "30 seconds",
                30,
                "⚠️ SERVER RESTART IN 30 SECONDS!",
                Duration::from_secs(20),
            ),
            RestartStage::quiet(
                "10 seconds",
                10,
                "⚠️ SERVER RESTART IN 10 SECONDS!",
                Duration::from_secs(10),
            ),
        ];

        Self::new(stages).expect("default stage table is valid")
    }
}

impl<'a> IntoIterator for &'a StageTable {
    type Item = &'a RestartStage;
    type IntoIter = std::slice::Iter<'a, RestartStage>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
