//! Recurring restart scheduling
//!
//! The schedule is plain wall-clock configuration: either a fixed interval
//! (`every 8h`, `every 90m`) or a list of times of day (`04:00,12:00,20:00`).
//! Firings that land while a restart is already running are dropped outright;
//! there is no queueing and a skipped firing is never rescheduled.

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveTime, TimeZone};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::notifications::Notifier;
use crate::restart::{RestartFlag, RestartSequencer};

/// Errors raised while parsing or evaluating a schedule
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// The schedule string could not be parsed
    #[error("invalid schedule '{spec}': {reason}")]
    InvalidSpec { spec: String, reason: String },
}

impl ScheduleError {
    fn invalid(spec: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSpec {
            spec: spec.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for schedule operations
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// A parsed restart schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleSpec {
    /// Fire at a fixed interval from "now"
    Every(Duration),

    /// Fire at the given local times of day
    Daily(Vec<NaiveTime>),
}

impl ScheduleSpec {
    /// Parse a schedule string
    ///
    /// Accepted forms:
    /// - `every <N>h` / `every <N>m` for a fixed interval
    /// - `HH:MM[,HH:MM...]` for local times of day
    ///
    /// # Examples
    ///
    /// ```
    /// use palisade::scheduler::ScheduleSpec;
    /// use std::time::Duration;
    ///
    /// assert_eq!(
    ///     ScheduleSpec::parse("every 8h").unwrap(),
    ///     ScheduleSpec::Every(Duration::from_secs(8 * 3600)),
    /// );
    /// assert!(ScheduleSpec::parse("04:00,12:00,20:00").is_ok());
    /// assert!(ScheduleSpec::parse("whenever").is_err());
    /// ```
    pub fn parse(spec: &str) -> ScheduleResult<Self> {
        let trimmed = spec.trim();

        if let Some(rest) = trimmed.strip_prefix("every ") {
            return Self::parse_interval(trimmed, rest.trim());
        }

        let mut times = Vec::new();
        for part in trimmed.split(',') {
            let part = part.trim();
            let time = NaiveTime::parse_from_str(part, "%H:%M").map_err(|_| {
                ScheduleError::invalid(trimmed, format!("'{part}' is not an HH:MM time"))
            })?;
            times.push(time);
        }

        if times.is_empty() {
            return Err(ScheduleError::invalid(trimmed, "no times given"));
        }

        times.sort();
        times.dedup();
        Ok(Self::Daily(times))
    }

    fn parse_interval(spec: &str, body: &str) -> ScheduleResult<Self> {
        let (digits, unit) = body.split_at(body.len().saturating_sub(1));
        let value: u64 = digits
            .trim()
            .parse()
            .map_err(|_| ScheduleError::invalid(spec, "interval must be a number"))?;

        if value == 0 {
            return Err(ScheduleError::invalid(spec, "interval must be non-zero"));
        }

        let seconds = match unit {
            "h" => value * 3600,
            "m" => value * 60,
            _ => {
                return Err(ScheduleError::invalid(
                    spec,
                    "interval unit must be 'h' or 'm'",
                ))
            }
        };

        Ok(Self::Every(Duration::from_secs(seconds)))
    }

    /// The next firing instant strictly after `now`
    pub fn next_fire(&self, now: DateTime<Local>) -> DateTime<Local> {
        match self {
            Self::Every(interval) => {
                let delta = ChronoDuration::from_std(*interval)
                    .unwrap_or_else(|_| ChronoDuration::hours(8));
                now + delta
            }
            Self::Daily(times) => {
                let today = now.date_naive();
                for time in times {
                    let candidate = today.and_time(*time);
                    if let Some(candidate) = Local.from_local_datetime(&candidate).earliest() {
                        if candidate > now {
                            return candidate;
                        }
                    }
                }
                // Nothing left today; first slot tomorrow.
                let tomorrow = today + ChronoDuration::days(1);
                let first = times.first().copied().unwrap_or_default();
                Local
                    .from_local_datetime(&tomorrow.and_time(first))
                    .earliest()
                    .unwrap_or(now + ChronoDuration::days(1))
            }
        }
    }
}

impl Default for ScheduleSpec {
    fn default() -> Self {
        Self::Every(Duration::from_secs(8 * 3600))
    }
}

/// Recurring restart trigger
pub struct RestartScheduler {
    sequencer: Arc<RestartSequencer>,
    flag: Arc<RestartFlag>,
    notifier: Arc<dyn Notifier>,
    notify_channel: u64,
    spec: ScheduleSpec,
}

impl RestartScheduler {
    /// Create a scheduler for the given spec
    pub fn new(
        sequencer: Arc<RestartSequencer>,
        flag: Arc<RestartFlag>,
        notifier: Arc<dyn Notifier>,
        notify_channel: u64,
        spec: ScheduleSpec,
    ) -> Self {
        Self {
            sequencer,
            flag,
            notifier,
            notify_channel,
            spec,
        }
    }

    /// Spawn the recurring trigger loop
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let now = Local::now();
                let next = self.spec.next_fire(now);
                let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
                info!(next = %next.format("%Y-%m-%d %H:%M:%S"), "next scheduled restart");

                tokio::time::sleep(wait).await;
                self.fire().await;
            }
        })
    }

    /// Handle one schedule firing
    ///
    /// A firing that overlaps a running restart is logged and dropped; the
    /// sequence already in flight is the restart this firing wanted.
    pub async fn fire(&self) {
        if self.flag.is_set() {
            warn!("scheduled restart skipped, restart already in progress");
            return;
        }

        info!("scheduled restart triggered");
        if let Err(e) = self
            .notifier
            .send(
                self.notify_channel,
                "**Scheduled server restart starting...** 🕐",
            )
            .await
        {
            warn!(error = %e, "failed to announce scheduled restart");
        }

        let outcome = self.sequencer.run().await;
        if !outcome.is_success() {
            warn!(?outcome, "scheduled restart did not complete");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_interval_hours() {
        assert_eq!(
            ScheduleSpec::parse("every 8h").unwrap(),
            ScheduleSpec::Every(Duration::from_secs(8 * 3600)),
        );
    }

    #[test]
    fn test_parse_interval_minutes() {
        assert_eq!(
            ScheduleSpec::parse("every 90m").unwrap(),
            ScheduleSpec::Every(Duration::from_secs(90 * 60)),
        );
    }

    #[test]
    fn test_parse_daily_times_sorted_deduped() {
        let spec = ScheduleSpec::parse("20:00,04:00,12:00,04:00").unwrap();
        match spec {
            ScheduleSpec::Daily(times) => {
                assert_eq!(times.len(), 3);
                assert_eq!(times[0].hour(), 4);
                assert_eq!(times[2].hour(), 20);
            }
            other => panic!("expected Daily, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ScheduleSpec::parse("whenever").is_err());
        assert!(ScheduleSpec::parse("every 0h").is_err());
        assert!(ScheduleSpec::parse("every 8d").is_err());
        assert!(ScheduleSpec::parse("25:00").is_err());
        assert!(ScheduleSpec::parse("").is_err());
    }

    #[test]
    fn test_next_fire_interval() {
        let spec = ScheduleSpec::Every(Duration::from_secs(3600));
        let now = Local::now();
        let next = spec.next_fire(now);
        assert_eq!(next - now, ChronoDuration::hours(1));
    }

    #[test]
    fn test_next_fire_daily_picks_next_slot() {
        let spec = ScheduleSpec::parse("04:00,12:00,20:00").unwrap();
        let now = Local
            .with_ymd_and_hms(2026, 3, 10, 13, 0, 0)
            .single()
            .unwrap();
        let next = spec.next_fire(now);
        assert_eq!(next.hour(), 20);
        assert_eq!(next.date_naive(), now.date_naive());
    }

    #[test]
    fn test_next_fire_daily_wraps_to_tomorrow() {
        let spec = ScheduleSpec::parse("04:00,12:00").unwrap();
        let now = Local
            .with_ymd_and_hms(2026, 3, 10, 22, 30, 0)
            .single()
            .unwrap();
        let next = spec.next_fire(now);
        assert_eq!(next.hour(), 4);
        assert_eq!(next.date_naive(), now.date_naive() + ChronoDuration::days(1));
    }

    #[test]
    fn test_default_is_eight_hours() {
        assert_eq!(
            ScheduleSpec::default(),
            ScheduleSpec::Every(Duration::from_secs(8 * 3600)),
        );
    }
}
