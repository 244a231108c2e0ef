//! The restart state machine
//!
//! `Idle → Warning(stage) → Saving → Quitting → Completed`, with `Aborted`
//! reachable from every working state. Warning broadcasts are best-effort;
//! the save and quit commands are not: a failed save aborts before the
//! server is touched further, and a failed quit leaves the presence set
//! alone because the server's state is unknown.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::notifications::Notifier;
use crate::presence::PresenceTracker;
use crate::rcon::RconSession;

use super::stages::StageTable;
use super::RestartFlag;

/// Observable state of the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartState {
    /// No sequence running
    Idle,
    /// Broadcasting the warning for stage `n` (zero-based)
    Warning(usize),
    /// Save issued, waiting for the flush grace period
    Saving,
    /// Quit issued
    Quitting,
    /// Terminal: the server was saved and told to quit
    Completed,
    /// Terminal: the sequence stopped before shutdown finished
    Aborted,
}

/// Outcome of a restart request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartOutcome {
    /// The full sequence ran: warnings, save, quit
    Completed,
    /// Another sequence already held the in-progress flag
    AlreadyRunning,
    /// The save command failed; the server was left running
    SaveFailed,
    /// The quit command failed; manual intervention required
    QuitFailed,
    /// The sequence panicked partway through
    Failed,
}

impl RestartOutcome {
    /// `true` only when the sequence reached [`RestartState::Completed`]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// The restart sequencer
pub struct RestartSequencer {
    session: Arc<RconSession>,
    notifier: Arc<dyn Notifier>,
    notify_channel: u64,
    presence: Arc<PresenceTracker>,
    flag: Arc<RestartFlag>,
    stages: StageTable,
    save_grace: Duration,
    state: Mutex<RestartState>,
}

impl RestartSequencer {
    /// Create a sequencer with the default 5 second save-flush grace period
    pub fn new(
        session: Arc<RconSession>,
        notifier: Arc<dyn Notifier>,
        notify_channel: u64,
        presence: Arc<PresenceTracker>,
        flag: Arc<RestartFlag>,
        stages: StageTable,
    ) -> Self {
        Self {
            session,
            notifier,
            notify_channel,
            presence,
            flag,
            stages,
            save_grace: Duration::from_secs(5),
            state: Mutex::new(RestartState::Idle),
        }
    }

    /// Override the save-flush grace period
    pub fn with_save_grace(mut self, grace: Duration) -> Self {
        self.save_grace = grace;
        self
    }

    /// Current observable state
    pub async fn state(&self) -> RestartState {
        *self.state.lock().await
    }

    /// The in-progress flag this sequencer is guarded by
    pub fn flag(&self) -> &Arc<RestartFlag> {
        &self.flag
    }

    /// Run the restart sequence to a terminal outcome
    ///
    /// Entry is guarded by the in-progress flag: a second caller gets
    /// [`RestartOutcome::AlreadyRunning`] immediately and the running
    /// sequence is unaffected. The flag is released on every exit path,
    /// including panics inside the sequence.
    pub async fn run(&self) -> RestartOutcome {
        let Some(_guard) = self.flag.try_acquire() else {
            warn!("restart requested while another sequence is in progress");
            return RestartOutcome::AlreadyRunning;
        };

        let outcome = match std::panic::AssertUnwindSafe(self.run_sequence())
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                error!("restart sequence panicked");
                self.notify("**Error during restart sequence!** Check logs.")
                    .await;
                RestartOutcome::Failed
            }
        };

        let terminal = if outcome.is_success() {
            RestartState::Completed
        } else {
            RestartState::Aborted
        };
        *self.state.lock().await = terminal;

        outcome
        // _guard drops here, clearing the in-progress flag.
    }

    async fn run_sequence(&self) -> RestartOutcome {
        info!("starting restart countdown sequence");

        for (index, stage) in self.stages.iter().enumerate() {
            *self.state.lock().await = RestartState::Warning(index);

            // Best-effort: a dropped warning must not halt the countdown.
            if !self.session.broadcast(&stage.warning).await {
                warn!(stage = %stage.label, "in-game restart warning failed");
            }

            if let Some(notice) = &stage.notice {
                self.notify(notice).await;
            }

            tokio::time::sleep(stage.wait).await;
        }

        if !self.session.broadcast("Server restarting now...").await {
            warn!("final restart broadcast failed");
        }
        self.notify("**Server is restarting now...** 🔄").await;

        *self.state.lock().await = RestartState::Saving;
        info!("sending save command");
        if self.session.send_command("save").await.is_none() {
            error!("save command failed, aborting restart");
            self.notify("⚠️ **Save command failed! Restart aborted.**")
                .await;
            return RestartOutcome::SaveFailed;
        }

        info!(grace_secs = self.save_grace.as_secs(), "waiting for save to flush");
        tokio::time::sleep(self.save_grace).await;

        *self.state.lock().await = RestartState::Quitting;
        info!("sending quit command");
        if self.session.send_command("quit").await.is_none() {
            // Server state is unknown here; leave the presence set alone.
            error!("quit command failed");
            self.notify("⚠️ **Quit command failed! Manual intervention required.**")
                .await;
            return RestartOutcome::QuitFailed;
        }

        self.notify("**Server shutdown initiated. Will be back online shortly!** ✅")
            .await;
        self.presence.clear().await;
        info!("restart sequence completed");

        RestartOutcome::Completed
    }

    async fn notify(&self, text: &str) {
        if let Err(e) = self.notifier.send(self.notify_channel, text).await {
            error!(error = %e, "failed to post restart notification");
        }
    }
}
