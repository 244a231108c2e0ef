//! Staged server-restart sequencing
//!
//! A restart is a linear, interruptible countdown: a fixed table of warning
//! stages broadcast in-game (and mirrored to Discord for the longer ones),
//! followed by a save, a flush grace period, and the quit command. A single
//! process-wide flag guards against two sequences overlapping; it is held by
//! an RAII guard so no exit path (success, failure, or panic) can leave it
//! stuck.

pub mod sequencer;
pub mod stages;

pub use sequencer::{RestartOutcome, RestartSequencer, RestartState};
pub use stages::{RestartStage, StageTable};

use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide restart-in-progress flag
///
/// The sole mutual-exclusion mechanism between the manual and scheduled
/// restart paths. Acquired through [`RestartFlag::try_acquire`]; released
/// when the returned guard drops.
#[derive(Default)]
pub struct RestartFlag(AtomicBool);

impl RestartFlag {
    /// Create an unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a restart sequence currently holds the flag
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Attempt to acquire the flag; `None` if a sequence already holds it
    pub fn try_acquire(&self) -> Option<RestartGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| RestartGuard { flag: self })
    }

    fn release(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// RAII guard for [`RestartFlag`]; releases on drop
pub struct RestartGuard<'a> {
    flag: &'a RestartFlag,
}

impl Drop for RestartGuard<'_> {
    fn drop(&mut self) {
        self.flag.release();
    }
}
