//! Sync pass outcome accounting
//!
//! A [`SyncOutcome`] is produced once per drain of the operation queue and
//! is not persisted; only the coordinator's `last_sync_time` survives the
//! pass.

use serde::{Deserialize, Serialize};

/// Aggregate result of one sync pass over the operation queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// Operations replayed successfully and removed from the queue
    succeeded: u32,
    /// Operations that failed this pass and were retained
    failed: u32,
    /// Operations skipped because their backoff window has not elapsed
    deferred: u32,
    /// Operations moved to the dead-letter state this pass
    dead_lettered: u32,
}

impl SyncOutcome {
    /// Creates an empty outcome
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one successful replay
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    /// Records one failed replay
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Records one operation skipped due to backoff
    pub fn record_deferral(&mut self) {
        self.deferred += 1;
    }

    /// Records one operation moved to the dead-letter state
    pub fn record_dead_letter(&mut self) {
        self.dead_lettered += 1;
    }

    /// Returns the number of successful replays
    pub fn succeeded(&self) -> u32 {
        self.succeeded
    }

    /// Returns the number of failed replays
    pub fn failed(&self) -> u32 {
        self.failed
    }

    /// Returns the number of operations skipped due to backoff
    pub fn deferred(&self) -> u32 {
        self.deferred
    }

    /// Returns the number of operations dead-lettered this pass
    pub fn dead_lettered(&self) -> u32 {
        self.dead_lettered
    }

    /// Returns the number of operations actually executed this pass
    pub fn processed(&self) -> u32 {
        self.succeeded + self.failed
    }

    /// Returns true if no executed operation failed
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

impl std::fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed, {} deferred, {} dead-lettered",
            self.succeeded, self.failed, self.deferred, self.dead_lettered
        )
    }
}
