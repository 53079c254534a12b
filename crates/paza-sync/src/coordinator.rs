//! Sync coordinator - orchestrates sync passes over the operation queue
//!
//! The [`SyncCoordinator`] validates preconditions, drains the queue
//! through the executor port, tallies the outcome, invalidates the API
//! cache, and reports back to the user. It holds the only mutual-exclusion
//! guard in the subsystem: concurrent sync triggers (manual button press
//! racing the reconnect auto-trigger) must not interleave drains over the
//! shared queue.
//!
//! ## Failure semantics
//!
//! Per-operation failures are contained inside the drain: logged, counted,
//! the operation retained (or dead-lettered). Only the offline
//! precondition and unexpected internal errors surface to the caller, and
//! then only as a `false` return plus a visible notification, never as a
//! propagated error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use paza_core::domain::operation::RetryPolicy;
use paza_core::domain::outcome::SyncOutcome;
use paza_core::ports::{
    IApiCache, INotificationService, IOperationExecutor, IUserPrompt, Notification,
};

use crate::monitor::ConnectivityHandle;
use crate::preference::OfflineModePreference;
use crate::queue::OperationQueue;

/// Orchestrates synchronization passes over the deferred operation queue
pub struct SyncCoordinator {
    /// Read-only connectivity view
    connectivity: ConnectivityHandle,
    /// The shared deferred operation queue
    queue: Arc<OperationQueue>,
    /// The user's offline-mode preference
    preference: Arc<OfflineModePreference>,
    /// Performs the real backend writes during replay
    executor: Arc<dyn IOperationExecutor>,
    /// Invalidated after every non-empty pass
    api_cache: Arc<dyn IApiCache>,
    /// User-facing toasts
    notifier: Arc<dyn INotificationService>,
    /// Yes/no confirmations (exit offline mode after a clean pass)
    prompt: Arc<dyn IUserPrompt>,
    /// Retry/backoff/dead-letter budget for failed replays
    policy: RetryPolicy,
    /// In-flight guard: serializes concurrent sync triggers
    in_flight: Mutex<()>,
    /// Observable "a sync pass is running" flag
    syncing: AtomicBool,
    /// When the last pass finished (never cleared once set)
    last_sync_time: RwLock<Option<DateTime<Utc>>>,
}

impl SyncCoordinator {
    /// Creates a coordinator over the given queue and ports
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        connectivity: ConnectivityHandle,
        queue: Arc<OperationQueue>,
        preference: Arc<OfflineModePreference>,
        executor: Arc<dyn IOperationExecutor>,
        api_cache: Arc<dyn IApiCache>,
        notifier: Arc<dyn INotificationService>,
        prompt: Arc<dyn IUserPrompt>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            connectivity,
            queue,
            preference,
            executor,
            api_cache,
            notifier,
            prompt,
            policy,
            in_flight: Mutex::new(()),
            syncing: AtomicBool::new(false),
            last_sync_time: RwLock::new(None),
        }
    }

    /// Returns whether a sync pass is currently running
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    /// Returns when the last sync pass finished
    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        *self
            .last_sync_time
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ========================================================================
    // sync_offline_data
    // ========================================================================

    /// Runs one synchronization pass; returns true iff nothing failed
    ///
    /// 1. Rejects concurrent invocations (in-flight guard)
    /// 2. Fails fast while offline, without touching the queue
    /// 3. Treats an empty queue as a successful no-op
    /// 4. Otherwise drains the queue sequentially, stamps
    ///    `last_sync_time`, clears the API cache unconditionally, and
    ///    summarizes the result to the user
    pub async fn sync_offline_data(&self) -> bool {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("Sync already in progress, ignoring trigger");
            return false;
        };

        if !self.connectivity.is_online().await {
            warn!("Sync requested while offline");
            self.notify(Notification::error(
                "Sync unavailable",
                "You can't sync while offline. Reconnect and try again.",
            ))
            .await;
            return false;
        }

        let pending = self.queue.len().await;
        if pending == 0 {
            debug!("Nothing to sync");
            self.notify(Notification::sync(
                "Nothing to sync",
                "All your changes are already up to date.",
            ))
            .await;
            return true;
        }

        self.syncing.store(true, Ordering::Release);
        info!(pending, "Starting sync pass");
        self.notify(Notification::sync(
            "Sync started",
            format!("Sending {pending} saved change(s)..."),
        ))
        .await;

        let outcome = self.queue.drain(self.executor.as_ref(), &self.policy).await;

        {
            let mut last = self
                .last_sync_time
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *last = Some(Utc::now());
        }

        // Replays changed backend state, so cached reads are stale either
        // way; the cache is cleared even after a fully failed pass.
        self.api_cache.clear().await;

        self.report(&outcome).await;

        if self.preference.is_active() && outcome.is_clean() {
            self.offer_offline_mode_exit().await;
        }

        self.syncing.store(false, Ordering::Release);
        info!(%outcome, "Sync pass finished");

        outcome.is_clean()
    }

    /// Summarizes the pass to the user
    async fn report(&self, outcome: &SyncOutcome) {
        if outcome.is_clean() {
            self.notify(Notification::sync(
                "Sync complete",
                format!("{} change(s) sent successfully.", outcome.succeeded()),
            ))
            .await;
        } else {
            let mut body = format!(
                "{} of {} change(s) could not be sent and will be retried.",
                outcome.failed(),
                outcome.processed()
            );
            if outcome.dead_lettered() > 0 {
                body.push_str(&format!(
                    " {} change(s) failed too many times and need your attention.",
                    outcome.dead_lettered()
                ));
            }
            self.notify(Notification::error("Sync incomplete", body)).await;
        }
    }

    /// After a clean pass with offline mode active, offers to exit it
    ///
    /// The flag is never auto-cleared; declining (or an unreachable
    /// prompt) leaves offline mode on.
    async fn offer_offline_mode_exit(&self) {
        match self
            .prompt
            .confirm(
                "Leave offline mode?",
                "All saved changes are synced. Turn offline mode off?",
            )
            .await
        {
            Ok(true) => {
                self.preference.set_active(false).await;
                info!("Offline mode disabled after clean sync");
                self.notify(Notification::sync(
                    "Offline mode off",
                    "New changes will be sent immediately.",
                ))
                .await;
            }
            Ok(false) => {
                debug!("User declined to leave offline mode");
            }
            Err(err) => {
                warn!(error = %err, "Offline-mode exit prompt failed, leaving flag set");
            }
        }
    }

    /// Sends a toast; delivery failures never alter engine behavior
    async fn notify(&self, notification: Notification) {
        if let Err(err) = self.notifier.notify(&notification).await {
            debug!(error = %err, title = %notification.title, "Notification not delivered");
        }
    }
}
