//! Network facade - the public contract of the offline sync subsystem
//!
//! The [`NetworkFacade`] is what the rest of the application talks to. It
//! wires the connectivity monitor, operation queue, offline-mode
//! preference, and sync coordinator together, and owns the reaction to
//! connectivity transitions.
//!
//! ## State machine
//!
//! `Online ⇄ Offline` is driven by the connectivity monitor; the
//! orthogonal `OfflineModeInactive ⇄ OfflineModeActive` is driven only by
//! the user toggle. A sync is auto-triggered on exactly one edge:
//! `Offline → Online` while offline mode is inactive and the queue is
//! non-empty. No other automatic transitions exist.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use paza_core::domain::connectivity::ConnectivityTransition;
use paza_core::domain::newtypes::OperationId;
use paza_core::domain::operation::{OperationKind, PendingOperation};
use paza_core::ports::{INotificationService, IUserPrompt, Notification};

use crate::coordinator::SyncCoordinator;
use crate::monitor::ConnectivityHandle;
use crate::preference::OfflineModePreference;
use crate::queue::OperationQueue;

/// The component the application consumes for offline/sync concerns
pub struct NetworkFacade {
    /// Read-only connectivity view
    connectivity: ConnectivityHandle,
    /// The shared deferred operation queue
    queue: Arc<OperationQueue>,
    /// Orchestrates sync passes
    coordinator: Arc<SyncCoordinator>,
    /// The user's offline-mode preference
    preference: Arc<OfflineModePreference>,
    /// User-facing toasts
    notifier: Arc<dyn INotificationService>,
    /// Yes/no confirmations (sync-now when disabling offline mode)
    prompt: Arc<dyn IUserPrompt>,
}

impl NetworkFacade {
    /// Wires the facade over already-constructed components
    pub fn new(
        connectivity: ConnectivityHandle,
        queue: Arc<OperationQueue>,
        coordinator: Arc<SyncCoordinator>,
        preference: Arc<OfflineModePreference>,
        notifier: Arc<dyn INotificationService>,
        prompt: Arc<dyn IUserPrompt>,
    ) -> Self {
        Self {
            connectivity,
            queue,
            coordinator,
            preference,
            notifier,
            prompt,
        }
    }

    // ========================================================================
    // Observable state
    // ========================================================================

    /// Returns whether the device is online
    pub async fn is_online(&self) -> bool {
        self.connectivity.is_online().await
    }

    /// Returns whether the device is offline
    pub async fn is_offline(&self) -> bool {
        !self.connectivity.is_online().await
    }

    /// Returns when the device went offline (for the "offline since" display)
    pub async fn offline_since(&self) -> Option<DateTime<Utc>> {
        self.connectivity.offline_since().await
    }

    /// Returns whether the user has forced offline semantics
    pub fn offline_mode_active(&self) -> bool {
        self.preference.is_active()
    }

    /// Returns whether a write should be queued instead of executed
    ///
    /// True when physically offline or when offline mode is active; this
    /// is the question application code asks before performing a write.
    pub async fn defers_writes(&self) -> bool {
        self.is_offline().await || self.offline_mode_active()
    }

    /// Returns the number of operations awaiting replay
    pub async fn pending_operations_count(&self) -> usize {
        self.queue.len().await
    }

    /// Returns whether a sync pass is currently running
    pub fn is_syncing(&self) -> bool {
        self.coordinator.is_syncing()
    }

    /// Returns when the last sync pass finished
    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        self.coordinator.last_sync_time()
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Defers a write for later replay and returns its identity
    ///
    /// Called by application code that found [`defers_writes`] true
    /// instead of performing the backend call directly.
    pub async fn add_paused_request(
        &self,
        kind: OperationKind,
        payload: serde_json::Value,
    ) -> OperationId {
        let op = PendingOperation::new(kind, payload);
        let id = *op.id();
        self.queue.enqueue(op).await;

        let pending = self.queue.len().await;
        info!(%id, %kind, pending, "Deferred a write for later sync");
        self.notify(Notification::sync(
            "Saved for later",
            format!("This change will be sent when you're back online ({pending} waiting)."),
        ))
        .await;

        id
    }

    /// Runs one synchronization pass; returns true iff nothing failed
    pub async fn sync_offline_data(&self) -> bool {
        self.coordinator.sync_offline_data().await
    }

    /// Flips the offline-mode preference and returns the new value
    ///
    /// Disabling offline mode while online with work still queued offers
    /// an immediate sync; declining leaves the queue for the next manual
    /// or automatic trigger.
    pub async fn toggle_offline_mode(&self) -> bool {
        let active = self.preference.toggle().await;
        info!(active, "Offline mode toggled");

        if active {
            self.notify(Notification::sync(
                "Offline mode on",
                "Changes will be saved on this device until you turn it off.",
            ))
            .await;
        } else {
            self.notify(Notification::sync(
                "Offline mode off",
                "New changes will be sent immediately.",
            ))
            .await;

            if self.is_online().await && !self.queue.is_empty().await {
                let pending = self.queue.len().await;
                match self
                    .prompt
                    .confirm(
                        "Sync now?",
                        &format!("You have {pending} saved change(s). Send them now?"),
                    )
                    .await
                {
                    Ok(true) => {
                        self.coordinator.sync_offline_data().await;
                    }
                    Ok(false) => {
                        debug!(pending, "User declined immediate sync after disabling offline mode");
                    }
                    Err(err) => {
                        debug!(error = %err, "Sync-now prompt failed, leaving queue untouched");
                    }
                }
            }
        }

        active
    }

    // ========================================================================
    // Connectivity reactions
    // ========================================================================

    /// Reacts to one connectivity transition
    pub async fn handle_transition(&self, transition: ConnectivityTransition) {
        match transition {
            ConnectivityTransition::WentOffline => {
                info!("Device went offline");
                self.notify(Notification::connectivity(
                    "You're offline",
                    "Changes will be saved and sent when you reconnect.",
                ))
                .await;
            }
            ConnectivityTransition::CameOnline => {
                info!("Device came online");
                self.notify(Notification::connectivity(
                    "Back online",
                    "Connection restored.",
                ))
                .await;

                if self.preference.is_active() {
                    debug!("Offline mode active, skipping automatic sync");
                    return;
                }
                if self.queue.is_empty().await {
                    debug!("Queue empty, nothing to auto-sync");
                    return;
                }
                let clean = self.coordinator.sync_offline_data().await;
                debug!(clean, "Automatic sync after reconnect finished");
            }
        }
    }

    /// Main reaction loop: consumes transitions until shutdown
    pub async fn run(
        &self,
        mut transitions: mpsc::Receiver<ConnectivityTransition>,
        shutdown: CancellationToken,
    ) {
        info!("Network facade starting");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Network facade shutting down");
                    break;
                }
                transition = transitions.recv() => {
                    match transition {
                        Some(transition) => self.handle_transition(transition).await,
                        None => {
                            info!("Transition channel closed, facade stopping");
                            break;
                        }
                    }
                }
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
