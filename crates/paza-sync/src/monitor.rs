//! Connectivity monitor - turns the platform online/offline signal into state
//!
//! The [`ConnectivityMonitor`] owns the [`ConnectivityState`]; every other
//! component reads it through a cloneable [`ConnectivityHandle`]. Platform
//! integrations deliver [`ConnectivityEvent`]s either through the channel
//! consumed by [`ConnectivityMonitor::run`] or by calling
//! [`handle_event`](ConnectivityMonitor::handle_event) directly from a
//! callback.
//!
//! ## Flow
//!
//! ```text
//! platform signal ──→ ConnectivityMonitor ──→ ConnectivityTransition channel
//!                            │
//!                     ConnectivityHandle (read-only state)
//! ```
//!
//! Duplicate events (online while already online) produce no transition.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use paza_core::domain::connectivity::{ConnectivityState, ConnectivityTransition};

/// Capacity of the outbound transition channel
const TRANSITION_CHANNEL_CAPACITY: usize = 16;

/// A raw connectivity report from the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    /// The platform reports connectivity
    Online,
    /// The platform reports no connectivity
    Offline,
}

/// Read-only view of the connectivity state
///
/// Cheap to clone; hand one to every component that needs to ask
/// "are we online?". Only the monitor mutates the underlying state.
#[derive(Clone)]
pub struct ConnectivityHandle {
    state: Arc<RwLock<ConnectivityState>>,
}

impl ConnectivityHandle {
    /// Returns whether the device is currently online
    pub async fn is_online(&self) -> bool {
        self.state.read().await.is_online()
    }

    /// Returns when the device last came online
    pub async fn last_online_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_online_at()
    }

    /// Returns when the device went offline
    pub async fn offline_since(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.offline_since()
    }

    /// Returns a copy of the full connectivity state
    pub async fn snapshot(&self) -> ConnectivityState {
        self.state.read().await.clone()
    }
}

/// Owns the connectivity state and publishes transitions
pub struct ConnectivityMonitor {
    /// The single writable copy of the connectivity state
    state: Arc<RwLock<ConnectivityState>>,
    /// Outbound channel for offline/online edges
    transitions: mpsc::Sender<ConnectivityTransition>,
}

impl ConnectivityMonitor {
    /// Creates a monitor with its read handle and transition receiver
    ///
    /// The state starts online (optimistic default): until the platform
    /// says otherwise, writes are not deferred.
    pub fn new() -> (
        Self,
        ConnectivityHandle,
        mpsc::Receiver<ConnectivityTransition>,
    ) {
        let state = Arc::new(RwLock::new(ConnectivityState::default()));
        let (tx, rx) = mpsc::channel(TRANSITION_CHANNEL_CAPACITY);

        let handle = ConnectivityHandle {
            state: Arc::clone(&state),
        };

        let monitor = Self {
            state,
            transitions: tx,
        };

        (monitor, handle, rx)
    }

    /// Applies one platform report
    ///
    /// Updates the shared state and, when the report is an actual edge,
    /// publishes the transition. Safe to call from a platform callback.
    pub async fn handle_event(&self, event: ConnectivityEvent) {
        let online = matches!(event, ConnectivityEvent::Online);
        let transition = {
            let mut state = self.state.write().await;
            state.apply(online, Utc::now())
        };

        match transition {
            Some(transition) => {
                info!(online, %transition, "Connectivity changed");
                if let Err(err) = self.transitions.send(transition).await {
                    debug!(error = %err, "No transition listener attached");
                }
            }
            None => {
                debug!(online, "Duplicate connectivity report ignored");
            }
        }
    }

    /// Main event loop for the monitor
    ///
    /// Consumes platform events until the channel closes or shutdown is
    /// signalled. Integrations that receive reachability callbacks instead
    /// of owning a stream can skip this loop and call
    /// [`handle_event`](Self::handle_event) directly.
    pub async fn run(
        &self,
        mut events: mpsc::Receiver<ConnectivityEvent>,
        shutdown: CancellationToken,
    ) {
        info!("Connectivity monitor starting");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Connectivity monitor shutting down");
                    break;
                }
                event = events.recv() => {
                    match event {
                        Some(event) => self.handle_event(event).await,
                        None => {
                            info!("Connectivity event channel closed, monitor stopping");
                            break;
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Unit tests
// ============================================================================
