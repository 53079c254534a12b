//! Connectivity state entity
//!
//! Tracks whether the device is online and the timestamps of the most
//! recent transitions. The state is owned exclusively by the connectivity
//! monitor in `paza-sync`; everything else reads it through a handle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An edge in the online/offline state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityTransition {
    /// The device regained connectivity
    CameOnline,
    /// The device lost connectivity
    WentOffline,
}

impl std::fmt::Display for ConnectivityTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectivityTransition::CameOnline => write!(f, "came_online"),
            ConnectivityTransition::WentOffline => write!(f, "went_offline"),
        }
    }
}

/// Current connectivity as reported by the platform
///
/// Defaults to online: when no platform signal has arrived yet we assume
/// connectivity rather than spuriously deferring writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityState {
    /// Whether the platform currently reports connectivity
    is_online: bool,
    /// When the device last transitioned to online (cleared while offline)
    last_online_at: Option<DateTime<Utc>>,
    /// When the device went offline (cleared while online)
    offline_since: Option<DateTime<Utc>>,
}

impl Default for ConnectivityState {
    fn default() -> Self {
        Self {
            is_online: true,
            last_online_at: None,
            offline_since: None,
        }
    }
}

impl ConnectivityState {
    /// Returns whether the device is online
    pub fn is_online(&self) -> bool {
        self.is_online
    }

    /// Returns when the device last came online
    pub fn last_online_at(&self) -> Option<DateTime<Utc>> {
        self.last_online_at
    }

    /// Returns when the device went offline
    pub fn offline_since(&self) -> Option<DateTime<Utc>> {
        self.offline_since
    }

    /// Applies a platform-reported connectivity value
    ///
    /// Returns the transition taken, or `None` when the report matches the
    /// current state (duplicate platform events are common and ignored).
    pub fn apply(&mut self, online: bool, now: DateTime<Utc>) -> Option<ConnectivityTransition> {
        if online == self.is_online {
            return None;
        }
        self.is_online = online;
        if online {
            self.last_online_at = Some(now);
            self.offline_since = None;
            Some(ConnectivityTransition::CameOnline)
        } else {
            self.last_online_at = None;
            self.offline_since = Some(now);
            Some(ConnectivityTransition::WentOffline)
        }
    }
}
