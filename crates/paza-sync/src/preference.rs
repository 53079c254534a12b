//! Offline mode preference
//!
//! A user-controlled flag that forces offline semantics regardless of
//! actual connectivity. Persisted through the preference store port, but
//! the in-memory value is authoritative for the running session: storage
//! failures are logged, never surfaced.
//!
//! The flag has an independent lifecycle from connectivity. A device can
//! be physically online with offline mode active, in which case automatic
//! sync must not fire on reconnect.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use paza_core::ports::IPreferenceStore;

/// Storage key for the offline-mode flag
pub const OFFLINE_MODE_KEY: &str = "offline_mode";

/// The persisted offline-mode flag
pub struct OfflineModePreference {
    store: Arc<dyn IPreferenceStore>,
    active: AtomicBool,
}

impl OfflineModePreference {
    /// Creates the preference with its session default (`false`)
    pub fn new(store: Arc<dyn IPreferenceStore>) -> Self {
        Self {
            store,
            active: AtomicBool::new(false),
        }
    }

    /// Loads the persisted flag at startup
    ///
    /// Defaults to `false` when the key is unset or the read fails; a read
    /// failure only costs the user their preference, so it is logged and
    /// swallowed.
    pub async fn load(&self) -> bool {
        let value = match self.store.get_bool(OFFLINE_MODE_KEY).await {
            Ok(Some(value)) => value,
            Ok(None) => false,
            Err(err) => {
                warn!(error = %err, "Could not read offline-mode preference, defaulting to off");
                false
            }
        };
        self.active.store(value, Ordering::Release);
        debug!(active = value, "Offline-mode preference loaded");
        value
    }

    /// Returns whether offline mode is currently active
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Sets the flag and persists it
    ///
    /// The in-memory value is updated first and remains authoritative; a
    /// persistence failure is logged only (the next app start may silently
    /// reset to the default).
    pub async fn set_active(&self, value: bool) {
        self.active.store(value, Ordering::Release);
        if let Err(err) = self.store.set_bool(OFFLINE_MODE_KEY, value).await {
            warn!(
                active = value,
                error = %err,
                "Offline-mode preference not persisted; in-memory value remains authoritative"
            );
        }
    }

    /// Flips the flag, persists the new value, and returns it
    pub async fn toggle(&self) -> bool {
        let next = !self.is_active();
        self.set_active(next).await;
        next
    }
}

// ============================================================================
// Unit tests
// ============================================================================
