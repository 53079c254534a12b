//! Preference store port (driven/secondary port)
//!
//! Durable key-value storage for user preferences. The offline-mode flag
//! is the only preference this subsystem owns, but the interface is a
//! generic boolean store so adapters stay reusable.
//!
//! ## Design Notes
//!
//! - Read and write failures are non-fatal to callers: the in-memory value
//!   remains authoritative for the session and a failed read falls back to
//!   the preference's default.

/// Port trait for durable boolean preferences
#[async_trait::async_trait]
pub trait IPreferenceStore: Send + Sync {
    /// Reads a boolean preference; `None` when the key has never been set
    async fn get_bool(&self, key: &str) -> anyhow::Result<Option<bool>>;

    /// Writes a boolean preference, replacing any previous value
    async fn set_bool(&self, key: &str, value: bool) -> anyhow::Result<()>;
}
