//! User prompt port
//!
//! A small number of engine decisions require explicit user consent:
//! exiting offline mode after a fully successful sync, and syncing
//! immediately when offline mode is disabled with work still queued.
//! Those confirmations go through this port.

/// Port trait for yes/no confirmations
///
/// ## Implementation Notes
///
/// - `false` (decline) must be the default: implementations that cannot
///   reach the user (headless runs, dismissed dialogs) return `Ok(false)`.
/// - The engine treats an `Err` the same as a decline.
#[async_trait::async_trait]
pub trait IUserPrompt: Send + Sync {
    /// Presents a yes/no confirmation and returns the user's choice
    async fn confirm(&self, title: &str, body: &str) -> anyhow::Result<bool>;
}
