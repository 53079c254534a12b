//! Port (trait) definitions for the hexagonal architecture
//!
//! These traits define the interfaces between the sync engine and its
//! adapters:
//! - [`IOperationStore`] - Durable log of deferred operations (driven port)
//! - [`IPreferenceStore`] - Durable key-value preferences (driven port)
//! - [`IOperationExecutor`] - Performs the real backend write (driven port)
//! - [`IApiCache`] - Invalidates the application's API response cache
//! - [`INotificationService`] - User-facing toasts
//! - [`IUserPrompt`] - Yes/no confirmations

pub mod api_cache;
pub mod notification;
pub mod operation_executor;
pub mod operation_store;
pub mod preference_store;
pub mod user_prompt;

// Re-export all port traits
pub use api_cache::IApiCache;
pub use notification::{INotificationService, Notification, NotificationPriority};
pub use operation_executor::IOperationExecutor;
pub use operation_store::IOperationStore;
pub use preference_store::IPreferenceStore;
pub use user_prompt::IUserPrompt;
