//! Paza Sync - Offline operation queue and synchronization engine
//!
//! Provides:
//! - Connectivity transition tracking with an optimistic online default
//! - A durable FIFO queue of writes deferred while offline
//! - A persisted offline-mode preference, independent of connectivity
//! - In-order replay with partial-failure accounting, backoff, and a
//!   dead-letter state for operations that exhaust their retry budget
//!
//! ## Modules
//!
//! - [`monitor`] - Consumes the platform connectivity signal
//! - [`queue`] - The deferred operation queue and its drain logic
//! - [`preference`] - The persisted offline-mode flag
//! - [`coordinator`] - Orchestrates sync passes over the queue
//! - [`facade`] - The public contract consumed by the application

pub mod coordinator;
pub mod facade;
pub mod monitor;
pub mod preference;
pub mod queue;

pub use coordinator::SyncCoordinator;
pub use facade::NetworkFacade;
pub use monitor::{ConnectivityEvent, ConnectivityHandle, ConnectivityMonitor};
pub use preference::OfflineModePreference;
pub use queue::OperationQueue;
