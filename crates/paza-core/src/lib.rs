//! Paza Core - Domain logic and business rules for the offline sync engine
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `PendingOperation`, `ConnectivityState`, `SyncOutcome`
//! - **Port definitions** - Traits for adapters: `IOperationStore`,
//!   `IPreferenceStore`, `IOperationExecutor`, `IApiCache`,
//!   `INotificationService`, `IUserPrompt`
//! - **Retry policy** - Backoff and dead-letter budget for replayed operations
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no external dependencies.
//! Ports define trait interfaces that adapter crates (and the hosting
//! application) implement. The engine in `paza-sync` orchestrates domain
//! entities through the port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
