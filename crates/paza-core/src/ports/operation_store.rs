//! Operation store port (driven/secondary port)
//!
//! This module defines the interface for durably persisting the deferred
//! operation queue. The in-memory queue is a cache over this log: a restart
//! or crash must not silently lose pending work.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   (SQLite, filesystem, etc.) and don't need domain-level classification.
//! - Insertion order is the contract: `load_pending` must return operations
//!   in the order they were appended, since replay order is a correctness
//!   guarantee (a recipient must exist before a transaction referencing it).
//! - Write failures are treated as non-fatal by callers; the in-memory
//!   queue remains authoritative for the session.

use crate::domain::newtypes::OperationId;
use crate::domain::operation::PendingOperation;

/// Port trait for the durable, ordered log of deferred operations
#[async_trait::async_trait]
pub trait IOperationStore: Send + Sync {
    /// Appends a newly deferred operation to the end of the log
    async fn append(&self, op: &PendingOperation) -> anyhow::Result<()>;

    /// Updates an existing operation in place (attempts, state, backoff)
    ///
    /// The operation keeps its original position in the log.
    async fn update(&self, op: &PendingOperation) -> anyhow::Result<()>;

    /// Removes an operation from the log (after successful replay)
    async fn remove(&self, id: &OperationId) -> anyhow::Result<()>;

    /// Loads all operations still awaiting replay, in insertion order
    async fn load_pending(&self) -> anyhow::Result<Vec<PendingOperation>>;

    /// Loads all dead-lettered operations, in insertion order
    async fn load_dead_lettered(&self) -> anyhow::Result<Vec<PendingOperation>>;
}
