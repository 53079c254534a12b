//! Operation executor port (driven/secondary port)
//!
//! The executor performs the real backend write for a deferred operation:
//! it maps the operation's kind and payload to the corresponding API call.
//! The sync engine never talks to the backend directly; it only decides
//! when and in what order executions happen.
//!
//! ## Design Notes
//!
//! - An `Err` return means this replay attempt failed. The engine counts
//!   the failure, keeps the operation queued, and schedules a retry; the
//!   executor must not retry internally.
//! - Executions are awaited one at a time in enqueue order; implementations
//!   may rely on earlier operations having completed (e.g. a recipient
//!   create before a transaction referencing it).

use crate::domain::operation::PendingOperation;

/// Port trait for replaying a deferred operation against the backend
#[async_trait::async_trait]
pub trait IOperationExecutor: Send + Sync {
    /// Performs the backend write described by `op`
    async fn execute(&self, op: &PendingOperation) -> anyhow::Result<()>;
}
