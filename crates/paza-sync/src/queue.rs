//! Deferred operation queue
//!
//! The [`OperationQueue`] holds writes that were performed while offline,
//! in FIFO order, until a sync pass replays them. The in-memory queue is a
//! cache over the durable `IOperationStore` log: a restart hydrates the
//! queue from the log instead of silently losing pending work.
//!
//! ## Ordering
//!
//! Enqueue order is the only ordering and it is a correctness guarantee:
//! operations that depend on earlier state (a recipient create before a
//! transaction referencing that recipient) must replay in the order they
//! were deferred. Draining is therefore strictly sequential.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use paza_core::domain::newtypes::OperationId;
use paza_core::domain::operation::{PendingOperation, RetryPolicy};
use paza_core::domain::outcome::SyncOutcome;
use paza_core::ports::{IOperationExecutor, IOperationStore};

/// FIFO queue of deferred operations, backed by a durable log
///
/// Mutated by `enqueue` (any caller, any time) and by `drain` (only the
/// sync coordinator, which serializes drains behind its in-flight guard).
pub struct OperationQueue {
    /// Live queue, in enqueue order
    items: Mutex<VecDeque<PendingOperation>>,
    /// Durable log backing the live queue
    store: Arc<dyn IOperationStore>,
}

impl OperationQueue {
    /// Creates an empty queue over the given durable log
    pub fn new(store: Arc<dyn IOperationStore>) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            store,
        }
    }

    /// Loads operations that survived a restart from the durable log
    ///
    /// Replaces the live queue with the log's pending operations, in
    /// insertion order. A read failure is logged and leaves the queue
    /// empty; losing the cache is recoverable, blocking startup is not.
    pub async fn hydrate(&self) -> usize {
        match self.store.load_pending().await {
            Ok(operations) => {
                let count = operations.len();
                let mut items = self.items.lock().await;
                *items = operations.into();
                if count > 0 {
                    info!(count, "Hydrated deferred operations from durable log");
                }
                count
            }
            Err(err) => {
                warn!(error = %err, "Could not hydrate operation queue, starting empty");
                0
            }
        }
    }

    /// Appends a deferred operation to the end of the queue
    ///
    /// Never rejects. The durable append is attempted first; if it fails
    /// the operation is kept in memory anyway and the failure is only
    /// logged (the in-memory queue is authoritative for the session).
    pub async fn enqueue(&self, op: PendingOperation) {
        if let Err(err) = self.store.append(&op).await {
            warn!(
                id = %op.id(),
                error = %err,
                "Deferred operation not persisted; it will not survive a restart"
            );
        }

        let mut items = self.items.lock().await;
        items.push_back(op);
        debug!(pending = items.len(), "Operation enqueued");
    }

    /// Returns the number of operations awaiting replay
    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    /// Returns true when nothing is awaiting replay
    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }

    /// Lists operations parked in the dead-letter state
    pub async fn dead_letters(&self) -> anyhow::Result<Vec<PendingOperation>> {
        self.store.load_dead_lettered().await
    }

    // ========================================================================
    // Drain
    // ========================================================================

    /// Replays queued operations in FIFO order and returns the tally
    ///
    /// Iterates a snapshot of the queue taken at entry, so operations
    /// enqueued while the drain runs wait for the next pass (keeps a pass
    /// from extending itself indefinitely). Each operation is awaited
    /// before the next starts.
    ///
    /// Per operation:
    /// - backoff window not yet elapsed: counted as deferred, untouched
    /// - success: removed from the live queue and the durable log
    /// - failure: retained with the failure recorded and the next attempt
    ///   scheduled; once the retry budget is exhausted the operation is
    ///   moved to the dead-letter state instead
    ///
    /// A failure never aborts the rest of the pass. Not reentrant; the
    /// caller serializes drains.
    pub async fn drain(
        &self,
        executor: &dyn IOperationExecutor,
        policy: &RetryPolicy,
    ) -> SyncOutcome {
        let snapshot: Vec<PendingOperation> = {
            let items = self.items.lock().await;
            items.iter().cloned().collect()
        };

        let mut outcome = SyncOutcome::new();

        for op in snapshot {
            if !op.is_due(Utc::now()) {
                debug!(
                    id = %op.id(),
                    not_before = ?op.not_before(),
                    "Operation still in backoff window, deferring"
                );
                outcome.record_deferral();
                continue;
            }

            match executor.execute(&op).await {
                Ok(()) => {
                    self.remove_live(op.id()).await;
                    if let Err(err) = self.store.remove(op.id()).await {
                        warn!(id = %op.id(), error = %err, "Replayed operation not removed from durable log");
                    }
                    outcome.record_success();
                    info!(id = %op.id(), kind = %op.kind(), "Deferred operation replayed");
                }
                Err(err) => {
                    outcome.record_failure();
                    warn!(
                        id = %op.id(),
                        kind = %op.kind(),
                        error = %err,
                        "Deferred operation failed during replay"
                    );
                    self.retain_or_dead_letter(op.id(), format!("{err:#}"), policy, &mut outcome)
                        .await;
                }
            }
        }

        outcome
    }

    /// Removes one operation from the live queue by id
    async fn remove_live(&self, id: &OperationId) {
        let mut items = self.items.lock().await;
        if let Some(pos) = items.iter().position(|o| o.id() == id) {
            items.remove(pos);
        }
    }

    /// Updates a failed operation's bookkeeping and persists it
    ///
    /// Retained operations keep their queue position; operations that
    /// exhausted the retry budget leave the live queue for the dead-letter
    /// state.
    async fn retain_or_dead_letter(
        &self,
        id: &OperationId,
        error: String,
        policy: &RetryPolicy,
        outcome: &mut SyncOutcome,
    ) {
        let updated = {
            let mut items = self.items.lock().await;
            let Some(pos) = items.iter().position(|o| o.id() == id) else {
                return;
            };

            items[pos].record_failure(error, policy, Utc::now());

            if policy.is_exhausted(items[pos].attempts()) {
                match items.remove(pos) {
                    Some(mut dead) => {
                        if let Err(state_err) = dead.mark_dead_lettered() {
                            warn!(id = %id, error = %state_err, "Could not dead-letter operation");
                        }
                        outcome.record_dead_letter();
                        warn!(
                            id = %dead.id(),
                            kind = %dead.kind(),
                            attempts = dead.attempts(),
                            "Operation exhausted its retry budget and was dead-lettered"
                        );
                        Some(dead)
                    }
                    None => None,
                }
            } else {
                Some(items[pos].clone())
            }
        };

        if let Some(op) = updated {
            if let Err(err) = self.store.update(&op).await {
                warn!(id = %op.id(), error = %err, "Operation update not persisted");
            }
        }
    }
}

// ============================================================================
// Unit tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use tokio::sync::Mutex as TokioMutex;

    use paza_core::domain::operation::OperationKind;

    use super::*;

    /// In-memory stand-in for the durable log
    #[derive(Default)]
    struct MemoryStore {
        rows: TokioMutex<Vec<PendingOperation>>,
    }

    #[async_trait::async_trait]
    impl IOperationStore for MemoryStore {
        async fn append(&self, op: &PendingOperation) -> anyhow::Result<()> {
            self.rows.lock().await.push(op.clone());
            Ok(())
        }

        async fn update(&self, op: &PendingOperation) -> anyhow::Result<()> {
            let mut rows = self.rows.lock().await;
            if let Some(row) = rows.iter_mut().find(|r| r.id() == op.id()) {
                *row = op.clone();
            }
            Ok(())
        }

        async fn remove(&self, id: &OperationId) -> anyhow::Result<()> {
            self.rows.lock().await.retain(|r| r.id() != id);
            Ok(())
        }

        async fn load_pending(&self) -> anyhow::Result<Vec<PendingOperation>> {
            Ok(self
                .rows
                .lock()
                .await
                .iter()
                .filter(|r| r.state().is_pending())
                .cloned()
                .collect())
        }

        async fn load_dead_lettered(&self) -> anyhow::Result<Vec<PendingOperation>> {
            Ok(self
                .rows
                .lock()
                .await
                .iter()
                .filter(|r| !r.state().is_pending())
                .cloned()
                .collect())
        }
    }

    /// Executor that records replay order and fails scripted ids
    #[derive(Default)]
    struct ScriptedExecutor {
        fail_ids: HashSet<OperationId>,
        executed: TokioMutex<Vec<OperationId>>,
    }

    #[async_trait::async_trait]
    impl IOperationExecutor for ScriptedExecutor {
        async fn execute(&self, op: &PendingOperation) -> anyhow::Result<()> {
            self.executed.lock().await.push(*op.id());
            if self.fail_ids.contains(op.id()) {
                anyhow::bail!("scripted failure");
            }
            Ok(())
        }
    }

    fn test_op() -> PendingOperation {
        PendingOperation::new(OperationKind::RecipientCreate, json!({"name": "Asha"}))
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_enqueue_grows_length_by_one() {
        let queue = OperationQueue::new(Arc::new(MemoryStore::default()));

        for expected in 1..=3 {
            queue.enqueue(test_op()).await;
            assert_eq!(queue.len().await, expected);
        }
    }

    #[tokio::test]
    async fn test_drain_replays_in_fifo_order() {
        let queue = OperationQueue::new(Arc::new(MemoryStore::default()));
        let a = test_op();
        let b = test_op();
        let c = test_op();
        let expected = vec![*a.id(), *b.id(), *c.id()];

        queue.enqueue(a).await;
        queue.enqueue(b).await;
        queue.enqueue(c).await;

        let executor = ScriptedExecutor::default();
        let outcome = queue.drain(&executor, &RetryPolicy::default()).await;

        assert_eq!(outcome.succeeded(), 3);
        assert_eq!(outcome.failed(), 0);
        assert_eq!(queue.len().await, 0);
        assert_eq!(*executor.executed.lock().await, expected);
    }

    #[tokio::test]
    async fn test_partial_failure_retains_only_the_failed_operation() {
        let queue = OperationQueue::new(Arc::new(MemoryStore::default()));
        let a = test_op();
        let b = test_op();
        let failed_id = *b.id();

        queue.enqueue(a).await;
        queue.enqueue(b).await;

        let executor = ScriptedExecutor {
            fail_ids: HashSet::from([failed_id]),
            ..Default::default()
        };
        let outcome = queue.drain(&executor, &RetryPolicy::default()).await;

        assert_eq!(outcome.succeeded(), 1);
        assert_eq!(outcome.failed(), 1);
        assert_eq!(queue.len().await, 1);

        let remaining = queue.items.lock().await;
        assert_eq!(remaining[0].id(), &failed_id);
        assert_eq!(remaining[0].attempts(), 1);
        assert!(remaining[0].last_error().is_some());
    }

    #[tokio::test]
    async fn test_operation_enqueued_mid_drain_waits_for_next_pass() {
        struct EnqueuingExecutor {
            queue: Arc<OperationQueue>,
        }

        #[async_trait::async_trait]
        impl IOperationExecutor for EnqueuingExecutor {
            async fn execute(&self, _op: &PendingOperation) -> anyhow::Result<()> {
                self.queue.enqueue(test_op()).await;
                Ok(())
            }
        }

        let queue = Arc::new(OperationQueue::new(Arc::new(MemoryStore::default())));
        queue.enqueue(test_op()).await;

        let executor = EnqueuingExecutor {
            queue: Arc::clone(&queue),
        };
        let outcome = queue.drain(&executor, &RetryPolicy::default()).await;

        // Only the snapshot was processed; the new operation is still queued
        assert_eq!(outcome.succeeded(), 1);
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test]
    async fn test_failed_operation_defers_until_backoff_elapses() {
        let queue = OperationQueue::new(Arc::new(MemoryStore::default()));
        let op = test_op();
        let id = *op.id();
        queue.enqueue(op).await;

        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_secs(3600),
            max_delay: Duration::from_secs(3600),
        };
        let executor = ScriptedExecutor {
            fail_ids: HashSet::from([id]),
            ..Default::default()
        };

        let first = queue.drain(&executor, &policy).await;
        assert_eq!(first.failed(), 1);

        // Second pass: the hour-long backoff window has not elapsed
        let second = queue.drain(&executor, &policy).await;
        assert_eq!(second.deferred(), 1);
        assert_eq!(second.processed(), 0);
        assert_eq!(queue.len().await, 1);
        assert_eq!(executor.executed.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_operation_is_dead_lettered() {
        let store = Arc::new(MemoryStore::default());
        let queue = OperationQueue::new(Arc::clone(&store) as Arc<dyn IOperationStore>);
        let op = test_op();
        let id = *op.id();
        queue.enqueue(op).await;

        let executor = ScriptedExecutor {
            fail_ids: HashSet::from([id]),
            ..Default::default()
        };
        let outcome = queue.drain(&executor, &fast_policy(1)).await;

        assert_eq!(outcome.failed(), 1);
        assert_eq!(outcome.dead_lettered(), 1);
        assert_eq!(queue.len().await, 0);

        let dead = queue.dead_letters().await.unwrap();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].id(), &id);

        // The dead operation no longer affects later passes
        let followup = queue.drain(&executor, &fast_policy(1)).await;
        assert_eq!(followup.processed(), 0);
    }

    #[tokio::test]
    async fn test_hydrate_restores_pending_operations_in_order() {
        let store = Arc::new(MemoryStore::default());

        let first = test_op();
        let second = test_op();
        let expected = vec![*first.id(), *second.id()];
        {
            let original = OperationQueue::new(Arc::clone(&store) as Arc<dyn IOperationStore>);
            original.enqueue(first).await;
            original.enqueue(second).await;
        }

        // A fresh queue over the same store sees the surviving operations
        let restarted = OperationQueue::new(store as Arc<dyn IOperationStore>);
        assert_eq!(restarted.hydrate().await, 2);

        let items = restarted.items.lock().await;
        let ids: Vec<_> = items.iter().map(|o| *o.id()).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_enqueue_survives_store_failure() {
        struct BrokenStore;

        #[async_trait::async_trait]
        impl IOperationStore for BrokenStore {
            async fn append(&self, _op: &PendingOperation) -> anyhow::Result<()> {
                anyhow::bail!("disk full")
            }
            async fn update(&self, _op: &PendingOperation) -> anyhow::Result<()> {
                anyhow::bail!("disk full")
            }
            async fn remove(&self, _id: &OperationId) -> anyhow::Result<()> {
                anyhow::bail!("disk full")
            }
            async fn load_pending(&self) -> anyhow::Result<Vec<PendingOperation>> {
                anyhow::bail!("disk full")
            }
            async fn load_dead_lettered(&self) -> anyhow::Result<Vec<PendingOperation>> {
                anyhow::bail!("disk full")
            }
        }

        let queue = OperationQueue::new(Arc::new(BrokenStore));

        // Enqueue never rejects and hydrate never fails startup
        queue.enqueue(test_op()).await;
        assert_eq!(queue.len().await, 1);
        assert_eq!(queue.hydrate().await, 0);
    }
}
