//! SQLite implementation of IOperationStore
//!
//! This module provides the concrete SQLite-based implementation of the
//! operation store port defined in paza-core. It handles all domain type
//! serialization/deserialization and SQL query construction.
//!
//! ## Type Mapping
//!
//! | Domain Type      | SQL Type | Strategy                                   |
//! |------------------|----------|--------------------------------------------|
//! | OperationId      | TEXT     | UUID string via `.to_string()` / `FromStr` |
//! | OperationKind    | TEXT     | snake_case name via `.name()`              |
//! | OperationState   | TEXT     | snake_case name via `.name()`              |
//! | payload (JSON)   | TEXT     | serde_json text                            |
//! | DateTime<Utc>    | TEXT     | ISO 8601 via `to_rfc3339()`                |
//!
//! Rows are reconstructed through serde since `PendingOperation` has
//! private fields that can only be set through constructors or
//! deserialization.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use paza_core::domain::newtypes::OperationId;
use paza_core::domain::operation::{OperationState, PendingOperation};
use paza_core::ports::IOperationStore;

use crate::StoreError;

/// SQLite-based implementation of the operation store port
///
/// Persists the deferred operation log. The `seq` column (autoincrement)
/// preserves enqueue order; all loads are ordered by it.
pub struct SqliteOperationStore {
    pool: SqlitePool,
}

impl SqliteOperationStore {
    /// Creates a new store instance with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_by_state(&self, state: OperationState) -> anyhow::Result<Vec<PendingOperation>> {
        let rows = sqlx::query(
            "SELECT id, kind, payload, state, attempts, not_before, last_error, created_at \
             FROM pending_operations WHERE state = ? ORDER BY seq ASC",
        )
        .bind(state.name())
        .fetch_all(&self.pool)
        .await?;

        let mut operations = Vec::with_capacity(rows.len());
        for row in &rows {
            operations.push(pending_operation_from_row(row)?);
        }
        Ok(operations)
    }
}

// ============================================================================
// Row mapping
// ============================================================================

/// Reconstruct a PendingOperation from a database row
///
/// Builds the serde representation of the entity and deserializes it, so
/// storage stays decoupled from the entity's private field layout.
fn pending_operation_from_row(row: &SqliteRow) -> Result<PendingOperation, StoreError> {
    let id: String = row.get("id");
    let kind: String = row.get("kind");
    let payload_str: String = row.get("payload");
    let state: String = row.get("state");
    let attempts: i64 = row.get("attempts");
    let not_before: Option<String> = row.get("not_before");
    let last_error: Option<String> = row.get("last_error");
    let created_at: String = row.get("created_at");

    let payload: serde_json::Value = serde_json::from_str(&payload_str)
        .map_err(|e| StoreError::SerializationError(format!("Invalid payload JSON: {}", e)))?;

    let op_json = serde_json::json!({
        "id": id,
        "kind": kind,
        "payload": payload,
        "created_at": created_at,
        "attempts": attempts,
        "not_before": not_before,
        "state": state,
        "last_error": last_error,
    });

    serde_json::from_value(op_json).map_err(|e| {
        StoreError::SerializationError(format!("Invalid pending operation row: {}", e))
    })
}

// ============================================================================
// IOperationStore implementation
// ============================================================================

#[async_trait::async_trait]
impl IOperationStore for SqliteOperationStore {
    async fn append(&self, op: &PendingOperation) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO pending_operations \
             (id, kind, payload, state, attempts, not_before, last_error, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(op.id().to_string())
        .bind(op.kind().name())
        .bind(op.payload().to_string())
        .bind(op.state().name())
        .bind(op.attempts() as i64)
        .bind(op.not_before().map(|t| t.to_rfc3339()))
        .bind(op.last_error().map(|s| s.to_string()))
        .bind(op.created_at().to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::debug!(id = %op.id(), kind = %op.kind(), "Operation appended to durable log");
        Ok(())
    }

    async fn update(&self, op: &PendingOperation) -> anyhow::Result<()> {
        let result = sqlx::query(
            "UPDATE pending_operations \
             SET state = ?, attempts = ?, not_before = ?, last_error = ? \
             WHERE id = ?",
        )
        .bind(op.state().name())
        .bind(op.attempts() as i64)
        .bind(op.not_before().map(|t| t.to_rfc3339()))
        .bind(op.last_error().map(|s| s.to_string()))
        .bind(op.id().to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!(id = %op.id(), "Update targeted an operation missing from the log");
        }
        Ok(())
    }

    async fn remove(&self, id: &OperationId) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM pending_operations WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn load_pending(&self) -> anyhow::Result<Vec<PendingOperation>> {
        self.load_by_state(OperationState::Pending).await
    }

    async fn load_dead_lettered(&self) -> anyhow::Result<Vec<PendingOperation>> {
        self.load_by_state(OperationState::DeadLettered).await
    }
}
