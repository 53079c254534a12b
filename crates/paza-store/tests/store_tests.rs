//! Integration tests for the SQLite stores
//!
//! These tests verify the IOperationStore and IPreferenceStore
//! implementations using an in-memory SQLite database. Each test function
//! creates a fresh database to ensure test isolation.

use chrono::Utc;
use serde_json::json;

use paza_core::domain::operation::{OperationKind, PendingOperation, RetryPolicy};
use paza_core::domain::OperationId;
use paza_core::ports::{IOperationStore, IPreferenceStore};
use paza_store::{DatabasePool, SqliteOperationStore, SqlitePreferenceStore};

// ============================================================================
// Test helpers
// ============================================================================

/// Create a fresh in-memory operation store for each test
async fn setup_operations() -> SqliteOperationStore {
    let pool = DatabasePool::in_memory()
        .await
        .expect("Failed to create in-memory database");
    SqliteOperationStore::new(pool.pool().clone())
}

/// Create a fresh in-memory preference store for each test
async fn setup_preferences() -> SqlitePreferenceStore {
    let pool = DatabasePool::in_memory()
        .await
        .expect("Failed to create in-memory database");
    SqlitePreferenceStore::new(pool.pool().clone())
}

fn recipient_create(name: &str) -> PendingOperation {
    PendingOperation::new(
        OperationKind::RecipientCreate,
        json!({"name": name, "msisdn": "+254700000001"}),
    )
}

// ============================================================================
// Operation log tests
// ============================================================================

#[tokio::test]
async fn test_append_and_load_pending() {
    let store = setup_operations().await;
    let op = recipient_create("Asha");

    store.append(&op).await.unwrap();

    let pending = store.load_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0], op);
}

#[tokio::test]
async fn test_load_pending_preserves_insertion_order() {
    let store = setup_operations().await;

    let first = recipient_create("Asha");
    let second = PendingOperation::new(
        OperationKind::TransactionCreate,
        json!({"amount": 2500, "currency": "KES"}),
    );
    let third = PendingOperation::new(
        OperationKind::TransactionStatusUpdate,
        json!({"transaction_id": "tx-1", "status": "cancelled"}),
    );

    store.append(&first).await.unwrap();
    store.append(&second).await.unwrap();
    store.append(&third).await.unwrap();

    let pending = store.load_pending().await.unwrap();
    let ids: Vec<_> = pending.iter().map(|op| *op.id()).collect();
    assert_eq!(ids, vec![*first.id(), *second.id(), *third.id()]);
}

#[tokio::test]
async fn test_update_persists_retry_bookkeeping() {
    let store = setup_operations().await;
    let mut op = recipient_create("Asha");
    store.append(&op).await.unwrap();

    op.record_failure("502 Bad Gateway", &RetryPolicy::default(), Utc::now());
    store.update(&op).await.unwrap();

    let pending = store.load_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].attempts(), 1);
    assert_eq!(pending[0].last_error(), Some("502 Bad Gateway"));
    assert_eq!(pending[0].not_before(), op.not_before());
}

#[tokio::test]
async fn test_remove_deletes_operation() {
    let store = setup_operations().await;
    let op = recipient_create("Asha");
    store.append(&op).await.unwrap();

    store.remove(op.id()).await.unwrap();

    assert!(store.load_pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_unknown_id_is_harmless() {
    let store = setup_operations().await;
    store.remove(&OperationId::new()).await.unwrap();
}

#[tokio::test]
async fn test_dead_lettered_operations_are_partitioned() {
    let store = setup_operations().await;

    let pending_op = recipient_create("Asha");
    let mut dead_op = recipient_create("Biko");
    store.append(&pending_op).await.unwrap();
    store.append(&dead_op).await.unwrap();

    dead_op.record_failure("account closed", &RetryPolicy::default(), Utc::now());
    dead_op.mark_dead_lettered().unwrap();
    store.update(&dead_op).await.unwrap();

    let pending = store.load_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id(), pending_op.id());

    let dead = store.load_dead_lettered().await.unwrap();
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].id(), dead_op.id());
    assert_eq!(dead[0].last_error(), Some("account closed"));
}

#[tokio::test]
async fn test_payload_roundtrips_as_json() {
    let store = setup_operations().await;
    let op = PendingOperation::new(
        OperationKind::ProfileUpdate,
        json!({"display_name": "Asha W.", "tags": ["kyc", "verified"], "level": 2}),
    );
    store.append(&op).await.unwrap();

    let pending = store.load_pending().await.unwrap();
    assert_eq!(pending[0].payload(), op.payload());
}

// ============================================================================
// Preference tests
// ============================================================================

#[tokio::test]
async fn test_get_unset_preference_is_none() {
    let store = setup_preferences().await;
    let value = store.get_bool("offline_mode").await.unwrap();
    assert!(value.is_none());
}

#[tokio::test]
async fn test_set_and_get_preference() {
    let store = setup_preferences().await;

    store.set_bool("offline_mode", true).await.unwrap();
    assert_eq!(store.get_bool("offline_mode").await.unwrap(), Some(true));

    store.set_bool("offline_mode", false).await.unwrap();
    assert_eq!(store.get_bool("offline_mode").await.unwrap(), Some(false));
}

#[tokio::test]
async fn test_preferences_are_keyed_independently() {
    let store = setup_preferences().await;

    store.set_bool("offline_mode", true).await.unwrap();

    assert_eq!(store.get_bool("offline_mode").await.unwrap(), Some(true));
    assert!(store.get_bool("other_flag").await.unwrap().is_none());
}
