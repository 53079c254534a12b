//! Pending operation domain entity
//!
//! A [`PendingOperation`] is a write request that was deferred because the
//! device was offline (or the user forced offline mode). Instead of holding
//! opaque closures, the queue holds tagged records: the kind of write, its
//! JSON payload, and bookkeeping for retries. The actual network call is
//! performed later through the `IOperationExecutor` port.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::OperationId;

// ============================================================================
// OperationKind
// ============================================================================

/// The kind of write operation that was deferred
///
/// Covers the money-transfer writes the application performs while offline.
/// The executor adapter maps each kind (plus its payload) to the real
/// backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Create a new transfer recipient
    RecipientCreate,
    /// Update an existing recipient's details
    RecipientUpdate,
    /// Delete a recipient
    RecipientDelete,
    /// Create a money transfer
    TransactionCreate,
    /// Update the status of an existing transfer
    TransactionStatusUpdate,
    /// Update the user's own profile
    ProfileUpdate,
}

impl OperationKind {
    /// Stable snake_case name, used for storage and log fields
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::RecipientCreate => "recipient_create",
            OperationKind::RecipientUpdate => "recipient_update",
            OperationKind::RecipientDelete => "recipient_delete",
            OperationKind::TransactionCreate => "transaction_create",
            OperationKind::TransactionStatusUpdate => "transaction_status_update",
            OperationKind::ProfileUpdate => "profile_update",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// OperationState
// ============================================================================

/// Lifecycle state of a deferred operation
///
/// Successful operations are removed outright, so only two states persist:
/// waiting for replay, or parked after exhausting the retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationState {
    /// Waiting in the queue for the next sync pass
    Pending,
    /// Retry budget exhausted; held for manual resolution
    DeadLettered,
}

impl OperationState {
    /// Stable snake_case name, used for storage and log fields
    pub fn name(&self) -> &'static str {
        match self {
            OperationState::Pending => "pending",
            OperationState::DeadLettered => "dead_lettered",
        }
    }

    /// Returns true if the operation is still eligible for replay
    pub fn is_pending(&self) -> bool {
        matches!(self, OperationState::Pending)
    }
}

impl Default for OperationState {
    fn default() -> Self {
        OperationState::Pending
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// RetryPolicy
// ============================================================================

/// Retry budget and backoff schedule for failed replays
///
/// A failed operation is retried on subsequent sync passes with exponential
/// backoff (`base_delay * 2^(attempts-1)`, capped at `max_delay`). Once
/// `max_attempts` failures accumulate the operation is dead-lettered instead
/// of being retried forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Failures allowed before the operation is dead-lettered
    pub max_attempts: u32,
    /// Delay after the first failure
    pub base_delay: Duration,
    /// Upper bound on the computed backoff delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(30),
            max_delay: Duration::from_secs(3600),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay to apply after the given number of failures
    ///
    /// `attempts` is the post-failure count (1 for the first failure).
    /// The exponent is clamped so the multiplication cannot overflow.
    pub fn delay_for(&self, attempts: u32) -> Duration {
        let exp = attempts.saturating_sub(1).min(16);
        let delay = self.base_delay.saturating_mul(2u32.saturating_pow(exp));
        delay.min(self.max_delay)
    }

    /// Returns true once the attempt budget is used up
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }
}

// ============================================================================
// PendingOperation
// ============================================================================

/// A write operation deferred while offline, awaiting replay
///
/// Created by the facade when the application performs a write while
/// offline. Owned by the operation queue until it either succeeds (removed)
/// or exhausts its retry budget (dead-lettered). Queue position is the only
/// ordering; operations are replayed strictly in enqueue order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOperation {
    /// Unique identity of this deferred operation
    id: OperationId,
    /// What kind of write this is
    kind: OperationKind,
    /// Kind-specific request payload, interpreted by the executor
    payload: serde_json::Value,
    /// When the operation was deferred
    created_at: DateTime<Utc>,
    /// Number of failed replay attempts so far
    attempts: u32,
    /// Earliest time the next replay may run (backoff window)
    not_before: Option<DateTime<Utc>>,
    /// Current lifecycle state
    state: OperationState,
    /// Message from the most recent failure
    last_error: Option<String>,
}

impl PendingOperation {
    /// Creates a new pending operation with a fresh identity
    pub fn new(kind: OperationKind, payload: serde_json::Value) -> Self {
        Self {
            id: OperationId::new(),
            kind,
            payload,
            created_at: Utc::now(),
            attempts: 0,
            not_before: None,
            state: OperationState::Pending,
            last_error: None,
        }
    }

    // --- Getters ---

    /// Returns the operation's unique identifier
    pub fn id(&self) -> &OperationId {
        &self.id
    }

    /// Returns the kind of deferred write
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Returns the kind-specific payload
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// Returns when the operation was deferred
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the number of failed replay attempts
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns the earliest time the next replay may run
    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.not_before
    }

    /// Returns the current lifecycle state
    pub fn state(&self) -> OperationState {
        self.state
    }

    /// Returns the message from the most recent failure
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // --- Behavior ---

    /// Returns true if the backoff window has elapsed (or none is set)
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.not_before.map_or(true, |t| t <= now)
    }

    /// Records a failed replay attempt and schedules the next one
    ///
    /// Increments the attempt counter, remembers the error, and pushes
    /// `not_before` out according to the policy's backoff schedule.
    pub fn record_failure(
        &mut self,
        error: impl Into<String>,
        policy: &RetryPolicy,
        now: DateTime<Utc>,
    ) {
        self.attempts += 1;
        self.last_error = Some(error.into());
        let delay = chrono::Duration::from_std(policy.delay_for(self.attempts))
            .unwrap_or_else(|_| chrono::Duration::seconds(policy.max_delay.as_secs() as i64));
        self.not_before = Some(now + delay);
    }

    /// Moves the operation to the dead-letter state
    ///
    /// Only valid from `Pending`; dead-lettering twice is a state error.
    pub fn mark_dead_lettered(&mut self) -> Result<(), DomainError> {
        match self.state {
            OperationState::Pending => {
                self.state = OperationState::DeadLettered;
                Ok(())
            }
            OperationState::DeadLettered => Err(DomainError::InvalidState {
                from: self.state.name().to_string(),
                to: OperationState::DeadLettered.name().to_string(),
            }),
        }
    }
}
