//! Transactional dedupe receipts.
//!
//! Two independent mechanisms with different purposes, both required:
//!
//! - [`claim_event`] guards externally- or queue-triggered operations
//!   (webhook replays, task-queue redelivery) through the
//!   `processed_events` table.
//! - [`claim_idempotency_key`] guards first-party request retries
//!   through the `idempotency_keys` table, optionally replaying the
//!   stored response byte-identically.
//!
//! Both are insert-or-detect-conflict and must run as the very first
//! statement of the owning transaction, before any side effect. A
//! dedupe check outside that transaction would open a window between
//! check and effect and is a correctness bug, not an optimization.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::ids::PropertyId;

/// Receipt source for task-queue deliveries.
pub const SOURCE_TASK_QUEUE: &str = "task-queue";
/// Receipt source for payment-provider webhooks.
pub const SOURCE_PAYMENT_WEBHOOK: &str = "payment-webhook";
/// Receipt source for messaging-provider webhooks.
pub const SOURCE_MESSAGING_WEBHOOK: &str = "messaging-webhook";

/// Idempotency scope for hold creation.
pub const SCOPE_CREATE_HOLD: &str = "create_hold";
/// Idempotency scope for hold cancellation.
pub const SCOPE_CANCEL_HOLD: &str = "cancel_hold";

const INSERT_EVENT_RECEIPT: &str = r"
    INSERT OR IGNORE INTO processed_events (property_id, source, external_id, processed_at)
    VALUES (?, ?, ?, ?)
";

const INSERT_KEY: &str = r"
    INSERT OR IGNORE INTO idempotency_keys
    (property_id, scope, idempotency_key, response, created_at)
    VALUES (?, ?, ?, NULL, ?)
";

const SELECT_KEY_RESPONSE: &str = r"
    SELECT response FROM idempotency_keys
    WHERE property_id = ? AND scope = ? AND idempotency_key = ?
";

const STORE_KEY_RESPONSE: &str = r"
    UPDATE idempotency_keys
    SET response = ?
    WHERE property_id = ? AND scope = ? AND idempotency_key = ?
";

/// Outcome of claiming an external event id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClaim {
    /// First delivery; the receipt is now pending in this transaction.
    Fresh,
    /// The event was already processed by a committed transaction.
    AlreadyProcessed,
}

/// Outcome of claiming a first-party idempotency key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyClaim {
    /// First use; the key row is now pending in this transaction.
    Fresh,
    /// The key was already used; carries the stored response, if the
    /// prior run recorded one.
    Replayed(Option<serde_json::Value>),
}

/// Claims an external event id for the current transaction.
///
/// The conflicting insert is the dedupe signal, not an error: zero rows
/// affected means a previous delivery already committed its effects,
/// and the caller must short-circuit to its no-op success path. Because
/// the receipt commits or rolls back with the effects it guards, a
/// failed attempt leaves the id claimable by the next delivery.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn claim_event(
    conn: &Connection,
    property_id: PropertyId,
    source: &str,
    external_id: &str,
    now: DateTime<Utc>,
) -> Result<EventClaim> {
    let affected = conn.execute(
        INSERT_EVENT_RECEIPT,
        params![property_id, source, external_id, now.timestamp()],
    )?;
    Ok(if affected == 1 {
        EventClaim::Fresh
    } else {
        EventClaim::AlreadyProcessed
    })
}

/// Claims a first-party idempotency key for the current transaction.
///
/// On replay, returns the response stored by the committed first run so
/// the caller can answer byte-identically.
///
/// # Errors
///
/// Returns an error if the statements fail or a stored response is not
/// valid JSON.
pub fn claim_idempotency_key(
    conn: &Connection,
    property_id: PropertyId,
    scope: &str,
    key: &str,
    now: DateTime<Utc>,
) -> Result<KeyClaim> {
    let affected = conn.execute(
        INSERT_KEY,
        params![property_id, scope, key, now.timestamp()],
    )?;
    if affected == 1 {
        return Ok(KeyClaim::Fresh);
    }

    let stored: Option<Option<String>> = conn
        .query_row(SELECT_KEY_RESPONSE, params![property_id, scope, key], |row| {
            row.get(0)
        })
        .optional()?;
    let response = match stored.flatten() {
        Some(raw) => Some(serde_json::from_str(&raw)?),
        None => None,
    };
    Ok(KeyClaim::Replayed(response))
}

/// Stores the response to replay for a claimed key.
///
/// Runs in the same transaction as the effect, so key and response
/// become visible atomically.
///
/// # Errors
///
/// Returns an error if serialization or the update fails.
pub fn store_response(
    conn: &Connection,
    property_id: PropertyId,
    scope: &str,
    key: &str,
    response: &serde_json::Value,
) -> Result<()> {
    conn.execute(
        STORE_KEY_RESPONSE,
        params![serde_json::to_string(response)?, property_id, scope, key],
    )?;
    Ok(())
}
