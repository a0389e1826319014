//! The transactional outbox.
//!
//! Every state change appends its event rows through [`emit`] inside
//! the same transaction as the change itself, so a committed mutation
//! and its events are indivisible. Rows are append-only; consumers
//! read, they never mutate.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::error::Result;
use crate::event::{AggregateType, DomainEvent, EventPayload, EventType};
use crate::ids::PropertyId;

const INSERT_EVENT: &str = r"
    INSERT INTO outbox_events
    (property_id, event_type, aggregate_type, aggregate_id, occurred_at,
     correlation_id, payload)
    VALUES (?, ?, ?, ?, ?, ?, ?)
";

const LIST_EVENTS: &str = r"
    SELECT id, property_id, event_type, aggregate_type, aggregate_id,
           occurred_at, correlation_id, payload
    FROM outbox_events
    WHERE property_id = ?
    ORDER BY id
";

/// Appends one event row.
///
/// Must be called on the connection of the transaction that performs
/// the state change the event describes.
///
/// # Errors
///
/// Returns an error if serialization or the insert fails.
#[allow(clippy::too_many_arguments)]
pub fn emit(
    conn: &Connection,
    property_id: PropertyId,
    event_type: EventType,
    aggregate_type: AggregateType,
    aggregate_id: i64,
    correlation_id: Option<&str>,
    payload: &EventPayload,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        INSERT_EVENT,
        params![
            property_id,
            event_type.as_str(),
            aggregate_type.as_str(),
            aggregate_id,
            now.timestamp(),
            correlation_id,
            serde_json::to_string(&payload.to_json()?)?,
        ],
    )?;
    Ok(())
}

/// Lists a property's events in insertion order.
///
/// # Errors
///
/// Returns an error if the query fails or a stored payload is not
/// valid JSON.
pub fn list_events(conn: &Connection, property_id: PropertyId) -> Result<Vec<DomainEvent>> {
    let mut stmt = conn.prepare(LIST_EVENTS)?;
    let rows = stmt.query_map([property_id], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, PropertyId>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, i64>(5)?,
            row.get::<_, Option<String>>(6)?,
            row.get::<_, String>(7)?,
        ))
    })?;

    let mut events = Vec::new();
    for row in rows {
        let (id, property_id, event_type, aggregate_type, aggregate_id, occurred, corr, raw) =
            row?;
        events.push(DomainEvent {
            id,
            property_id,
            event_type,
            aggregate_type,
            aggregate_id,
            occurred_at: DateTime::from_timestamp(occurred, 0).unwrap_or_default(),
            correlation_id: corr,
            payload: serde_json::from_str(&raw)?,
        });
    }
    Ok(events)
}

/// Counts a property's events of a given type.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_events(
    conn: &Connection,
    property_id: PropertyId,
    event_type: EventType,
) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM outbox_events WHERE property_id = ? AND event_type = ?",
        params![property_id, event_type.as_str()],
        |row| row.get(0),
    )?)
}
