//! Maintenance: outbox retention and ledger reconciliation.
//!
//! Neither touches the hold lifecycle. The sweep keeps the append-only
//! outbox from growing without bound; the audit recomputes what the
//! inventory counters should be from the hold rows and reports any
//! drift, which is the offline counterpart of the in-transaction
//! integrity faults.

use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};
use rusqlite::params;

use crate::database::Database;
use crate::error::{Error, Result};
use crate::ids::{PropertyId, RoomTypeId};

const COUNT_SWEEPABLE: &str = r"
    SELECT COUNT(*) FROM outbox_events WHERE occurred_at < ?
";

const DELETE_SWEEPABLE: &str = r"
    DELETE FROM outbox_events WHERE occurred_at < ?
";

// Expected counters recomputed from the hold rows themselves: active
// holds back inv_held, converted holds back inv_booked.
const AUDIT_ROWS: &str = r"
    SELECT d.room_type_id, d.date, d.inv_total, d.inv_booked, d.inv_held,
           COALESCE((SELECT SUM(n.qty) FROM hold_nights n
                     JOIN holds h ON h.id = n.hold_id
                     WHERE h.property_id = d.property_id
                       AND h.status = 'active'
                       AND n.room_type_id = d.room_type_id
                       AND n.date = d.date), 0),
           COALESCE((SELECT SUM(n.qty) FROM hold_nights n
                     JOIN holds h ON h.id = n.hold_id
                     WHERE h.property_id = d.property_id
                       AND h.status = 'converted'
                       AND n.room_type_id = d.room_type_id
                       AND n.date = d.date), 0)
    FROM inventory_days d
    WHERE d.property_id = ?
    ORDER BY d.room_type_id, d.date
";

/// Result of an outbox sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Rows older than the cutoff.
    pub sweepable: u64,
    /// Rows actually deleted; zero in a dry run.
    pub removed: u64,
}

/// One ledger row whose counters disagree with the hold rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditFinding {
    /// The room type of the drifted row.
    pub room_type_id: RoomTypeId,
    /// The night of the drifted row.
    pub date: NaiveDate,
    /// Stored held counter.
    pub inv_held: i64,
    /// Held units recomputed from active holds.
    pub expected_held: i64,
    /// Stored booked counter.
    pub inv_booked: i64,
    /// Booked units recomputed from converted holds.
    pub expected_booked: i64,
}

/// Result of a ledger audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    /// Ledger rows examined.
    pub rows_checked: u64,
    /// Rows whose counters drifted from the recomputation.
    pub findings: Vec<AuditFinding>,
}

impl AuditReport {
    /// Whether every examined row matched the recomputation.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Deletes outbox rows older than the retention window.
///
/// With `dry_run`, only counts what a real sweep would delete.
///
/// # Errors
///
/// Returns an error if the statements fail.
pub fn sweep_outbox(
    db: &mut Database,
    retention_days: u32,
    dry_run: bool,
    now: DateTime<Utc>,
) -> Result<SweepOutcome> {
    let cutoff = (now - chrono::Duration::days(i64::from(retention_days))).timestamp();

    let tx = db.begin_immediate()?;
    let sweepable: u64 = tx.query_row(COUNT_SWEEPABLE, params![cutoff], |row| row.get(0))?;
    let removed = if dry_run {
        0
    } else {
        tx.execute(DELETE_SWEEPABLE, params![cutoff])? as u64
    };
    tx.commit()?;

    info!(
        "outbox sweep: {sweepable} row(s) older than {retention_days} day(s), {removed} removed{}",
        if dry_run { " (dry run)" } else { "" }
    );
    Ok(SweepOutcome { sweepable, removed })
}

/// Recomputes a property's inventory counters from its hold rows and
/// reports every ledger row that disagrees.
///
/// Read-only; repairing drift is an operator decision, not something
/// the audit does on its own.
///
/// # Errors
///
/// Returns an error if the query fails, or
/// [`Error::DatabaseCorruption`] if a ledger row carries a date the
/// engine cannot read back.
pub fn audit_inventory(db: &Database, property_id: PropertyId) -> Result<AuditReport> {
    let conn = db.connection();
    let mut stmt = conn.prepare(AUDIT_ROWS)?;
    let rows = stmt.query_map([property_id], |row| {
        Ok((
            row.get::<_, RoomTypeId>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, i64>(5)?,
            row.get::<_, i64>(6)?,
        ))
    })?;

    let mut rows_checked = 0;
    let mut findings = Vec::new();
    for row in rows {
        let (room_type_id, date_raw, _total, inv_booked, inv_held, expected_held, expected_booked) =
            row?;
        rows_checked += 1;
        let date = date_raw.parse::<NaiveDate>().map_err(|_| {
            Error::DatabaseCorruption {
                details: format!(
                    "inventory row for room type {room_type_id} has unreadable date '{date_raw}'"
                ),
            }
        })?;
        if inv_held != expected_held || inv_booked != expected_booked {
            findings.push(AuditFinding {
                room_type_id,
                date,
                inv_held,
                expected_held,
                inv_booked,
                expected_booked,
            });
        }
    }

    if findings.is_empty() {
        info!("ledger audit: {rows_checked} row(s) checked, no drift");
    } else {
        warn!(
            "ledger audit: {} of {rows_checked} row(s) drifted",
            findings.len()
        );
    }
    Ok(AuditReport {
        rows_checked,
        findings,
    })
}
