//! The inventory ledger: guarded counter mutations.
//!
//! Each (property, room type, date) row carries `inv_total`,
//! `inv_booked`, and `inv_held` with the standing invariant
//! `inv_total >= inv_booked + inv_held` and both counters non-negative.
//!
//! The ledger exposes a single mutation primitive, [`adjust`]. The
//! invariant lives in the UPDATE's own predicate, so the check and the
//! increment are one atomic statement: under concurrency a violating
//! write affects zero rows instead of racing a separate read. Callers
//! must treat "zero rows affected" as a hard failure for that night.
//! Counters are never mutated anywhere else.

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::error::Result;
use crate::ids::{PropertyId, RoomTypeId};

const RESERVE_GUARDED: &str = r"
    UPDATE inventory_days
    SET inv_held = inv_held + ?4,
        inv_booked = inv_booked + ?5,
        updated_at = ?6
    WHERE property_id = ?1 AND room_type_id = ?2 AND date = ?3
      AND stop_sell = 0
      AND inv_total >= (inv_booked + ?5) + (inv_held + ?4)
      AND inv_booked + ?5 >= 0
      AND inv_held + ?4 >= 0
";

const RELEASE_GUARDED: &str = r"
    UPDATE inventory_days
    SET inv_held = inv_held + ?4,
        inv_booked = inv_booked + ?5,
        updated_at = ?6
    WHERE property_id = ?1 AND room_type_id = ?2 AND date = ?3
      AND inv_booked + ?5 >= 0
      AND inv_held + ?4 >= 0
";

const SELECT_COUNTERS: &str = r"
    SELECT inv_total, inv_booked, inv_held, stop_sell
    FROM inventory_days
    WHERE property_id = ? AND room_type_id = ? AND date = ?
";

const UPSERT_DAY: &str = r"
    INSERT INTO inventory_days
    (property_id, room_type_id, date, inv_total, inv_booked, inv_held, stop_sell, updated_at)
    VALUES (?1, ?2, ?3, ?4, 0, 0, ?5, ?6)
    ON CONFLICT (property_id, room_type_id, date)
    DO UPDATE SET inv_total = ?4, stop_sell = ?5, updated_at = ?6
";

/// Counters of one ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryCounters {
    /// Capacity for the night.
    pub inv_total: i64,
    /// Confirmed bookings.
    pub inv_booked: i64,
    /// Provisional holds.
    pub inv_held: i64,
    /// Whether sales are stopped for the night regardless of capacity.
    pub stop_sell: bool,
}

impl InventoryCounters {
    /// Units still available to hold.
    #[must_use]
    pub const fn available(&self) -> i64 {
        self.inv_total - self.inv_booked - self.inv_held
    }
}

/// Applies a guarded delta to one ledger row.
///
/// When `require_available` is true (the reserve case), the predicate
/// additionally requires `stop_sell = 0` and enough free capacity for
/// the whole delta; this predicate, evaluated and applied in the same
/// statement as the increment, is what prevents overbooking under
/// concurrency. When false (release and convert cases), the predicate
/// only guards against driving a counter negative.
///
/// Returns whether the guarded row was actually affected. `false` means
/// the row is missing, stop-sold, lacks capacity, or the delta would
/// underflow a counter; the caller decides which of those is a normal
/// negative outcome and which is an integrity fault.
///
/// # Errors
///
/// Returns an error if the statement itself fails.
pub fn adjust(
    conn: &Connection,
    property_id: PropertyId,
    room_type_id: RoomTypeId,
    date: NaiveDate,
    delta_held: i64,
    delta_booked: i64,
    require_available: bool,
    now_unix: i64,
) -> Result<bool> {
    let sql = if require_available {
        RESERVE_GUARDED
    } else {
        RELEASE_GUARDED
    };
    let affected = conn.execute(
        sql,
        params![
            property_id,
            room_type_id,
            date.to_string(),
            delta_held,
            delta_booked,
            now_unix
        ],
    )?;
    Ok(affected == 1)
}

/// Reads one ledger row's counters.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_counters(
    conn: &Connection,
    property_id: PropertyId,
    room_type_id: RoomTypeId,
    date: NaiveDate,
) -> Result<Option<InventoryCounters>> {
    use rusqlite::OptionalExtension;
    let row = conn
        .query_row(
            SELECT_COUNTERS,
            params![property_id, room_type_id, date.to_string()],
            |row| {
                Ok(InventoryCounters {
                    inv_total: row.get(0)?,
                    inv_booked: row.get(1)?,
                    inv_held: row.get(2)?,
                    stop_sell: row.get::<_, i64>(3)? != 0,
                })
            },
        )
        .optional()?;
    Ok(row)
}

/// Creates or reshapes a ledger row's capacity and stop-sell flag.
///
/// Seeding/operator surface only: booked and held counters are never
/// touched here, and the CHECK constraint rejects a capacity cut below
/// the currently claimed units.
///
/// # Errors
///
/// Returns an error if the statement fails, including a capacity cut
/// that would violate the ledger invariant.
pub fn set_day(
    conn: &Connection,
    property_id: PropertyId,
    room_type_id: RoomTypeId,
    date: NaiveDate,
    inv_total: i64,
    stop_sell: bool,
    now_unix: i64,
) -> Result<()> {
    conn.execute(
        UPSERT_DAY,
        params![
            property_id,
            room_type_id,
            date.to_string(),
            inv_total,
            i64::from(stop_sell),
            now_unix
        ],
    )?;
    Ok(())
}
