//! Database CRUD operations for engine entities.
//!
//! This module implements row-level reads and writes for properties,
//! room types, holds, hold nights, payments, and reservations. The
//! functions here are deliberately dumb: all transactional sequencing,
//! dedupe, and guarded inventory math live in [`crate::operations`] and
//! [`crate::database::ledger`]. Everything takes a `&Connection` so it
//! composes inside a caller-owned transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::booking::{Reservation, ReservationStatus};
use crate::error::{Error, Result};
use crate::hold::{Hold, HoldNight, HoldStatus, NewHold};
use crate::ids::{HoldId, PropertyId, ReservationId, RoomTypeId};
use crate::payment::{Payment, PaymentStatus};
use crate::stay::StayDates;

use super::connection::Database;

const INSERT_HOLD: &str = r"
    INSERT INTO holds
    (property_id, conversation_id, quote_option_id, checkin, checkout,
     total_amount, currency, status, expires_at, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, 'active', ?, ?, ?)
";

const SELECT_HOLD: &str = r"
    SELECT id, property_id, conversation_id, quote_option_id, checkin, checkout,
           total_amount, currency, status, expires_at, created_at, updated_at
    FROM holds
    WHERE property_id = ? AND id = ?
";

const LIST_HOLDS: &str = r"
    SELECT id, property_id, conversation_id, quote_option_id, checkin, checkout,
           total_amount, currency, status, expires_at, created_at, updated_at
    FROM holds
    WHERE property_id = ?
    ORDER BY id
";

// The status guard is part of the same statement that flips status:
// only one transaction holds the writer slot at a time, so at most one
// caller ever sees rows_affected = 1 for a given hold.
const MARK_HOLD_FROM_ACTIVE: &str = r"
    UPDATE holds
    SET status = ?, updated_at = ?
    WHERE property_id = ? AND id = ? AND status = 'active'
";

const FIND_DUE_HOLDS: &str = r"
    SELECT id, property_id
    FROM holds
    WHERE status = 'active' AND expires_at <= ?
    ORDER BY expires_at
    LIMIT ?
";

const INSERT_HOLD_NIGHT: &str = r"
    INSERT INTO hold_nights (hold_id, room_type_id, date, qty)
    VALUES (?, ?, ?, ?)
";

// Ascending (room_type_id, date) is the global lock order; every night
// walk in the engine reads through this statement.
const SELECT_HOLD_NIGHTS: &str = r"
    SELECT room_type_id, date, qty
    FROM hold_nights
    WHERE hold_id = ?
    ORDER BY room_type_id, date
";

const UPSERT_PAYMENT: &str = r"
    INSERT INTO payments
    (property_id, hold_id, provider, provider_object_id, status, amount, currency,
     created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
    ON CONFLICT (property_id, provider, provider_object_id)
    DO UPDATE SET status = ?5, updated_at = ?8
";

const SELECT_PAYMENT: &str = r"
    SELECT property_id, hold_id, provider, provider_object_id, status, amount, currency
    FROM payments
    WHERE property_id = ? AND provider = ? AND provider_object_id = ?
";

const INSERT_RESERVATION_IF_ABSENT: &str = r"
    INSERT INTO reservations
    (property_id, hold_id, status, checkin, checkout, total_amount, currency, created_at)
    VALUES (?, ?, 'confirmed', ?, ?, ?, ?, ?)
    ON CONFLICT (property_id, hold_id) DO NOTHING
";

const SELECT_RESERVATION_BY_HOLD: &str = r"
    SELECT id, property_id, hold_id, status, checkin, checkout, total_amount, currency
    FROM reservations
    WHERE property_id = ? AND hold_id = ?
";

/// A stored string that the engine never writes, discovered on read.
#[derive(Debug)]
struct CorruptValue {
    column: &'static str,
    value: String,
}

impl std::fmt::Display for CorruptValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "corrupt {} value '{}'", self.column, self.value)
    }
}

impl std::error::Error for CorruptValue {}

fn corrupt(column: &'static str, value: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(CorruptValue { column, value }),
    )
}

fn parse_date(column: &'static str, value: &str) -> rusqlite::Result<NaiveDate> {
    value
        .parse::<NaiveDate>()
        .map_err(|_| corrupt(column, value.to_string()))
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

fn row_to_hold(row: &rusqlite::Row<'_>) -> rusqlite::Result<Hold> {
    let checkin = parse_date("checkin", &row.get::<_, String>(4)?)?;
    let checkout = parse_date("checkout", &row.get::<_, String>(5)?)?;
    let stay = StayDates::new(checkin, checkout)
        .map_err(|e| corrupt("checkin/checkout", e.to_string()))?;
    let status_raw: String = row.get(8)?;
    let status = HoldStatus::parse(&status_raw).map_err(|v| corrupt("status", v))?;

    Ok(Hold {
        id: row.get(0)?,
        property_id: row.get(1)?,
        conversation_id: row.get(2)?,
        quote_option_id: row.get(3)?,
        stay,
        total_amount: row.get(6)?,
        currency: row.get(7)?,
        status,
        expires_at: timestamp(row.get(9)?),
        created_at: timestamp(row.get(10)?),
        updated_at: timestamp(row.get(11)?),
    })
}

fn row_to_payment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Payment> {
    let status_raw: String = row.get(4)?;
    let status = PaymentStatus::parse(&status_raw).map_err(|v| corrupt("status", v))?;
    Ok(Payment {
        property_id: row.get(0)?,
        hold_id: row.get(1)?,
        provider: row.get(2)?,
        provider_object_id: row.get(3)?,
        status,
        amount: row.get(5)?,
        currency: row.get(6)?,
    })
}

fn row_to_reservation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reservation> {
    let status_raw: String = row.get(3)?;
    let status = ReservationStatus::parse(&status_raw).map_err(|v| corrupt("status", v))?;
    Ok(Reservation {
        id: row.get(0)?,
        property_id: row.get(1)?,
        hold_id: row.get(2)?,
        status,
        checkin: parse_date("checkin", &row.get::<_, String>(4)?)?,
        checkout: parse_date("checkout", &row.get::<_, String>(5)?)?,
        total_amount: row.get(6)?,
        currency: row.get(7)?,
    })
}

impl Database {
    /// Creates a property.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including a duplicate name.
    pub fn create_property(conn: &Connection, name: &str, now: DateTime<Utc>) -> Result<PropertyId> {
        if name.trim().is_empty() {
            return Err(Error::Validation {
                field: "name".into(),
                message: "property name must be non-blank".into(),
            });
        }
        conn.execute(
            "INSERT INTO properties (name, created_at) VALUES (?, ?)",
            params![name.trim(), now.timestamp()],
        )?;
        Ok(PropertyId::new(conn.last_insert_rowid()))
    }

    /// Creates a room type within a property.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including a duplicate name
    /// within the property.
    pub fn create_room_type(
        conn: &Connection,
        property_id: PropertyId,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<RoomTypeId> {
        if name.trim().is_empty() {
            return Err(Error::Validation {
                field: "name".into(),
                message: "room type name must be non-blank".into(),
            });
        }
        conn.execute(
            "INSERT INTO room_types (property_id, name, created_at) VALUES (?, ?, ?)",
            params![property_id, name.trim(), now.timestamp()],
        )?;
        Ok(RoomTypeId::new(conn.last_insert_rowid()))
    }

    /// Looks up a property id by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_property(conn: &Connection, name: &str) -> Result<Option<PropertyId>> {
        Ok(conn
            .query_row(
                "SELECT id FROM properties WHERE name = ?",
                [name],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Looks up a room type id by property and name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_room_type(
        conn: &Connection,
        property_id: PropertyId,
        name: &str,
    ) -> Result<Option<RoomTypeId>> {
        Ok(conn
            .query_row(
                "SELECT id FROM room_types WHERE property_id = ? AND name = ?",
                params![property_id, name],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Inserts an active hold row and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_hold(
        conn: &Connection,
        hold: &NewHold,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<HoldId> {
        conn.execute(
            INSERT_HOLD,
            params![
                hold.property_id,
                hold.conversation_id,
                hold.quote_option_id,
                hold.stay.checkin().to_string(),
                hold.stay.checkout().to_string(),
                hold.total_amount,
                hold.currency,
                expires_at.timestamp(),
                now.timestamp(),
                now.timestamp(),
            ],
        )?;
        Ok(HoldId::new(conn.last_insert_rowid()))
    }

    /// Reads a hold row.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt.
    pub fn get_hold(
        conn: &Connection,
        property_id: PropertyId,
        hold_id: HoldId,
    ) -> Result<Option<Hold>> {
        Ok(conn
            .query_row(SELECT_HOLD, params![property_id, hold_id], row_to_hold)
            .optional()?)
    }

    /// Lists all holds of a property, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_holds(conn: &Connection, property_id: PropertyId) -> Result<Vec<Hold>> {
        let mut stmt = conn.prepare(LIST_HOLDS)?;
        let rows = stmt.query_map([property_id], row_to_hold)?;
        let mut holds = Vec::new();
        for hold in rows {
            holds.push(hold?);
        }
        Ok(holds)
    }

    /// Flips an active hold to a terminal status.
    ///
    /// Returns whether the row was affected: `false` means the hold was
    /// not active (or does not exist), which callers treat as the no-op
    /// path. The status guard lives in the statement itself, so a
    /// double flip is impossible regardless of interleaving.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails, or if `target` is not a
    /// terminal status.
    pub fn mark_hold_from_active(
        conn: &Connection,
        property_id: PropertyId,
        hold_id: HoldId,
        target: HoldStatus,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        if !HoldStatus::Active.can_transition_to(target) {
            return Err(Error::Validation {
                field: "status".into(),
                message: format!("'{target}' is not a terminal hold status"),
            });
        }
        let affected = conn.execute(
            MARK_HOLD_FROM_ACTIVE,
            params![target.as_str(), now.timestamp(), property_id, hold_id],
        )?;
        Ok(affected == 1)
    }

    /// Finds active holds whose expiry is due, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_due_holds(
        conn: &Connection,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<(HoldId, PropertyId)>> {
        let mut stmt = conn.prepare(FIND_DUE_HOLDS)?;
        let rows = stmt.query_map(params![now.timestamp(), limit], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;
        let mut due = Vec::new();
        for row in rows {
            due.push(row?);
        }
        Ok(due)
    }

    /// Inserts the night rows of a hold.
    ///
    /// Rows are written once and never mutated. Input order does not
    /// matter; readers impose the global order.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails.
    pub fn insert_hold_nights(
        conn: &Connection,
        hold_id: HoldId,
        nights: &[HoldNight],
    ) -> Result<()> {
        let mut stmt = conn.prepare(INSERT_HOLD_NIGHT)?;
        for night in nights {
            stmt.execute(params![
                hold_id,
                night.room_type_id,
                night.date.to_string(),
                night.qty
            ])?;
        }
        Ok(())
    }

    /// Reads a hold's nights in ascending `(room_type_id, date)` order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub fn hold_nights(conn: &Connection, hold_id: HoldId) -> Result<Vec<HoldNight>> {
        let mut stmt = conn.prepare(SELECT_HOLD_NIGHTS)?;
        let rows = stmt.query_map([hold_id], |row| {
            Ok(HoldNight {
                room_type_id: row.get(0)?,
                date: parse_date("date", &row.get::<_, String>(1)?)?,
                qty: row.get(2)?,
            })
        })?;
        let mut nights = Vec::new();
        for night in rows {
            nights.push(night?);
        }
        Ok(nights)
    }

    /// Upserts a payment row to the given status, keyed by
    /// `(property_id, provider, provider_object_id)`.
    ///
    /// Replayed webhooks land on the DO UPDATE branch and converge on
    /// the same row.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    #[allow(clippy::too_many_arguments)]
    pub fn upsert_payment(
        conn: &Connection,
        property_id: PropertyId,
        hold_id: HoldId,
        provider: &str,
        provider_object_id: &str,
        status: PaymentStatus,
        amount: i64,
        currency: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        conn.execute(
            UPSERT_PAYMENT,
            params![
                property_id,
                hold_id,
                provider,
                provider_object_id,
                status.as_str(),
                amount,
                currency,
                now.timestamp(),
            ],
        )?;
        Ok(())
    }

    /// Reads a payment row by its provider key.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt.
    pub fn get_payment(
        conn: &Connection,
        property_id: PropertyId,
        provider: &str,
        provider_object_id: &str,
    ) -> Result<Option<Payment>> {
        Ok(conn
            .query_row(
                SELECT_PAYMENT,
                params![property_id, provider, provider_object_id],
                row_to_payment,
            )
            .optional()?)
    }

    /// Reads the row id of a payment by its provider key.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn payment_row_id(
        conn: &Connection,
        property_id: PropertyId,
        provider: &str,
        provider_object_id: &str,
    ) -> Result<Option<i64>> {
        Ok(conn
            .query_row(
                "SELECT id FROM payments WHERE property_id = ? AND provider = ? AND provider_object_id = ?",
                params![property_id, provider, provider_object_id],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Inserts the terminal reservation for a hold if none exists yet.
    ///
    /// Uses `ON CONFLICT (property_id, hold_id) DO NOTHING` as the
    /// second line of defense against duplicate conversion; returns the
    /// reservation id either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails or, impossibly, no
    /// reservation row exists after the insert.
    pub fn insert_reservation_if_absent(
        conn: &Connection,
        hold: &Hold,
        now: DateTime<Utc>,
    ) -> Result<ReservationId> {
        conn.execute(
            INSERT_RESERVATION_IF_ABSENT,
            params![
                hold.property_id,
                hold.id,
                hold.stay.checkin().to_string(),
                hold.stay.checkout().to_string(),
                hold.total_amount,
                hold.currency,
                now.timestamp(),
            ],
        )?;
        let reservation = Self::get_reservation_by_hold(conn, hold.property_id, hold.id)?
            .ok_or_else(|| Error::IntegrityFault {
                details: format!("reservation row missing after insert for hold {}", hold.id),
            })?;
        Ok(reservation.id)
    }

    /// Reads the reservation converted from a hold, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt.
    pub fn get_reservation_by_hold(
        conn: &Connection,
        property_id: PropertyId,
        hold_id: HoldId,
    ) -> Result<Option<Reservation>> {
        Ok(conn
            .query_row(
                SELECT_RESERVATION_BY_HOLD,
                params![property_id, hold_id],
                row_to_reservation,
            )
            .optional()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_util::seeded_connection;
    use crate::hold::sort_nights;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn new_hold(property: PropertyId) -> NewHold {
        NewHold::builder(
            property,
            StayDates::new(date(1), date(3)).unwrap(),
        )
        .conversation_id("conv-1")
        .quote_option_id("qo-1")
        .total_amount(20_000)
        .currency("EUR")
        .build()
        .unwrap()
    }

    #[test]
    fn test_insert_and_get_hold() {
        let (conn, seed) = seeded_connection(2);
        let now = Utc::now();
        let expires = now + chrono::Duration::minutes(30);

        let hold_id = Database::insert_hold(&conn, &new_hold(seed.property), expires, now).unwrap();
        let hold = Database::get_hold(&conn, seed.property, hold_id)
            .unwrap()
            .unwrap();

        assert_eq!(hold.id, hold_id);
        assert_eq!(hold.status, HoldStatus::Active);
        assert_eq!(hold.stay.night_count(), 2);
        assert_eq!(hold.expires_at.timestamp(), expires.timestamp());
    }

    #[test]
    fn test_get_hold_scoped_by_property() {
        let (conn, seed) = seeded_connection(2);
        let now = Utc::now();
        let hold_id = Database::insert_hold(&conn, &new_hold(seed.property), now, now).unwrap();

        let other = Database::create_property(&conn, "other", now).unwrap();
        assert!(Database::get_hold(&conn, other, hold_id).unwrap().is_none());
    }

    #[test]
    fn test_mark_hold_from_active_once() {
        let (conn, seed) = seeded_connection(2);
        let now = Utc::now();
        let hold_id = Database::insert_hold(&conn, &new_hold(seed.property), now, now).unwrap();

        assert!(Database::mark_hold_from_active(
            &conn,
            seed.property,
            hold_id,
            HoldStatus::Expired,
            now
        )
        .unwrap());
        // The guard makes the second flip a no-op, whatever the target.
        assert!(!Database::mark_hold_from_active(
            &conn,
            seed.property,
            hold_id,
            HoldStatus::Converted,
            now
        )
        .unwrap());

        let hold = Database::get_hold(&conn, seed.property, hold_id)
            .unwrap()
            .unwrap();
        assert_eq!(hold.status, HoldStatus::Expired);
    }

    #[test]
    fn test_mark_hold_rejects_non_terminal_target() {
        let (conn, seed) = seeded_connection(2);
        let now = Utc::now();
        let hold_id = Database::insert_hold(&conn, &new_hold(seed.property), now, now).unwrap();

        let err = Database::mark_hold_from_active(
            &conn,
            seed.property,
            hold_id,
            HoldStatus::Active,
            now,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_hold_nights_read_in_global_order() {
        let (conn, seed) = seeded_connection(2);
        let now = Utc::now();
        let hold_id = Database::insert_hold(&conn, &new_hold(seed.property), now, now).unwrap();

        // Insert out of order on purpose.
        let nights = vec![
            HoldNight::new(seed.room_type, date(2), 1).unwrap(),
            HoldNight::new(seed.room_type, date(1), 1).unwrap(),
        ];
        Database::insert_hold_nights(&conn, hold_id, &nights).unwrap();

        let read = Database::hold_nights(&conn, hold_id).unwrap();
        let mut expected = nights;
        sort_nights(&mut expected);
        assert_eq!(read, expected);
    }

    #[test]
    fn test_find_due_holds() {
        let (conn, seed) = seeded_connection(2);
        let now = Utc::now();
        let past = now - chrono::Duration::minutes(5);
        let future = now + chrono::Duration::minutes(30);

        let due = Database::insert_hold(&conn, &new_hold(seed.property), past, now).unwrap();
        let _live = Database::insert_hold(&conn, &new_hold(seed.property), future, now).unwrap();

        let found = Database::find_due_holds(&conn, now, 10).unwrap();
        assert_eq!(found, vec![(due, seed.property)]);
    }

    #[test]
    fn test_upsert_payment_idempotent() {
        let (conn, seed) = seeded_connection(2);
        let now = Utc::now();
        let hold_id = Database::insert_hold(&conn, &new_hold(seed.property), now, now).unwrap();

        for _ in 0..3 {
            Database::upsert_payment(
                &conn,
                seed.property,
                hold_id,
                "stripe",
                "pi_123",
                PaymentStatus::Succeeded,
                20_000,
                "EUR",
                now,
            )
            .unwrap();
        }

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM payments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let payment = Database::get_payment(&conn, seed.property, "stripe", "pi_123")
            .unwrap()
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Succeeded);
        assert_eq!(payment.hold_id, hold_id);
    }

    #[test]
    fn test_reservation_unique_per_hold() {
        let (conn, seed) = seeded_connection(2);
        let now = Utc::now();
        let hold_id = Database::insert_hold(&conn, &new_hold(seed.property), now, now).unwrap();
        let hold = Database::get_hold(&conn, seed.property, hold_id)
            .unwrap()
            .unwrap();

        let first = Database::insert_reservation_if_absent(&conn, &hold, now).unwrap();
        let second = Database::insert_reservation_if_absent(&conn, &hold, now).unwrap();
        assert_eq!(first, second);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM reservations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
