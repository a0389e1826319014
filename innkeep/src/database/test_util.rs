//! Shared test utilities for database unit tests.
//!
//! This module provides helper functions used across multiple database
//! and engine test modules.

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::ids::{PropertyId, RoomTypeId};

/// Ids of the rows created by [`seeded_connection`].
#[derive(Debug, Clone, Copy)]
pub struct TestSeed {
    /// The seeded property.
    pub property: PropertyId,
    /// The seeded room type.
    pub room_type: RoomTypeId,
}

/// Creates an in-memory database with the full schema, one property,
/// one room type, and inventory rows for 2026-03-01 through 2026-03-10
/// at the given capacity.
///
/// # Panics
///
/// Panics if setup fails. This is acceptable in test code where we want
/// to fail fast.
#[must_use]
pub fn seeded_connection(capacity: i64) -> (Connection, TestSeed) {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON").unwrap();
    super::migrations::initialize_schema(&conn).unwrap();

    conn.execute(
        "INSERT INTO properties (name, created_at) VALUES ('casa-test', 0)",
        [],
    )
    .unwrap();
    let property = PropertyId::new(conn.last_insert_rowid());

    conn.execute(
        "INSERT INTO room_types (property_id, name, created_at) VALUES (?, 'double', 0)",
        [property.value()],
    )
    .unwrap();
    let room_type = RoomTypeId::new(conn.last_insert_rowid());

    let seed = TestSeed {
        property,
        room_type,
    };
    seed_inventory(&conn, seed, capacity);

    (conn, seed)
}

/// Seeds inventory rows for 2026-03-01 through 2026-03-10 at the given
/// capacity for the seed's room type.
///
/// # Panics
///
/// Panics if the insert fails.
pub fn seed_inventory(conn: &Connection, seed: TestSeed, capacity: i64) {
    for day in 1..=10 {
        let date = NaiveDate::from_ymd_opt(2026, 3, day).unwrap();
        super::ledger::set_day(conn, seed.property, seed.room_type, date, capacity, false, 0)
            .unwrap();
    }
}
