//! Common test utilities for integration tests.
//!
//! Provides a seeded on-disk engine fixture and option builders with
//! sensible defaults, so individual tests only spell out what they
//! vary.

use chrono::{NaiveDate, Utc};
use tempfile::TempDir;

use innkeep::database::{ledger, Database, DatabaseConfig};
use innkeep::{
    CreateHoldOptions, InventoryCounters, PaymentContext, PropertyId, RoomRequest, RoomTypeId,
    StayDates,
};

/// A database seeded with one property, one room type, and inventory
/// for 2026-06-01 through 2026-06-10.
pub struct TestEngine {
    /// The open database.
    pub db: Database,
    /// The seeded property.
    pub property: PropertyId,
    /// The seeded room type.
    pub room_type: RoomTypeId,
    /// Keeps the database file alive for the test's duration.
    _dir: TempDir,
}

/// A day in the seeded June 2026 window.
#[allow(dead_code)]
pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
}

/// Opens a fresh engine with the given per-night capacity.
pub fn engine_with_capacity(capacity: i64) -> TestEngine {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(DatabaseConfig::new(dir.path().join("innkeep.db"))).unwrap();
    let now = Utc::now();

    let property = Database::create_property(db.connection(), "casa-limonar", now).unwrap();
    let room_type = Database::create_room_type(db.connection(), property, "double", now).unwrap();
    for day in 1..=10 {
        ledger::set_day(
            db.connection(),
            property,
            room_type,
            date(day),
            capacity,
            false,
            now.timestamp(),
        )
        .unwrap();
    }

    TestEngine {
        db,
        property,
        room_type,
        _dir: dir,
    }
}

impl TestEngine {
    /// Opens a second connection to the same database file, for tests
    /// that exercise concurrent writers.
    #[allow(dead_code)]
    pub fn reopen(&self) -> Database {
        Database::open(DatabaseConfig::new(self._dir.path().join("innkeep.db"))).unwrap()
    }

    /// The path of the underlying database file.
    #[allow(dead_code)]
    pub fn db_path(&self) -> std::path::PathBuf {
        self._dir.path().join("innkeep.db")
    }

    /// Create-hold options for a 2-night stay (June 1-3), one double,
    /// under the given idempotency key.
    #[allow(dead_code)]
    pub fn create_options(&self, key: &str) -> CreateHoldOptions {
        CreateHoldOptions {
            property_id: self.property,
            conversation_id: "conv-1".to_string(),
            quote_option_id: "qo-1".to_string(),
            stay: StayDates::new(date(1), date(3)).unwrap(),
            rooms: vec![RoomRequest {
                room_type_id: self.room_type,
                qty: 1,
            }],
            total_amount: 20_000,
            currency: "EUR".to_string(),
            idempotency_key: key.to_string(),
            ttl_minutes: 30,
        }
    }

    /// A succeeded-payment context under the given provider event id.
    #[allow(dead_code)]
    pub fn payment(&self, event_id: &str) -> PaymentContext {
        PaymentContext {
            provider: "stripe".to_string(),
            provider_object_id: "pi_100".to_string(),
            event_id: event_id.to_string(),
            amount: 20_000,
            currency: "EUR".to_string(),
        }
    }

    /// Reads the seeded room type's counters for a June day.
    #[allow(dead_code)]
    pub fn counters(&self, day: u32) -> InventoryCounters {
        ledger::get_counters(self.db.connection(), self.property, self.room_type, date(day))
            .unwrap()
            .unwrap()
    }
}
