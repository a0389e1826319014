//! Database schema definitions and SQL constants.
//!
//! This module contains all table definitions, indices, and constants
//! for the innkeep engine's relational schema. Column names and
//! uniqueness constraints here are part of the external contract that
//! reconciliation queries and retention jobs depend on, in particular
//! the uniqueness keys on `reservations`, `payments`, and
//! `processed_events`.

/// Current schema version for the database.
///
/// This version is stored in the metadata table and is used to ensure
/// compatibility between the database and the application.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// SQL statement to create the metadata table.
///
/// The metadata table stores key-value pairs for database configuration
/// and versioning information.
pub const CREATE_METADATA_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    )";

/// SQL statement to create the properties table.
///
/// A property is the tenant boundary; every other row is scoped by
/// `property_id`.
pub const CREATE_PROPERTIES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS properties (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        created_at INTEGER NOT NULL
    )";

/// SQL statement to create the room types table.
pub const CREATE_ROOM_TYPES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS room_types (
        id INTEGER PRIMARY KEY,
        property_id INTEGER NOT NULL REFERENCES properties(id),
        name TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        UNIQUE (property_id, name)
    )";

/// SQL statement to create the inventory ledger table.
///
/// One row per (property, room type, date). The CHECK constraint is a
/// backstop only: the load-bearing overbooking protection is the
/// predicate on the guarded UPDATE in the ledger module, which makes a
/// violating write affect zero rows instead of racing a separate read.
pub const CREATE_INVENTORY_DAYS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS inventory_days (
        property_id INTEGER NOT NULL REFERENCES properties(id),
        room_type_id INTEGER NOT NULL REFERENCES room_types(id),
        date TEXT NOT NULL,
        inv_total INTEGER NOT NULL,
        inv_booked INTEGER NOT NULL DEFAULT 0,
        inv_held INTEGER NOT NULL DEFAULT 0,
        stop_sell INTEGER NOT NULL DEFAULT 0,
        updated_at INTEGER NOT NULL,
        PRIMARY KEY (property_id, room_type_id, date),
        CHECK (
            inv_total >= 0
            AND inv_booked >= 0
            AND inv_held >= 0
            AND inv_total >= inv_booked + inv_held
        )
    )";

/// SQL statement to create the holds table.
pub const CREATE_HOLDS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS holds (
        id INTEGER PRIMARY KEY,
        property_id INTEGER NOT NULL REFERENCES properties(id),
        conversation_id TEXT NOT NULL,
        quote_option_id TEXT NOT NULL,
        checkin TEXT NOT NULL,
        checkout TEXT NOT NULL,
        total_amount INTEGER NOT NULL,
        currency TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'active',
        expires_at INTEGER NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )";

/// SQL statement to create the hold nights table.
///
/// One row per reserved night, created atomically with the hold and
/// never mutated afterward. These rows are the deterministic iteration
/// set for every release and convert operation.
pub const CREATE_HOLD_NIGHTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS hold_nights (
        hold_id INTEGER NOT NULL REFERENCES holds(id),
        room_type_id INTEGER NOT NULL REFERENCES room_types(id),
        date TEXT NOT NULL,
        qty INTEGER NOT NULL CHECK (qty >= 1),
        PRIMARY KEY (hold_id, room_type_id, date)
    )";

/// SQL statement to create the payments table.
///
/// `(property_id, provider, provider_object_id)` uniqueness makes the
/// payment upsert idempotent under webhook replay.
pub const CREATE_PAYMENTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS payments (
        id INTEGER PRIMARY KEY,
        property_id INTEGER NOT NULL REFERENCES properties(id),
        hold_id INTEGER NOT NULL REFERENCES holds(id),
        provider TEXT NOT NULL,
        provider_object_id TEXT NOT NULL,
        status TEXT NOT NULL,
        amount INTEGER NOT NULL,
        currency TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        UNIQUE (property_id, provider, provider_object_id)
    )";

/// SQL statement to create the reservations table.
///
/// `(property_id, hold_id)` uniqueness guarantees at most one
/// reservation per hold, the final backstop against duplicate
/// conversion.
pub const CREATE_RESERVATIONS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS reservations (
        id INTEGER PRIMARY KEY,
        property_id INTEGER NOT NULL REFERENCES properties(id),
        hold_id INTEGER NOT NULL REFERENCES holds(id),
        status TEXT NOT NULL DEFAULT 'confirmed',
        checkin TEXT NOT NULL,
        checkout TEXT NOT NULL,
        total_amount INTEGER NOT NULL,
        currency TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        UNIQUE (property_id, hold_id)
    )";

/// SQL statement to create the processed events table.
///
/// Write-once dedupe receipts for externally- or queue-triggered
/// operations. A conflicting insert is the dedupe signal, not an error.
pub const CREATE_PROCESSED_EVENTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS processed_events (
        property_id INTEGER NOT NULL REFERENCES properties(id),
        source TEXT NOT NULL,
        external_id TEXT NOT NULL,
        processed_at INTEGER NOT NULL,
        PRIMARY KEY (property_id, source, external_id)
    )";

/// SQL statement to create the idempotency keys table.
///
/// Dedupe for first-party API calls, storing the prior response so a
/// retried call replays byte-identically.
pub const CREATE_IDEMPOTENCY_KEYS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS idempotency_keys (
        property_id INTEGER NOT NULL REFERENCES properties(id),
        scope TEXT NOT NULL,
        idempotency_key TEXT NOT NULL,
        response TEXT,
        created_at INTEGER NOT NULL,
        PRIMARY KEY (property_id, scope, idempotency_key)
    )";

/// SQL statement to create the outbox events table.
///
/// Append-only; the engine never updates or deletes rows here. Only the
/// retention sweep removes aged rows.
pub const CREATE_OUTBOX_EVENTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS outbox_events (
        id INTEGER PRIMARY KEY,
        property_id INTEGER NOT NULL REFERENCES properties(id),
        event_type TEXT NOT NULL,
        aggregate_type TEXT NOT NULL,
        aggregate_id INTEGER NOT NULL,
        occurred_at INTEGER NOT NULL,
        correlation_id TEXT,
        payload TEXT NOT NULL
    )";

/// Index speeding up expiry scans over active holds.
pub const CREATE_HOLDS_STATUS_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_holds_status_expires
    ON holds(status, expires_at)";

/// Index speeding up per-property hold listings.
pub const CREATE_HOLDS_PROPERTY_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_holds_property
    ON holds(property_id)";

/// Index speeding up outbox retention and consumer reads.
pub const CREATE_OUTBOX_OCCURRED_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_outbox_occurred
    ON outbox_events(occurred_at)";

/// SQL statement to select the schema version from the metadata table.
pub const SELECT_SCHEMA_VERSION: &str = "SELECT value FROM metadata WHERE key = 'schema_version'";

/// SQL statement to insert or update the schema version in the metadata table.
pub const INSERT_SCHEMA_VERSION: &str =
    "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)";
