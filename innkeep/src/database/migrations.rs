//! Database schema management and migrations.
//!
//! This module handles database schema initialization, version checking,
//! and migrations.

use rusqlite::Connection;

use crate::error::{Error, Result};

use super::schema::{
    CREATE_HOLDS_PROPERTY_INDEX, CREATE_HOLDS_STATUS_INDEX, CREATE_HOLDS_TABLE,
    CREATE_HOLD_NIGHTS_TABLE, CREATE_IDEMPOTENCY_KEYS_TABLE, CREATE_INVENTORY_DAYS_TABLE,
    CREATE_METADATA_TABLE, CREATE_OUTBOX_EVENTS_TABLE, CREATE_OUTBOX_OCCURRED_INDEX,
    CREATE_PAYMENTS_TABLE, CREATE_PROCESSED_EVENTS_TABLE, CREATE_PROPERTIES_TABLE,
    CREATE_RESERVATIONS_TABLE, CREATE_ROOM_TYPES_TABLE, CURRENT_SCHEMA_VERSION,
    INSERT_SCHEMA_VERSION, SELECT_SCHEMA_VERSION,
};

/// Initializes the database schema.
///
/// Creates all tables, indices, and metadata for a fresh database.
///
/// # Errors
///
/// Returns an error if any SQL statement fails to execute.
///
/// # Examples
///
/// ```no_run
/// use rusqlite::Connection;
/// use innkeep::database::migrations::initialize_schema;
///
/// let conn = Connection::open_in_memory().unwrap();
/// initialize_schema(&conn).unwrap();
/// ```
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;

    conn.execute(CREATE_PROPERTIES_TABLE, [])?;
    conn.execute(CREATE_ROOM_TYPES_TABLE, [])?;
    conn.execute(CREATE_INVENTORY_DAYS_TABLE, [])?;
    conn.execute(CREATE_HOLDS_TABLE, [])?;
    conn.execute(CREATE_HOLD_NIGHTS_TABLE, [])?;
    conn.execute(CREATE_PAYMENTS_TABLE, [])?;
    conn.execute(CREATE_RESERVATIONS_TABLE, [])?;
    conn.execute(CREATE_PROCESSED_EVENTS_TABLE, [])?;
    conn.execute(CREATE_IDEMPOTENCY_KEYS_TABLE, [])?;
    conn.execute(CREATE_OUTBOX_EVENTS_TABLE, [])?;

    conn.execute(CREATE_HOLDS_STATUS_INDEX, [])?;
    conn.execute(CREATE_HOLDS_PROPERTY_INDEX, [])?;
    conn.execute(CREATE_OUTBOX_OCCURRED_INDEX, [])?;

    conn.execute(INSERT_SCHEMA_VERSION, [CURRENT_SCHEMA_VERSION])?;

    Ok(())
}

/// Gets the current schema version from the database.
///
/// # Errors
///
/// Returns an error if the query fails for reasons other than
/// "no rows returned" or a missing metadata table (both indicate
/// version 0).
///
/// # Returns
///
/// - `Ok(0)` if the metadata table doesn't exist or has no version
/// - `Ok(version)` if a version is found
/// - `Err(_)` if a database error occurs
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    match conn.query_row(SELECT_SCHEMA_VERSION, [], |row| {
        let value: String = row.get(0)?;
        value
            .parse::<i32>()
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
    }) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => {
            // "no such table: metadata" means a fresh database
            if let rusqlite::Error::SqliteFailure(ref sqlite_err, _) = e {
                if sqlite_err.code == rusqlite::ErrorCode::Unknown {
                    return Ok(0);
                }
            }
            Err(e.into())
        }
    }
}

/// Checks schema compatibility and initializes if needed.
///
/// This function:
/// 1. Checks the current schema version
/// 2. If version is 0, initializes the schema
/// 3. If version is older than current, returns an error (migrations needed)
/// 4. If version is newer than current, returns an error (client too old)
/// 5. If version matches, returns success
///
/// # Errors
///
/// Returns [`Error::UnsupportedSchemaVersion`] on a mismatch, or any
/// underlying database error.
pub fn check_schema_compatibility(conn: &Connection) -> Result<()> {
    let version = get_schema_version(conn)?;

    if version == 0 {
        initialize_schema(conn)?;
        return Ok(());
    }

    if version != CURRENT_SCHEMA_VERSION {
        return Err(Error::UnsupportedSchemaVersion {
            expected: CURRENT_SCHEMA_VERSION,
            found: version,
        });
    }

    Ok(())
}
