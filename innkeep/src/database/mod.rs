//! Database layer for persistent storage of the hold/inventory engine.
//!
//! This module provides a SQLite-based storage layer: connection
//! management, schema versioning, entity CRUD, and the guarded
//! inventory ledger. All transactional sequencing lives one level up in
//! [`crate::operations`]; everything here composes inside a
//! caller-owned transaction.
//!
//! # Examples
//!
//! ```no_run
//! use innkeep::database::{Database, DatabaseConfig};
//!
//! let config = DatabaseConfig::new("/tmp/innkeep.db");
//! let db = Database::open(config).unwrap();
//! let _conn = db.connection();
//! ```

mod config;
mod connection;
pub mod ledger;
pub mod migrations;
mod operations;
mod schema;

#[cfg(test)]
pub(crate) mod test_util;

// Re-export public API
pub use config::{default_data_dir, DatabaseConfig};
pub use connection::Database;
pub use ledger::InventoryCounters;

// Re-export migration functions for advanced use cases
pub use migrations::{check_schema_compatibility, get_schema_version, initialize_schema};
