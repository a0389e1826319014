//! Shared plumbing for commands: data directory resolution, config
//! loading, database opening, and entity lookups.

use std::path::PathBuf;
use std::time::Duration;

use innkeep::database::{default_data_dir, Database, DatabaseConfig};
use innkeep::{ConfigBuilder, PropertyId, ResolvedConfig, RoomTypeId};
use rusqlite::Connection;

use crate::error::CliError;

/// Options shared by every command, taken from the global CLI flags.
/// Logging verbosity is consumed by `main` before dispatch and does
/// not travel here.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Data directory override (flag or `INNKEEP_DATA_DIR`).
    pub data_dir: Option<PathBuf>,
    /// Busy timeout override in milliseconds.
    pub busy_timeout: Option<u64>,
}

impl GlobalOptions {
    /// The effective data directory: flag/env override, else `~/.innkeep`.
    pub fn data_dir(&self) -> Result<PathBuf, CliError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir().map_err(CliError::from),
        }
    }

    /// The database file inside the data directory.
    pub fn database_path(&self) -> Result<PathBuf, CliError> {
        Ok(self.data_dir()?.join("innkeep.db"))
    }

    /// Loads the resolved configuration for the data directory.
    pub fn load_configuration(&self) -> Result<ResolvedConfig, CliError> {
        let dir = self.data_dir()?;
        ConfigBuilder::new()
            .with_data_dir(&dir)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    fn database_config(&self, config: &ResolvedConfig) -> Result<DatabaseConfig, CliError> {
        let timeout = self.busy_timeout.map_or(
            Duration::from_secs(config.maximum_lock_wait_seconds),
            Duration::from_millis,
        );
        Ok(DatabaseConfig::new(self.database_path()?).with_busy_timeout(timeout))
    }

    /// Opens the engine database; fails if the data directory has not
    /// been initialized yet.
    ///
    /// The busy timeout comes from the `--busy-timeout` flag when given,
    /// otherwise from `maximum_lock_wait_seconds` in the configuration.
    pub fn open_database(&self, config: &ResolvedConfig) -> Result<Database, CliError> {
        let db_config = self.database_config(config)?.without_auto_create();
        Ok(Database::open(db_config)?)
    }

    /// Opens the engine database, creating the file and schema when
    /// missing. Only `init` goes through here.
    pub fn create_database(&self, config: &ResolvedConfig) -> Result<Database, CliError> {
        Ok(Database::open(self.database_config(config)?)?)
    }

    /// Loads configuration and opens the database in one go.
    pub fn open(&self) -> Result<(Database, ResolvedConfig), CliError> {
        let config = self.load_configuration()?;
        let db = self.open_database(&config)?;
        Ok((db, config))
    }
}

/// Resolves a property name to its id, or fails with a usable message.
pub fn require_property(conn: &Connection, name: &str) -> Result<PropertyId, CliError> {
    Database::find_property(conn, name)?
        .ok_or_else(|| CliError::InvalidArguments(format!("no property named '{name}'")))
}

/// Resolves a room type name within a property.
pub fn require_room_type(
    conn: &Connection,
    property_id: PropertyId,
    name: &str,
) -> Result<RoomTypeId, CliError> {
    Database::find_room_type(conn, property_id, name)?
        .ok_or_else(|| CliError::InvalidArguments(format!("no room type named '{name}'")))
}

/// Parses a `NAME` or `NAME:QTY` room request argument.
pub fn parse_room_spec(s: &str) -> Result<(String, u32), String> {
    match s.split_once(':') {
        None => Ok((s.to_string(), 1)),
        Some((name, qty)) => {
            let qty: u32 = qty
                .parse()
                .map_err(|_| format!("'{qty}' is not a valid quantity"))?;
            if qty == 0 {
                return Err("quantity must be at least 1".to_string());
            }
            Ok((name.to_string(), qty))
        }
    }
}
