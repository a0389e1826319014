//! The `add-property` command.

use chrono::Utc;
use clap::Args;
use innkeep::Database;

use crate::error::CliError;
use crate::utils::GlobalOptions;

/// Create a property.
#[derive(Debug, Args)]
pub struct AddPropertyCommand {
    /// Property name, unique across the database
    pub name: String,
}

impl AddPropertyCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let (db, _config) = global.open()?;

        if Database::find_property(db.connection(), &self.name)?.is_some() {
            return Err(CliError::InvalidArguments(format!(
                "property '{}' already exists",
                self.name
            )));
        }

        let id = Database::create_property(db.connection(), &self.name, Utc::now())?;
        println!("Created property '{}' (id {id})", self.name);
        Ok(())
    }
}
