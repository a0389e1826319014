//! The `add-room-type` command.

use chrono::Utc;
use clap::Args;
use innkeep::Database;

use crate::error::CliError;
use crate::utils::{require_property, GlobalOptions};

/// Create a room type within a property.
#[derive(Debug, Args)]
pub struct AddRoomTypeCommand {
    /// Owning property
    #[arg(long, value_name = "NAME")]
    pub property: String,

    /// Room type name, unique within the property
    pub name: String,
}

impl AddRoomTypeCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let (db, _config) = global.open()?;
        let conn = db.connection();
        let property_id = require_property(conn, &self.property)?;

        if Database::find_room_type(conn, property_id, &self.name)?.is_some() {
            return Err(CliError::InvalidArguments(format!(
                "room type '{}' already exists in '{}'",
                self.name, self.property
            )));
        }

        let id = Database::create_room_type(conn, property_id, &self.name, Utc::now())?;
        println!(
            "Created room type '{}' (id {id}) in property '{}'",
            self.name, self.property
        );
        Ok(())
    }
}
