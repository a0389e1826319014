//! The `set-inventory` command.

use chrono::{NaiveDate, Utc};
use clap::Args;
use innkeep::database::ledger;

use crate::error::CliError;
use crate::utils::{require_property, require_room_type, GlobalOptions};

/// Set nightly capacity for a room type over a date range.
#[derive(Debug, Args)]
pub struct SetInventoryCommand {
    /// Owning property
    #[arg(long, value_name = "NAME")]
    pub property: String,

    /// Room type to reshape
    #[arg(long, value_name = "NAME")]
    pub room_type: String,

    /// First night (inclusive)
    #[arg(long, value_name = "DATE")]
    pub from: NaiveDate,

    /// End of the range (exclusive, like a checkout date)
    #[arg(long, value_name = "DATE")]
    pub to: NaiveDate,

    /// Units available per night
    #[arg(long, value_name = "N")]
    pub total: i64,

    /// Block sales for these nights regardless of capacity
    #[arg(long)]
    pub stop_sell: bool,
}

impl SetInventoryCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        if self.to <= self.from {
            return Err(CliError::InvalidArguments(
                "--to must be after --from".to_string(),
            ));
        }
        if self.total < 0 {
            return Err(CliError::InvalidArguments(
                "--total must not be negative".to_string(),
            ));
        }

        let (mut db, _config) = global.open()?;
        let now = Utc::now();

        let tx = db.begin_immediate()?;
        let property_id = require_property(&tx, &self.property)?;
        let room_type_id = require_room_type(&tx, property_id, &self.room_type)?;

        let mut nights = 0u32;
        let mut date = self.from;
        while date < self.to {
            ledger::set_day(
                &tx,
                property_id,
                room_type_id,
                date,
                self.total,
                self.stop_sell,
                now.timestamp(),
            )?;
            nights += 1;
            date = date.succ_opt().ok_or_else(|| {
                CliError::InvalidArguments(format!("date range overflows past {date}"))
            })?;
        }
        tx.commit().map_err(innkeep::Error::from)?;

        println!(
            "Set {nights} night(s) of '{}' to {} unit(s){}",
            self.room_type,
            self.total,
            if self.stop_sell { ", stop-sell on" } else { "" }
        );
        Ok(())
    }
}
