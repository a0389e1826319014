//! The `show-inventory` command.

use std::io::Write;

use chrono::NaiveDate;
use clap::Args;
use innkeep::config::OutputFormat;
use innkeep::database::ledger;
use serde_json::json;

use crate::error::CliError;
use crate::utils::{require_property, require_room_type, GlobalOptions};

use super::{resolve_format, FormatArg};

/// Show nightly inventory counters.
#[derive(Debug, Args)]
pub struct ShowInventoryCommand {
    /// Owning property
    #[arg(long, value_name = "NAME")]
    pub property: String,

    /// Room type to show
    #[arg(long, value_name = "NAME")]
    pub room_type: String,

    /// First night (inclusive)
    #[arg(long, value_name = "DATE")]
    pub from: NaiveDate,

    /// End of the range (exclusive)
    #[arg(long, value_name = "DATE")]
    pub to: NaiveDate,

    /// Output format (defaults to the configured one)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
}

impl ShowInventoryCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        if self.to <= self.from {
            return Err(CliError::InvalidArguments(
                "--to must be after --from".to_string(),
            ));
        }

        let (db, config) = global.open()?;
        let conn = db.connection();
        let property_id = require_property(conn, &self.property)?;
        let room_type_id = require_room_type(conn, property_id, &self.room_type)?;

        let mut rows = Vec::new();
        let mut date = self.from;
        while date < self.to {
            if let Some(counters) = ledger::get_counters(conn, property_id, room_type_id, date)? {
                rows.push((date, counters));
            }
            date = date.succ_opt().ok_or_else(|| {
                CliError::InvalidArguments(format!("date range overflows past {date}"))
            })?;
        }

        match resolve_format(self.format, &config) {
            OutputFormat::Json => {
                let docs: Vec<_> = rows
                    .iter()
                    .map(|(date, c)| {
                        json!({
                            "date": date.to_string(),
                            "total": c.inv_total,
                            "booked": c.inv_booked,
                            "held": c.inv_held,
                            "available": c.available(),
                            "stop_sell": c.stop_sell,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&docs)?);
            }
            OutputFormat::Table => {
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                writeln!(
                    out,
                    "{:<12} {:>6} {:>7} {:>5} {:>10} {:>9}",
                    "DATE", "TOTAL", "BOOKED", "HELD", "AVAILABLE", "STOP-SELL"
                )?;
                for (date, c) in &rows {
                    writeln!(
                        out,
                        "{:<12} {:>6} {:>7} {:>5} {:>10} {:>9}",
                        date.to_string(),
                        c.inv_total,
                        c.inv_booked,
                        c.inv_held,
                        c.available(),
                        if c.stop_sell { "yes" } else { "no" }
                    )?;
                }
            }
        }
        Ok(())
    }
}
