//! The `list-holds` command.

use std::io::Write;

use clap::Args;
use innkeep::config::OutputFormat;
use innkeep::{Database, HoldStatus};
use serde_json::json;

use crate::error::CliError;
use crate::utils::{require_property, GlobalOptions};

use super::{resolve_format, FormatArg};

/// List a property's holds.
#[derive(Debug, Args)]
pub struct ListHoldsCommand {
    /// Owning property
    #[arg(long, value_name = "NAME")]
    pub property: String,

    /// Only show holds with this status
    #[arg(long, value_name = "STATUS", value_parser = HoldStatus::parse)]
    pub status: Option<HoldStatus>,

    /// Output format (defaults to the configured one)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
}

impl ListHoldsCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let (db, config) = global.open()?;
        let conn = db.connection();
        let property_id = require_property(conn, &self.property)?;

        let mut holds = Database::list_holds(conn, property_id)?;
        if let Some(status) = self.status {
            holds.retain(|h| h.status == status);
        }

        match resolve_format(self.format, &config) {
            OutputFormat::Json => {
                let docs: Vec<_> = holds
                    .iter()
                    .map(|h| {
                        json!({
                            "id": h.id.value(),
                            "status": h.status.as_str(),
                            "conversation_id": h.conversation_id,
                            "quote_option_id": h.quote_option_id,
                            "checkin": h.stay.checkin().to_string(),
                            "checkout": h.stay.checkout().to_string(),
                            "total_amount": h.total_amount,
                            "currency": h.currency,
                            "expires_at": h.expires_at.to_rfc3339(),
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
                    "{:<6} {:<10} {:<16} {:<12} {:<12} {:>10} {:<20}",
                    "ID", "STATUS", "CONVERSATION", "CHECKIN", "CHECKOUT", "AMOUNT", "EXPIRES"
                )?;
                for h in &holds {
                    writeln!(
                        out,
                        "{:<6} {:<10} {:<16} {:<12} {:<12} {:>10} {:<20}",
                        h.id.value(),
                        h.status.as_str(),
                        h.conversation_id,
                        h.stay.checkin().to_string(),
                        h.stay.checkout().to_string(),
                        format!("{} {}", h.total_amount, h.currency),
                        h.expires_at.format("%Y-%m-%d %H:%M:%S").to_string()
                    )?;
                }
            }
        }
        Ok(())
    }
}
