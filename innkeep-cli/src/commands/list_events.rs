//! The `list-events` command.

use std::io::Write;

use clap::Args;
use innkeep::config::OutputFormat;
use innkeep::operations::outbox;
use serde_json::json;

use crate::error::CliError;
use crate::utils::{require_property, GlobalOptions};

use super::{resolve_format, FormatArg};

/// List a property's outbox events.
#[derive(Debug, Args)]
pub struct ListEventsCommand {
    /// Owning property
    #[arg(long, value_name = "NAME")]
    pub property: String,

    /// Only show events of this type (e.g. HOLD_CREATED)
    #[arg(long, value_name = "TYPE")]
    pub event_type: Option<String>,

    /// Output format (defaults to the configured one)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
}

impl ListEventsCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let (db, config) = global.open()?;
        let conn = db.connection();
        let property_id = require_property(conn, &self.property)?;

        let mut events = outbox::list_events(conn, property_id)?;
        if let Some(wanted) = &self.event_type {
            events.retain(|e| e.event_type == *wanted);
        }

        match resolve_format(self.format, &config) {
            OutputFormat::Json => {
                let docs: Vec<_> = events
                    .iter()
                    .map(|e| {
                        json!({
                            "id": e.id,
                            "event_type": e.event_type,
                            "aggregate_type": e.aggregate_type,
                            "aggregate_id": e.aggregate_id,
                            "occurred_at": e.occurred_at.to_rfc3339(),
                            "correlation_id": e.correlation_id,
                            "payload": e.payload,
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
                    "{:<6} {:<24} {:<12} {:<8} {:<20} {:<16}",
                    "ID", "EVENT", "AGGREGATE", "AGG-ID", "OCCURRED", "CORRELATION"
                )?;
                for e in &events {
                    writeln!(
                        out,
                        "{:<6} {:<24} {:<12} {:<8} {:<20} {:<16}",
                        e.id,
                        e.event_type,
                        e.aggregate_type,
                        e.aggregate_id,
                        e.occurred_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                        e.correlation_id.as_deref().unwrap_or("-")
                    )?;
                }
            }
        }
        Ok(())
    }
}
