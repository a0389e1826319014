//! The `audit` command.

use clap::Args;
use innkeep::operations::audit_inventory;

use crate::error::CliError;
use crate::utils::{require_property, GlobalOptions};

/// Check the inventory ledger against the hold rows.
#[derive(Debug, Args)]
pub struct AuditCommand {
    /// Property to audit
    #[arg(long, value_name = "NAME")]
    pub property: String,
}

impl AuditCommand {
    /// Exits 0 when the ledger is clean, 1 when any row drifted.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let (db, _config) = global.open()?;
        let property_id = require_property(db.connection(), &self.property)?;

        let report = audit_inventory(&db, property_id)?;
        if report.is_clean() {
            println!("{} row(s) checked, ledger is clean", report.rows_checked);
            return Ok(());
        }

        for f in &report.findings {
            println!(
                "room type {} on {}: held {} (expected {}), booked {} (expected {})",
                f.room_type_id, f.date, f.inv_held, f.expected_held, f.inv_booked, f.expected_booked
            );
        }
        Err(CliError::SemanticFailure(format!(
            "{} of {} row(s) drifted from the hold rows",
            report.findings.len(),
            report.rows_checked
        )))
    }
}
