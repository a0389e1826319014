//! The `sweep-outbox` command.

use chrono::Utc;
use clap::Args;
use innkeep::operations::sweep_outbox;

use crate::error::CliError;
use crate::utils::GlobalOptions;

/// Delete outbox events older than the retention window.
#[derive(Debug, Args)]
pub struct SweepOutboxCommand {
    /// Retention window in days (defaults to the configured one)
    #[arg(long, value_name = "N")]
    pub days: Option<u32>,

    /// Count what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,
}

impl SweepOutboxCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let (mut db, config) = global.open()?;
        let days = self.days.unwrap_or(config.outbox_retention_days);

        let outcome = sweep_outbox(&mut db, days, self.dry_run, Utc::now())?;
        if self.dry_run {
            println!(
                "{} event(s) older than {days} day(s) would be removed",
                outcome.sweepable
            );
        } else {
            println!("Removed {} of {} sweepable event(s)", outcome.removed, outcome.sweepable);
        }
        Ok(())
    }
}
