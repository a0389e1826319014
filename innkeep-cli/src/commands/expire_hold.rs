//! The `expire-hold` and `expire-due` commands.

use chrono::Utc;
use clap::Args;
use innkeep::{
    expire_due, expire_hold, expire_task_id, Database, ExpireHoldOptions, ExpireHoldOutcome,
    HoldId,
};

use crate::error::CliError;
use crate::utils::{require_property, GlobalOptions};

/// Expire a hold whose TTL has lapsed.
#[derive(Debug, Args)]
pub struct ExpireHoldCommand {
    /// Owning property
    #[arg(long, value_name = "NAME")]
    pub property: String,

    /// Hold to expire
    #[arg(long, value_name = "ID")]
    pub hold: i64,

    /// Delivery task id; redeliveries with the same id are no-ops.
    /// Defaults to the id a scheduler would derive for this expiry.
    #[arg(long, value_name = "ID")]
    pub task_id: Option<String>,
}

impl ExpireHoldCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let (mut db, _config) = global.open()?;
        let property_id = require_property(db.connection(), &self.property)?;
        let hold_id = HoldId::new(self.hold);

        let task_id = match self.task_id {
            Some(id) => id,
            None => {
                let hold = Database::get_hold(db.connection(), property_id, hold_id)?
                    .ok_or_else(|| innkeep::Error::NotFound {
                        resource: format!("hold {hold_id}"),
                    })?;
                expire_task_id(hold_id, hold.expires_at)
            }
        };

        let options = ExpireHoldOptions {
            property_id,
            hold_id,
            task_id,
        };
        report(hold_id, &expire_hold(&mut db, &options, Utc::now())?);
        Ok(())
    }
}

/// Expire every hold that is past its TTL.
#[derive(Debug, Args)]
pub struct ExpireDueCommand {
    /// Maximum number of holds to expire in one run
    #[arg(long, value_name = "N", default_value_t = 100)]
    pub limit: u32,
}

impl ExpireDueCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let (mut db, _config) = global.open()?;

        let outcomes = expire_due(&mut db, Utc::now(), self.limit)?;
        if outcomes.is_empty() {
            println!("No holds due for expiry");
            return Ok(());
        }
        for (hold_id, outcome) in &outcomes {
            report(*hold_id, outcome);
        }
        Ok(())
    }
}

fn report(hold_id: HoldId, outcome: &ExpireHoldOutcome) {
    match outcome {
        ExpireHoldOutcome::Expired => println!("Expired hold {hold_id}, inventory released"),
        ExpireHoldOutcome::NoOp(reason) => println!("Hold {hold_id} unchanged: {reason}"),
    }
}
