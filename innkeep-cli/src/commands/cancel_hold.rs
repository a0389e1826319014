//! The `cancel-hold` command.

use chrono::Utc;
use clap::Args;
use innkeep::{cancel_hold, CancelActor, CancelHoldOptions, CancelHoldOutcome, HoldId};

use crate::error::CliError;
use crate::utils::{require_property, GlobalOptions};

/// Cancel an active hold.
#[derive(Debug, Args)]
pub struct CancelHoldCommand {
    /// Owning property
    #[arg(long, value_name = "NAME")]
    pub property: String,

    /// Hold to cancel
    #[arg(long, value_name = "ID")]
    pub hold: i64,

    /// Cancel as the guest of this conversation
    #[arg(long, value_name = "ID", required_unless_present = "operator")]
    pub conversation: Option<String>,

    /// Cancel as an operator, bypassing the conversation check
    #[arg(long, conflicts_with = "conversation")]
    pub operator: bool,

    /// Idempotency key; retries with the same key are no-ops
    #[arg(long, value_name = "KEY")]
    pub key: String,
}

impl CancelHoldCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let (mut db, _config) = global.open()?;
        let property_id = require_property(db.connection(), &self.property)?;
        let hold_id = HoldId::new(self.hold);

        let actor = if self.operator {
            CancelActor::Operator
        } else {
            CancelActor::Guest {
                // required_unless_present guarantees this is set
                conversation_id: self.conversation.unwrap_or_default(),
            }
        };

        let options = CancelHoldOptions {
            property_id,
            hold_id,
            actor,
            idempotency_key: self.key,
        };
        match cancel_hold(&mut db, &options, Utc::now())? {
            CancelHoldOutcome::Cancelled => {
                println!("Cancelled hold {hold_id}, inventory released");
            }
            CancelHoldOutcome::NoOp(reason) => {
                println!("Hold {hold_id} unchanged: {reason}");
            }
        }
        Ok(())
    }
}
