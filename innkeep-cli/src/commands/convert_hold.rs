//! The `convert-hold` command.

use chrono::Utc;
use clap::Args;
use innkeep::{convert_hold, ConvertHoldOptions, ConvertHoldOutcome, HoldId, PaymentContext};

use crate::error::CliError;
use crate::utils::{require_property, GlobalOptions};

/// Convert a paid hold into a reservation.
#[derive(Debug, Args)]
pub struct ConvertHoldCommand {
    /// Owning property
    #[arg(long, value_name = "NAME")]
    pub property: String,

    /// Hold the payment pays for
    #[arg(long, value_name = "ID")]
    pub hold: i64,

    /// Payment provider (e.g. stripe)
    #[arg(long, value_name = "NAME")]
    pub provider: String,

    /// Provider's id for the payment object
    #[arg(long, value_name = "ID")]
    pub object_id: String,

    /// Provider's delivery id for this notification
    #[arg(long, value_name = "ID")]
    pub event_id: String,

    /// Paid amount in minor units
    #[arg(long, value_name = "AMOUNT")]
    pub amount: i64,

    /// ISO 4217 currency of the payment
    #[arg(long, value_name = "CODE")]
    pub currency: String,
}

impl ConvertHoldCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let (mut db, _config) = global.open()?;
        let property_id = require_property(db.connection(), &self.property)?;
        let hold_id = HoldId::new(self.hold);

        let options = ConvertHoldOptions {
            property_id,
            hold_id,
            payment: PaymentContext {
                provider: self.provider,
                provider_object_id: self.object_id,
                event_id: self.event_id,
                amount: self.amount,
                currency: self.currency,
            },
        };
        match convert_hold(&mut db, &options, Utc::now())? {
            ConvertHoldOutcome::Converted { reservation_id } => {
                println!("Converted hold {hold_id} into reservation {reservation_id}");
            }
            ConvertHoldOutcome::NeedsManual => {
                println!(
                    "Payment recorded for manual review; hold {hold_id} was not converted"
                );
            }
            ConvertHoldOutcome::NoOp(reason) => {
                println!("Hold {hold_id} unchanged: {reason}");
            }
        }
        Ok(())
    }
}
