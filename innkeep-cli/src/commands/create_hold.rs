//! The `create-hold` command.

use chrono::{NaiveDate, Utc};
use clap::Args;
use innkeep::{create_hold, CreateHoldOptions, CreateHoldOutcome, RoomRequest, StayDates};

use crate::error::CliError;
use crate::utils::{parse_room_spec, require_property, require_room_type, GlobalOptions};

/// Place a hold on inventory for a stay.
#[derive(Debug, Args)]
pub struct CreateHoldCommand {
    /// Owning property
    #[arg(long, value_name = "NAME")]
    pub property: String,

    /// Guest conversation the hold belongs to
    #[arg(long, value_name = "ID")]
    pub conversation: String,

    /// Quote option the guest accepted
    #[arg(long, value_name = "ID")]
    pub quote_option: String,

    /// Check-in date
    #[arg(long, value_name = "DATE")]
    pub checkin: NaiveDate,

    /// Check-out date (nights are checkout-exclusive)
    #[arg(long, value_name = "DATE")]
    pub checkout: NaiveDate,

    /// Room request as NAME or NAME:QTY, repeatable
    #[arg(long, value_name = "SPEC", value_parser = parse_room_spec, required = true)]
    pub room: Vec<(String, u32)>,

    /// Total amount in minor units (e.g. cents)
    #[arg(long, value_name = "AMOUNT")]
    pub amount: i64,

    /// ISO 4217 currency (defaults to the configured one)
    #[arg(long, value_name = "CODE")]
    pub currency: Option<String>,

    /// Idempotency key; retries with the same key replay the first answer
    #[arg(long, value_name = "KEY")]
    pub key: String,

    /// Hold TTL in minutes (defaults to the configured one)
    #[arg(long, value_name = "MINUTES")]
    pub ttl: Option<i64>,
}

impl CreateHoldCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let (mut db, config) = global.open()?;

        let property_id = require_property(db.connection(), &self.property)?;
        let mut rooms = Vec::with_capacity(self.room.len());
        for (name, qty) in &self.room {
            let room_type_id = require_room_type(db.connection(), property_id, name)?;
            rooms.push(RoomRequest {
                room_type_id,
                qty: *qty,
            });
        }

        let stay = StayDates::new(self.checkin, self.checkout).map_err(innkeep::Error::from)?;
        let options = CreateHoldOptions {
            property_id,
            conversation_id: self.conversation,
            quote_option_id: self.quote_option,
            stay,
            rooms,
            total_amount: self.amount,
            currency: self
                .currency
                .unwrap_or_else(|| config.default_currency.clone()),
            idempotency_key: self.key,
            ttl_minutes: self.ttl.unwrap_or(config.hold_ttl_minutes),
        };

        match create_hold(&mut db, &options, Utc::now())? {
            CreateHoldOutcome::Created {
                hold_id,
                expires_at,
            } => {
                println!("Created hold {hold_id}, expires at {expires_at}");
                Ok(())
            }
            CreateHoldOutcome::Replayed {
                hold_id,
                expires_at,
            } => {
                println!("Hold {hold_id} already created by this key, expires at {expires_at}");
                Ok(())
            }
            CreateHoldOutcome::NoAvailability { room_type_id, date } => {
                Err(CliError::SemanticFailure(format!(
                    "no availability for room type {room_type_id} on {date}"
                )))
            }
        }
    }
}
