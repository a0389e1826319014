#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # innkeep
//!
//! A zero-overbooking hold and inventory transaction engine for
//! lodging properties.
//!
//! The engine keeps a per-night inventory ledger and moves holds
//! through a strict lifecycle, `active` to exactly one of `expired`,
//! `cancelled`, or `converted`, with every transition running as a
//! single write transaction over `SQLite`. Inventory counters are only
//! ever changed through guarded conditional writes whose predicates
//! carry the no-overbooking invariant, so a violating write affects
//! zero rows instead of corrupting the ledger.
//!
//! ## Core Types
//!
//! - [`Hold`], [`HoldStatus`], [`HoldNight`]: the time-boxed claim on
//!   inventory
//! - [`StayDates`]: validated checkin/checkout window
//! - [`Reservation`], [`Payment`]: what a hold becomes and what pays
//!   for it
//! - [`Error`] and [`Result`]: error handling types
//!
//! ## Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use innkeep::StayDates;
//!
//! let stay = StayDates::new(
//!     NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
//! )
//! .unwrap();
//!
//! // Nights are checkout-exclusive.
//! assert_eq!(stay.night_count(), 3);
//! ```

pub mod booking;
pub mod config;
pub mod database;
pub mod error;
pub mod event;
pub mod hold;
pub mod ids;
pub mod logging;
pub mod operations;
pub mod payment;
pub mod stay;

// Re-export key types at crate root for convenience
pub use booking::{Reservation, ReservationStatus};
pub use config::{Config, ConfigBuilder, ResolvedConfig};
pub use database::{Database, DatabaseConfig, InventoryCounters};
pub use error::{Error, Result};
pub use event::{AggregateType, DomainEvent, EventPayload, EventType};
pub use hold::{Hold, HoldNight, HoldStatus, NewHold};
pub use ids::{HoldId, PropertyId, ReservationId, RoomTypeId};
pub use logging::{init_logger, resolve_log_level, LogLevel, Logger};
pub use operations::{
    cancel_hold, convert_hold, create_hold, expire_due, expire_hold, expire_task_id, CancelActor,
    CancelHoldOptions, CancelHoldOutcome, ConvertHoldOptions, ConvertHoldOutcome,
    CreateHoldOptions, CreateHoldOutcome, ExpireHoldOptions, ExpireHoldOutcome, NoOpReason,
    RoomRequest,
};
pub use payment::{Payment, PaymentContext, PaymentStatus};
pub use stay::StayDates;
