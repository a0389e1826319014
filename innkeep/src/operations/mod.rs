//! The transaction procedures of the hold engine.
//!
//! Each procedure follows the same recipe inside one immediate
//! transaction:
//!
//! 1. dedupe receipt or idempotency claim, before any side effect;
//! 2. read the hold and decide on its status (non-active means the
//!    no-op success path);
//! 3. walk the hold's nights in ascending `(room_type_id, date)` order,
//!    applying guarded ledger writes;
//! 4. append outbox events;
//! 5. commit.
//!
//! A guarded write that affects zero rows is either a normal negative
//! outcome (no availability during creation) or an integrity fault
//! (during release/convert, where the units must exist); faults roll
//! the transaction back and surface loudly.

mod cancel;
mod convert;
mod create;
pub mod dedupe;
mod expire;
pub mod outbox;
mod retention;

pub use cancel::{cancel_hold, CancelActor, CancelHoldOptions, CancelHoldOutcome};
pub use convert::{convert_hold, ConvertHoldOptions, ConvertHoldOutcome};
pub use create::{create_hold, CreateHoldOptions, CreateHoldOutcome, RoomRequest};
pub use expire::{expire_due, expire_hold, expire_task_id, ExpireHoldOptions, ExpireHoldOutcome};
pub use retention::{audit_inventory, sweep_outbox, AuditFinding, AuditReport, SweepOutcome};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::database::{ledger, Database};
use crate::error::{Error, Result};
use crate::ids::{HoldId, PropertyId};

/// Why a procedure committed without changing the hold.
///
/// Every variant is a success: the caller's intent is already satisfied
/// or superseded, and retrying would change nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    /// The dedupe layer has a committed receipt for this delivery.
    AlreadyProcessed,
    /// The hold already left `active` through another procedure.
    NotActive,
    /// The hold's expiry is not due yet.
    NotDue,
    /// The hold was already converted; the reservation exists.
    AlreadyConverted,
}

impl std::fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::AlreadyProcessed => "already processed",
            Self::NotActive => "hold is not active",
            Self::NotDue => "hold is not due for expiry",
            Self::AlreadyConverted => "hold was already converted",
        })
    }
}

/// Returns `held` units to the pool for every night of a hold.
///
/// Used by expiry and cancellation after the status flip. The nights
/// were claimed when the hold was created, so a release that affects
/// zero rows means the counters no longer reflect the hold's claim;
/// that is an integrity fault and the caller's transaction must roll
/// back.
fn release_held_nights(
    conn: &Connection,
    property_id: PropertyId,
    hold_id: HoldId,
    now: DateTime<Utc>,
) -> Result<()> {
    let nights = Database::hold_nights(conn, hold_id)?;
    for night in &nights {
        let released = ledger::adjust(
            conn,
            property_id,
            night.room_type_id,
            night.date,
            -i64::from(night.qty),
            0,
            false,
            now.timestamp(),
        )?;
        if !released {
            return Err(Error::IntegrityFault {
                details: format!(
                    "release of {} unit(s) of room type {} on {} failed for hold {hold_id}",
                    night.qty, night.room_type_id, night.date
                ),
            });
        }
    }
    Ok(())
}
