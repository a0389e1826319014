//! Hold cancellation.
//!
//! Guests cancel through their conversation; operators cancel anything.
//! Authorization is checked against a plain read before the write
//! transaction starts, so an unauthorized request never takes the
//! writer slot and leaves no receipt behind. The effect itself is the
//! same release as expiry, under a different event.

use chrono::{DateTime, Utc};
use log::info;

use crate::database::Database;
use crate::error::{Error, Result};
use crate::event::{AggregateType, EventPayload, EventType};
use crate::hold::{Hold, HoldStatus};
use crate::ids::{HoldId, PropertyId};
use crate::operations::{dedupe, outbox, release_held_nights, NoOpReason};

/// Who is asking for the cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelActor {
    /// The guest, identified by the conversation the hold was created
    /// from. May only cancel holds of that conversation.
    Guest {
        /// The requesting conversation.
        conversation_id: String,
    },
    /// Property staff. May cancel any hold of the property.
    Operator,
}

impl CancelActor {
    fn authorize(&self, hold: &Hold) -> Result<()> {
        match self {
            Self::Operator => Ok(()),
            Self::Guest { conversation_id } if *conversation_id == hold.conversation_id => Ok(()),
            Self::Guest { conversation_id } => Err(Error::Unauthorized {
                details: format!(
                    "conversation '{conversation_id}' does not own hold {}",
                    hold.id
                ),
            }),
        }
    }

    const fn reason(&self) -> &'static str {
        match self {
            Self::Guest { .. } => "guest_cancelled",
            Self::Operator => "operator_cancelled",
        }
    }
}

/// Inputs to [`cancel_hold`].
#[derive(Debug, Clone)]
pub struct CancelHoldOptions {
    /// The property the hold belongs to.
    pub property_id: PropertyId,
    /// The hold to cancel.
    pub hold_id: HoldId,
    /// Who is cancelling.
    pub actor: CancelActor,
    /// Caller-supplied retry guard.
    pub idempotency_key: String,
}

/// Outcome of [`cancel_hold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelHoldOutcome {
    /// The hold was cancelled and its inventory released.
    Cancelled,
    /// Nothing to do; cancellation is already satisfied or superseded.
    NoOp(NoOpReason),
}

/// Cancels an active hold, releasing its claimed inventory.
///
/// A retried request replays through the idempotency key as a no-op
/// success, and a hold that already left `active` commits as a no-op as
/// well: from the caller's view the hold is gone either way.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the hold does not exist,
/// [`Error::Unauthorized`] if the actor may not cancel it, and
/// [`Error::IntegrityFault`] if a release affects zero rows.
pub fn cancel_hold(
    db: &mut Database,
    options: &CancelHoldOptions,
    now: DateTime<Utc>,
) -> Result<CancelHoldOutcome> {
    if options.idempotency_key.trim().is_empty() {
        return Err(Error::Validation {
            field: "idempotency_key".into(),
            message: "idempotency key must be non-blank".into(),
        });
    }

    // Authorization first, on a plain read. The authoritative state is
    // re-read inside the transaction; ownership never changes, so the
    // answer cannot go stale.
    let Some(hold) = Database::get_hold(db.connection(), options.property_id, options.hold_id)?
    else {
        return Err(Error::NotFound {
            resource: format!("hold {}", options.hold_id),
        });
    };
    options.actor.authorize(&hold)?;

    let tx = db.begin_immediate()?;

    if matches!(
        dedupe::claim_idempotency_key(
            &tx,
            options.property_id,
            dedupe::SCOPE_CANCEL_HOLD,
            &options.idempotency_key,
            now,
        )?,
        dedupe::KeyClaim::Replayed(_)
    ) {
        tx.commit()?;
        return Ok(CancelHoldOutcome::NoOp(NoOpReason::AlreadyProcessed));
    }

    let Some(hold) = Database::get_hold(&tx, options.property_id, options.hold_id)? else {
        return Err(Error::NotFound {
            resource: format!("hold {}", options.hold_id),
        });
    };
    if hold.status != HoldStatus::Active {
        tx.commit()?;
        return Ok(CancelHoldOutcome::NoOp(NoOpReason::NotActive));
    }

    if !Database::mark_hold_from_active(
        &tx,
        options.property_id,
        hold.id,
        HoldStatus::Cancelled,
        now,
    )? {
        return Err(Error::IntegrityFault {
            details: format!("hold {} changed status mid-transaction", hold.id),
        });
    }
    release_held_nights(&tx, options.property_id, hold.id, now)?;

    let payload = EventPayload::new()
        .stay(hold.stay.checkin(), hold.stay.checkout())
        .night_count(hold.stay.night_count())
        .reason(options.actor.reason());
    outbox::emit(
        &tx,
        options.property_id,
        EventType::HoldCancelled,
        AggregateType::Hold,
        hold.id.value(),
        Some(&hold.conversation_id),
        &payload,
        now,
    )?;

    tx.commit()?;
    info!(
        "cancelled hold {} for property {} ({})",
        hold.id,
        options.property_id,
        options.actor.reason()
    );
    Ok(CancelHoldOutcome::Cancelled)
}
