//! Hold expiry.
//!
//! Triggered by task-queue delivery, which is at-least-once: the task
//! id is claimed as a dedupe receipt before anything else, so a
//! redelivered task lands on the no-op path. A hold that already left
//! `active`, or whose expiry is not due, also commits as a no-op; the
//! receipt is kept either way, which is what makes redelivery safe.

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::database::Database;
use crate::error::{Error, Result};
use crate::event::{AggregateType, EventPayload, EventType};
use crate::hold::HoldStatus;
use crate::ids::{HoldId, PropertyId};
use crate::operations::{dedupe, outbox, release_held_nights, NoOpReason};

/// Inputs to [`expire_hold`].
#[derive(Debug, Clone)]
pub struct ExpireHoldOptions {
    /// The property the hold belongs to.
    pub property_id: PropertyId,
    /// The hold to expire.
    pub hold_id: HoldId,
    /// The task-queue delivery id, the dedupe key for redelivery.
    pub task_id: String,
}

/// Outcome of [`expire_hold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpireHoldOutcome {
    /// The hold lapsed and its inventory was released.
    Expired,
    /// Nothing to do; the receipt was still recorded.
    NoOp(NoOpReason),
}

/// Derives the canonical task id for a hold's expiry.
///
/// Including the expiry timestamp means a hold whose TTL was extended
/// would get a fresh task id, while redeliveries of the same task share
/// one.
#[must_use]
pub fn expire_task_id(hold_id: HoldId, expires_at: DateTime<Utc>) -> String {
    format!("expire-{hold_id}-{}", expires_at.timestamp())
}

/// Expires a due hold, releasing its claimed inventory.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the hold does not exist, and
/// [`Error::IntegrityFault`] (rolling everything back) if a release
/// affects zero rows.
pub fn expire_hold(
    db: &mut Database,
    options: &ExpireHoldOptions,
    now: DateTime<Utc>,
) -> Result<ExpireHoldOutcome> {
    let tx = db.begin_immediate()?;

    if dedupe::claim_event(
        &tx,
        options.property_id,
        dedupe::SOURCE_TASK_QUEUE,
        &options.task_id,
        now,
    )? == dedupe::EventClaim::AlreadyProcessed
    {
        tx.commit()?;
        return Ok(ExpireHoldOutcome::NoOp(NoOpReason::AlreadyProcessed));
    }

    let Some(hold) = Database::get_hold(&tx, options.property_id, options.hold_id)? else {
        return Err(Error::NotFound {
            resource: format!("hold {}", options.hold_id),
        });
    };

    if hold.status != HoldStatus::Active {
        tx.commit()?;
        return Ok(ExpireHoldOutcome::NoOp(NoOpReason::NotActive));
    }
    if now < hold.expires_at {
        // Early delivery. The task id is consumed with this commit; the
        // scheduler issues a fresh id if the expiry is rescheduled.
        warn!(
            "expiry task '{}' delivered {}s early for hold {}",
            options.task_id,
            (hold.expires_at - now).num_seconds(),
            hold.id
        );
        tx.commit()?;
        return Ok(ExpireHoldOutcome::NoOp(NoOpReason::NotDue));
    }

    if !Database::mark_hold_from_active(
        &tx,
        options.property_id,
        hold.id,
        HoldStatus::Expired,
        now,
    )? {
        return Err(Error::IntegrityFault {
            details: format!("hold {} changed status mid-transaction", hold.id),
        });
    }
    release_held_nights(&tx, options.property_id, hold.id, now)?;

    let payload = EventPayload::new()
        .stay(hold.stay.checkin(), hold.stay.checkout())
        .night_count(hold.stay.night_count());
    outbox::emit(
        &tx,
        options.property_id,
        EventType::HoldExpired,
        AggregateType::Hold,
        hold.id.value(),
        Some(&hold.conversation_id),
        &payload,
        now,
    )?;

    tx.commit()?;
    info!("expired hold {} for property {}", hold.id, options.property_id);
    Ok(ExpireHoldOutcome::Expired)
}

/// Expires every due hold, oldest first, each in its own transaction.
///
/// The per-hold task id is derived with [`expire_task_id`], so a sweep
/// that races a queue-delivered expiry of the same hold converges on
/// one winner through the dedupe receipt.
///
/// # Errors
///
/// Returns the first error encountered; holds processed before it stay
/// committed.
pub fn expire_due(
    db: &mut Database,
    now: DateTime<Utc>,
    limit: u32,
) -> Result<Vec<(HoldId, ExpireHoldOutcome)>> {
    let due = Database::find_due_holds(db.connection(), now, limit)?;
    let mut outcomes = Vec::with_capacity(due.len());
    for (hold_id, property_id) in due {
        let Some(hold) = Database::get_hold(db.connection(), property_id, hold_id)? else {
            continue;
        };
        let options = ExpireHoldOptions {
            property_id,
            hold_id,
            task_id: expire_task_id(hold_id, hold.expires_at),
        };
        outcomes.push((hold_id, expire_hold(db, &options, now)?));
    }
    Ok(outcomes)
}
