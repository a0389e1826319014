//! Hold conversion: payment succeeded, turn the hold into a
//! reservation.
//!
//! Driven by payment-provider webhooks, which are at-least-once and
//! unordered. The provider event id is claimed as a dedupe receipt
//! before anything else. Money that arrives for a hold that can no
//! longer be converted is never dropped: the payment row is parked in
//! `needs_manual` and an event alerts the operator, while the ledger
//! stays untouched.

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::database::{ledger, Database};
use crate::error::{Error, Result};
use crate::event::{AggregateType, EventPayload, EventType};
use crate::hold::{Hold, HoldStatus};
use crate::ids::{HoldId, PropertyId, ReservationId};
use crate::operations::{dedupe, outbox, NoOpReason};
use crate::payment::{PaymentContext, PaymentStatus};

/// Inputs to [`convert_hold`].
#[derive(Debug, Clone)]
pub struct ConvertHoldOptions {
    /// The property the hold belongs to.
    pub property_id: PropertyId,
    /// The hold the payment was taken for.
    pub hold_id: HoldId,
    /// The payment facts from the provider webhook.
    pub payment: PaymentContext,
}

/// Outcome of [`convert_hold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertHoldOutcome {
    /// The hold became a confirmed reservation.
    Converted {
        /// The reservation the hold turned into.
        reservation_id: ReservationId,
    },
    /// The payment landed outside the hold's valid window; the payment
    /// row is parked for operator follow-up and the ledger untouched.
    NeedsManual,
    /// Nothing to do; the conversion is already satisfied.
    NoOp(NoOpReason),
}

/// Converts an active hold into a reservation after payment succeeded.
///
/// The held units move to booked night by night through guarded writes;
/// since the units were claimed at creation, a move that affects zero
/// rows is an integrity fault and rolls the whole webhook back. The
/// reservation insert is keyed unique per hold, the second line of
/// defense against double conversion.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the hold does not exist (the receipt
/// rolls back, so the provider's retry can be routed to an operator),
/// and [`Error::IntegrityFault`] if a ledger move fails.
pub fn convert_hold(
    db: &mut Database,
    options: &ConvertHoldOptions,
    now: DateTime<Utc>,
) -> Result<ConvertHoldOutcome> {
    options.payment.validate()?;
    let ctx = &options.payment;

    let tx = db.begin_immediate()?;

    if dedupe::claim_event(
        &tx,
        options.property_id,
        dedupe::SOURCE_PAYMENT_WEBHOOK,
        &ctx.event_id,
        now,
    )? == dedupe::EventClaim::AlreadyProcessed
    {
        tx.commit()?;
        return Ok(ConvertHoldOutcome::NoOp(NoOpReason::AlreadyProcessed));
    }

    let Some(hold) = Database::get_hold(&tx, options.property_id, options.hold_id)? else {
        return Err(Error::NotFound {
            resource: format!("hold {}", options.hold_id),
        });
    };

    match hold.status {
        HoldStatus::Converted => {
            // Late duplicate under a fresh event id. The reservation
            // already exists; record the payment as succeeded and stop.
            upsert(&tx, options, PaymentStatus::Succeeded, now)?;
            tx.commit()?;
            Ok(ConvertHoldOutcome::NoOp(NoOpReason::AlreadyConverted))
        }
        HoldStatus::Expired | HoldStatus::Cancelled => {
            park_needs_manual(&tx, options, &hold, "hold_not_active", now)?;
            tx.commit()?;
            warn!(
                "payment {} arrived for {} hold {}; parked for manual follow-up",
                ctx.provider_object_id, hold.status, hold.id
            );
            Ok(ConvertHoldOutcome::NeedsManual)
        }
        HoldStatus::Active if now > hold.expires_at => {
            // Paid after the TTL but before the expiry task ran. The
            // hold stays active for that task; only the payment is
            // parked.
            park_needs_manual(&tx, options, &hold, "paid_after_expiry", now)?;
            tx.commit()?;
            warn!(
                "payment {} arrived after expiry of hold {}; parked for manual follow-up",
                ctx.provider_object_id, hold.id
            );
            Ok(ConvertHoldOutcome::NeedsManual)
        }
        HoldStatus::Active => {
            upsert(&tx, options, PaymentStatus::Succeeded, now)?;

            let nights = Database::hold_nights(&tx, hold.id)?;
            for night in &nights {
                let moved = ledger::adjust(
                    &tx,
                    options.property_id,
                    night.room_type_id,
                    night.date,
                    -i64::from(night.qty),
                    i64::from(night.qty),
                    false,
                    now.timestamp(),
                )?;
                if !moved {
                    return Err(Error::IntegrityFault {
                        details: format!(
                            "held-to-booked move of {} unit(s) of room type {} on {} failed for hold {}",
                            night.qty, night.room_type_id, night.date, hold.id
                        ),
                    });
                }
            }

            if !Database::mark_hold_from_active(
                &tx,
                options.property_id,
                hold.id,
                HoldStatus::Converted,
                now,
            )? {
                return Err(Error::IntegrityFault {
                    details: format!("hold {} changed status mid-transaction", hold.id),
                });
            }
            let reservation_id = Database::insert_reservation_if_absent(&tx, &hold, now)?;

            let payment_row =
                Database::payment_row_id(&tx, options.property_id, &ctx.provider, &ctx.provider_object_id)?
                    .ok_or_else(|| Error::IntegrityFault {
                        details: format!(
                            "payment row missing after upsert for hold {}",
                            hold.id
                        ),
                    })?;
            outbox::emit(
                &tx,
                options.property_id,
                EventType::PaymentSucceeded,
                AggregateType::Payment,
                payment_row,
                Some(&hold.conversation_id),
                &EventPayload::new()
                    .provider(&ctx.provider)
                    .amount(ctx.amount, &ctx.currency),
                now,
            )?;
            outbox::emit(
                &tx,
                options.property_id,
                EventType::ReservationConfirmed,
                AggregateType::Reservation,
                reservation_id.value(),
                Some(&hold.conversation_id),
                &EventPayload::new()
                    .stay(hold.stay.checkin(), hold.stay.checkout())
                    .night_count(hold.stay.night_count())
                    .amount(hold.total_amount, &hold.currency),
                now,
            )?;

            tx.commit()?;
            info!(
                "converted hold {} into reservation {reservation_id} for property {}",
                hold.id, options.property_id
            );
            Ok(ConvertHoldOutcome::Converted { reservation_id })
        }
    }
}

fn upsert(
    conn: &rusqlite::Connection,
    options: &ConvertHoldOptions,
    status: PaymentStatus,
    now: DateTime<Utc>,
) -> Result<()> {
    let ctx = &options.payment;
    Database::upsert_payment(
        conn,
        options.property_id,
        options.hold_id,
        &ctx.provider,
        &ctx.provider_object_id,
        status,
        ctx.amount,
        &ctx.currency,
        now,
    )
}

fn park_needs_manual(
    conn: &rusqlite::Connection,
    options: &ConvertHoldOptions,
    hold: &Hold,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    let ctx = &options.payment;
    upsert(conn, options, PaymentStatus::NeedsManual, now)?;
    let payment_row =
        Database::payment_row_id(conn, options.property_id, &ctx.provider, &ctx.provider_object_id)?
            .ok_or_else(|| Error::IntegrityFault {
                details: format!("payment row missing after upsert for hold {}", hold.id),
            })?;
    outbox::emit(
        conn,
        options.property_id,
        EventType::PaymentNeedsManual,
        AggregateType::Payment,
        payment_row,
        Some(&hold.conversation_id),
        &EventPayload::new()
            .provider(&ctx.provider)
            .amount(ctx.amount, &ctx.currency)
            .reason(reason),
        now,
    )
}
