//! Hold creation.
//!
//! Claims inventory for every night of a stay inside one immediate
//! transaction, all-or-nothing: the first night whose guarded reserve
//! affects zero rows rolls the whole attempt back and reports which
//! night was full. Retried requests replay through the stored
//! idempotency response instead of claiming inventory twice.

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};

use crate::database::{ledger, Database};
use crate::error::{Error, Result};
use crate::event::{AggregateType, EventPayload, EventType};
use crate::hold::{sort_nights, HoldNight, NewHold};
use crate::ids::{HoldId, PropertyId, RoomTypeId};
use crate::operations::{dedupe, outbox};
use crate::stay::StayDates;

/// One room-type line of a hold request: `qty` units of `room_type_id`
/// for every night of the stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomRequest {
    /// The requested room type.
    pub room_type_id: RoomTypeId,
    /// Units per night, at least 1.
    pub qty: u32,
}

/// Inputs to [`create_hold`].
#[derive(Debug, Clone)]
pub struct CreateHoldOptions {
    /// The property the hold belongs to.
    pub property_id: PropertyId,
    /// The guest conversation that produced the request.
    pub conversation_id: String,
    /// The quote option the guest accepted; prices and room selection
    /// were frozen when the quote was issued.
    pub quote_option_id: String,
    /// The stay window.
    pub stay: StayDates,
    /// The frozen room selection, one line per room type.
    pub rooms: Vec<RoomRequest>,
    /// Total price in minor units.
    pub total_amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Caller-supplied retry guard.
    pub idempotency_key: String,
    /// Minutes until the hold lapses.
    pub ttl_minutes: i64,
}

/// Outcome of [`create_hold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateHoldOutcome {
    /// Inventory was claimed and the hold written.
    Created {
        /// The new hold.
        hold_id: HoldId,
        /// When the hold lapses unless converted or cancelled.
        expires_at: DateTime<Utc>,
    },
    /// The idempotency key was already used; this is the first run's
    /// stored answer, not a new hold.
    Replayed {
        /// The hold created by the first run.
        hold_id: HoldId,
        /// Its expiry.
        expires_at: DateTime<Utc>,
    },
    /// At least one night lacked capacity; nothing was written.
    NoAvailability {
        /// The room type that was full.
        room_type_id: RoomTypeId,
        /// The first night that could not be claimed.
        date: NaiveDate,
    },
}

fn build_nights(stay: StayDates, rooms: &[RoomRequest]) -> Result<Vec<HoldNight>> {
    if rooms.is_empty() {
        return Err(Error::Validation {
            field: "rooms".into(),
            message: "a hold needs at least one room line".into(),
        });
    }
    let mut nights = Vec::with_capacity(rooms.len() * stay.night_count() as usize);
    for room in rooms {
        for date in stay.nights() {
            nights.push(HoldNight::new(room.room_type_id, date, room.qty)?);
        }
    }
    sort_nights(&mut nights);
    Ok(nights)
}

fn parse_stored_outcome(response: &serde_json::Value) -> Result<CreateHoldOutcome> {
    let hold_id = response["hold_id"].as_i64();
    let expires = response["expires_at"]
        .as_i64()
        .and_then(|secs| DateTime::from_timestamp(secs, 0));
    match (hold_id, expires) {
        (Some(id), Some(expires_at)) => Ok(CreateHoldOutcome::Replayed {
            hold_id: HoldId::new(id),
            expires_at,
        }),
        _ => Err(Error::DatabaseCorruption {
            details: format!("unreadable stored create_hold response: {response}"),
        }),
    }
}

/// Creates a hold, claiming inventory for every night of the stay.
///
/// Runs as a single immediate transaction: idempotency claim first,
/// then the hold row and its nights, then one guarded reserve per night
/// in ascending `(room_type_id, date)` order, then the stored response
/// and the outbox event. A full night rolls everything back, leaving no
/// trace of the attempt.
///
/// # Errors
///
/// Returns an error on invalid inputs, on storage failure, or when a
/// replayed key carries no readable response.
pub fn create_hold(
    db: &mut Database,
    options: &CreateHoldOptions,
    now: DateTime<Utc>,
) -> Result<CreateHoldOutcome> {
    let nights = build_nights(options.stay, &options.rooms)?;
    let new_hold = NewHold::builder(options.property_id, options.stay)
        .conversation_id(&options.conversation_id)
        .quote_option_id(&options.quote_option_id)
        .total_amount(options.total_amount)
        .currency(&options.currency)
        .build()?;
    if options.idempotency_key.trim().is_empty() {
        return Err(Error::Validation {
            field: "idempotency_key".into(),
            message: "idempotency key must be non-blank".into(),
        });
    }
    let expires_at = now + chrono::Duration::minutes(options.ttl_minutes);

    let tx = db.begin_immediate()?;

    match dedupe::claim_idempotency_key(
        &tx,
        options.property_id,
        dedupe::SCOPE_CREATE_HOLD,
        &options.idempotency_key,
        now,
    )? {
        dedupe::KeyClaim::Fresh => {}
        dedupe::KeyClaim::Replayed(Some(response)) => {
            let outcome = parse_stored_outcome(&response)?;
            tx.commit()?;
            debug!(
                "create_hold replayed key '{}' for property {}",
                options.idempotency_key, options.property_id
            );
            return Ok(outcome);
        }
        dedupe::KeyClaim::Replayed(None) => {
            // The response commits atomically with the key, so a bare
            // key means the store itself is damaged.
            return Err(Error::DatabaseCorruption {
                details: format!(
                    "idempotency key '{}' has no stored response",
                    options.idempotency_key
                ),
            });
        }
    }

    let hold_id = Database::insert_hold(&tx, &new_hold, expires_at, now)?;
    Database::insert_hold_nights(&tx, hold_id, &nights)?;

    for night in &nights {
        let claimed = ledger::adjust(
            &tx,
            options.property_id,
            night.room_type_id,
            night.date,
            i64::from(night.qty),
            0,
            true,
            now.timestamp(),
        )?;
        if !claimed {
            let (room_type_id, date) = (night.room_type_id, night.date);
            tx.rollback()?;
            debug!(
                "create_hold found no availability for room type {room_type_id} on {date}"
            );
            return Ok(CreateHoldOutcome::NoAvailability { room_type_id, date });
        }
    }

    let response = serde_json::json!({
        "hold_id": hold_id.value(),
        "expires_at": expires_at.timestamp(),
    });
    dedupe::store_response(
        &tx,
        options.property_id,
        dedupe::SCOPE_CREATE_HOLD,
        &options.idempotency_key,
        &response,
    )?;

    let payload = EventPayload::new()
        .stay(options.stay.checkin(), options.stay.checkout())
        .night_count(options.stay.night_count())
        .amount(options.total_amount, &options.currency);
    outbox::emit(
        &tx,
        options.property_id,
        EventType::HoldCreated,
        AggregateType::Hold,
        hold_id.value(),
        Some(&options.conversation_id),
        &payload,
        now,
    )?;

    tx.commit()?;
    info!(
        "created hold {hold_id} for property {} ({} nights, expires {})",
        options.property_id,
        nights.len(),
        expires_at.timestamp()
    );
    Ok(CreateHoldOutcome::Created { hold_id, expires_at })
}
