//! End-to-end tests for the hold lifecycle: create, expire, cancel,
//! convert, and the maintenance operations, each against a real
//! database file.

mod common;

use chrono::Utc;
use common::{date, engine_with_capacity};

use innkeep::database::Database;
use innkeep::operations::{audit_inventory, outbox, sweep_outbox};
use innkeep::{
    cancel_hold, convert_hold, create_hold, expire_due, expire_hold, expire_task_id,
    CancelActor, CancelHoldOptions, CancelHoldOutcome, ConvertHoldOptions, ConvertHoldOutcome,
    CreateHoldOutcome, Error, EventType, ExpireHoldOptions, ExpireHoldOutcome, HoldId, HoldStatus,
    NoOpReason, PaymentStatus, ReservationStatus, StayDates,
};

fn created(outcome: CreateHoldOutcome) -> HoldId {
    match outcome {
        CreateHoldOutcome::Created { hold_id, .. } => hold_id,
        other => panic!("expected Created, got {other:?}"),
    }
}

#[test]
fn test_create_claims_every_night() {
    let mut engine = engine_with_capacity(2);
    let now = Utc::now();

    let create_options = engine.create_options("k-1");
    let hold_id = created(create_hold(&mut engine.db, &create_options, now).unwrap());

    for day in [1, 2] {
        let counters = engine.counters(day);
        assert_eq!(counters.inv_held, 1);
        assert_eq!(counters.available(), 1);
    }
    // Checkout day is exclusive.
    assert_eq!(engine.counters(3).inv_held, 0);

    let hold = Database::get_hold(engine.db.connection(), engine.property, hold_id)
        .unwrap()
        .unwrap();
    assert_eq!(hold.status, HoldStatus::Active);

    let events = outbox::list_events(engine.db.connection(), engine.property).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "HOLD_CREATED");
    assert_eq!(events[0].correlation_id.as_deref(), Some("conv-1"));
}

#[test]
fn test_create_rejects_when_full() {
    let mut engine = engine_with_capacity(1);
    let now = Utc::now();

    let first_options = engine.create_options("k-1");
    created(create_hold(&mut engine.db, &first_options, now).unwrap());
    let second_options = engine.create_options("k-2");
    let outcome = create_hold(&mut engine.db, &second_options, now).unwrap();

    assert_eq!(
        outcome,
        CreateHoldOutcome::NoAvailability {
            room_type_id: engine.room_type,
            date: date(1),
        }
    );
    // The failed attempt left nothing behind: one hold, one claim.
    assert_eq!(
        Database::list_holds(engine.db.connection(), engine.property)
            .unwrap()
            .len(),
        1
    );
    assert_eq!(engine.counters(1).inv_held, 1);
}

#[test]
fn test_create_is_all_or_nothing_across_nights() {
    let mut engine = engine_with_capacity(1);
    let now = Utc::now();

    // Claim June 2 only, so a June 1-4 stay fails mid-loop.
    let mut short = engine.create_options("k-short");
    short.stay = StayDates::new(date(2), date(3)).unwrap();
    created(create_hold(&mut engine.db, &short, now).unwrap());

    let mut long = engine.create_options("k-long");
    long.stay = StayDates::new(date(1), date(4)).unwrap();
    let outcome = create_hold(&mut engine.db, &long, now).unwrap();

    assert_eq!(
        outcome,
        CreateHoldOutcome::NoAvailability {
            room_type_id: engine.room_type,
            date: date(2),
        }
    );
    // June 1 was claimable but the partial claim rolled back with the rest.
    assert_eq!(engine.counters(1).inv_held, 0);
    assert_eq!(engine.counters(2).inv_held, 1);
}

#[test]
fn test_expire_releases_inventory() {
    let mut engine = engine_with_capacity(1);
    let now = Utc::now();

    let create_options = engine.create_options("k-1");
    let hold_id = created(create_hold(&mut engine.db, &create_options, now).unwrap());
    let after = now + chrono::Duration::minutes(31);

    let outcome = expire_hold(
        &mut engine.db,
        &ExpireHoldOptions {
            property_id: engine.property,
            hold_id,
            task_id: "task-1".to_string(),
        },
        after,
    )
    .unwrap();
    assert_eq!(outcome, ExpireHoldOutcome::Expired);

    let hold = Database::get_hold(engine.db.connection(), engine.property, hold_id)
        .unwrap()
        .unwrap();
    assert_eq!(hold.status, HoldStatus::Expired);
    assert_eq!(engine.counters(1).inv_held, 0);
    assert_eq!(engine.counters(2).inv_held, 0);
    assert_eq!(
        outbox::count_events(engine.db.connection(), engine.property, EventType::HoldExpired)
            .unwrap(),
        1
    );
}

#[test]
fn test_expire_before_due_is_noop() {
    let mut engine = engine_with_capacity(1);
    let now = Utc::now();

    let create_options = engine.create_options("k-1");
    let hold_id = created(create_hold(&mut engine.db, &create_options, now).unwrap());

    let outcome = expire_hold(
        &mut engine.db,
        &ExpireHoldOptions {
            property_id: engine.property,
            hold_id,
            task_id: "task-early".to_string(),
        },
        now + chrono::Duration::minutes(5),
    )
    .unwrap();
    assert_eq!(outcome, ExpireHoldOutcome::NoOp(NoOpReason::NotDue));

    let hold = Database::get_hold(engine.db.connection(), engine.property, hold_id)
        .unwrap()
        .unwrap();
    assert_eq!(hold.status, HoldStatus::Active);
    assert_eq!(engine.counters(1).inv_held, 1);
}

#[test]
fn test_expire_unknown_hold_is_not_found() {
    let mut engine = engine_with_capacity(1);
    let err = expire_hold(
        &mut engine.db,
        &ExpireHoldOptions {
            property_id: engine.property,
            hold_id: HoldId::new(999),
            task_id: "task-x".to_string(),
        },
        Utc::now(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn test_expire_due_sweeps_only_due_holds() {
    let mut engine = engine_with_capacity(2);
    let now = Utc::now();

    let due_options = engine.create_options("k-due");
    let due = created(create_hold(&mut engine.db, &due_options, now).unwrap());
    let mut live_options = engine.create_options("k-live");
    live_options.stay = StayDates::new(date(5), date(6)).unwrap();
    live_options.ttl_minutes = 120;
    let live = created(create_hold(&mut engine.db, &live_options, now).unwrap());

    let after = now + chrono::Duration::minutes(31);
    let outcomes = expire_due(&mut engine.db, after, 10).unwrap();
    assert_eq!(outcomes, vec![(due, ExpireHoldOutcome::Expired)]);

    let live_hold = Database::get_hold(engine.db.connection(), engine.property, live)
        .unwrap()
        .unwrap();
    assert_eq!(live_hold.status, HoldStatus::Active);

    // A queue delivery for the same expiry lands on the sweep's receipt.
    let redelivered = expire_hold(
        &mut engine.db,
        &ExpireHoldOptions {
            property_id: engine.property,
            hold_id: due,
            task_id: expire_task_id(due, now + chrono::Duration::minutes(30)),
        },
        after,
    )
    .unwrap();
    assert_eq!(
        redelivered,
        ExpireHoldOutcome::NoOp(NoOpReason::AlreadyProcessed)
    );
}

#[test]
fn test_guest_cancel_releases_inventory() {
    let mut engine = engine_with_capacity(1);
    let now = Utc::now();

    let create_options = engine.create_options("k-1");
    let hold_id = created(create_hold(&mut engine.db, &create_options, now).unwrap());
    let outcome = cancel_hold(
        &mut engine.db,
        &CancelHoldOptions {
            property_id: engine.property,
            hold_id,
            actor: CancelActor::Guest {
                conversation_id: "conv-1".to_string(),
            },
            idempotency_key: "cancel-1".to_string(),
        },
        now,
    )
    .unwrap();
    assert_eq!(outcome, CancelHoldOutcome::Cancelled);

    let hold = Database::get_hold(engine.db.connection(), engine.property, hold_id)
        .unwrap()
        .unwrap();
    assert_eq!(hold.status, HoldStatus::Cancelled);
    assert_eq!(engine.counters(1).inv_held, 0);
    assert_eq!(
        outbox::count_events(engine.db.connection(), engine.property, EventType::HoldCancelled)
            .unwrap(),
        1
    );
}

#[test]
fn test_foreign_conversation_cannot_cancel() {
    let mut engine = engine_with_capacity(1);
    let now = Utc::now();

    let create_options = engine.create_options("k-1");
    let hold_id = created(create_hold(&mut engine.db, &create_options, now).unwrap());
    let err = cancel_hold(
        &mut engine.db,
        &CancelHoldOptions {
            property_id: engine.property,
            hold_id,
            actor: CancelActor::Guest {
                conversation_id: "conv-other".to_string(),
            },
            idempotency_key: "cancel-2".to_string(),
        },
        now,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Unauthorized { .. }));

    // Nothing changed, and the rejected key was never consumed.
    let hold = Database::get_hold(engine.db.connection(), engine.property, hold_id)
        .unwrap()
        .unwrap();
    assert_eq!(hold.status, HoldStatus::Active);
    assert_eq!(engine.counters(1).inv_held, 1);
}

#[test]
fn test_operator_can_cancel_any_hold() {
    let mut engine = engine_with_capacity(1);
    let now = Utc::now();

    let create_options = engine.create_options("k-1");
    let hold_id = created(create_hold(&mut engine.db, &create_options, now).unwrap());
    let outcome = cancel_hold(
        &mut engine.db,
        &CancelHoldOptions {
            property_id: engine.property,
            hold_id,
            actor: CancelActor::Operator,
            idempotency_key: "cancel-op".to_string(),
        },
        now,
    )
    .unwrap();
    assert_eq!(outcome, CancelHoldOutcome::Cancelled);
}

#[test]
fn test_cancel_after_expiry_is_noop() {
    let mut engine = engine_with_capacity(1);
    let now = Utc::now();

    let create_options = engine.create_options("k-1");
    let hold_id = created(create_hold(&mut engine.db, &create_options, now).unwrap());
    let after = now + chrono::Duration::minutes(31);
    expire_hold(
        &mut engine.db,
        &ExpireHoldOptions {
            property_id: engine.property,
            hold_id,
            task_id: "task-1".to_string(),
        },
        after,
    )
    .unwrap();

    let outcome = cancel_hold(
        &mut engine.db,
        &CancelHoldOptions {
            property_id: engine.property,
            hold_id,
            actor: CancelActor::Operator,
            idempotency_key: "cancel-late".to_string(),
        },
        after,
    )
    .unwrap();
    assert_eq!(outcome, CancelHoldOutcome::NoOp(NoOpReason::NotActive));
    // Released exactly once.
    assert_eq!(engine.counters(1).inv_held, 0);
}

#[test]
fn test_convert_moves_held_to_booked() {
    let mut engine = engine_with_capacity(1);
    let now = Utc::now();

    let create_options = engine.create_options("k-1");
    let hold_id = created(create_hold(&mut engine.db, &create_options, now).unwrap());
    let convert_options = ConvertHoldOptions {
        property_id: engine.property,
        hold_id,
        payment: engine.payment("evt-1"),
    };
    let outcome = convert_hold(
        &mut engine.db,
        &convert_options,
        now + chrono::Duration::minutes(5),
    )
    .unwrap();

    let ConvertHoldOutcome::Converted { reservation_id } = outcome else {
        panic!("expected Converted, got {outcome:?}");
    };

    for day in [1, 2] {
        let counters = engine.counters(day);
        assert_eq!(counters.inv_held, 0);
        assert_eq!(counters.inv_booked, 1);
        assert_eq!(counters.available(), 0);
    }

    let hold = Database::get_hold(engine.db.connection(), engine.property, hold_id)
        .unwrap()
        .unwrap();
    assert_eq!(hold.status, HoldStatus::Converted);

    let reservation =
        Database::get_reservation_by_hold(engine.db.connection(), engine.property, hold_id)
            .unwrap()
            .unwrap();
    assert_eq!(reservation.id, reservation_id);
    assert_eq!(reservation.status, ReservationStatus::Confirmed);
    assert_eq!(reservation.total_amount, 20_000);

    let payment = Database::get_payment(engine.db.connection(), engine.property, "stripe", "pi_100")
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Succeeded);

    for event_type in [EventType::PaymentSucceeded, EventType::ReservationConfirmed] {
        assert_eq!(
            outbox::count_events(engine.db.connection(), engine.property, event_type).unwrap(),
            1
        );
    }
}

#[test]
fn test_payment_after_ttl_is_parked() {
    let mut engine = engine_with_capacity(1);
    let now = Utc::now();

    let create_options = engine.create_options("k-1");
    let hold_id = created(create_hold(&mut engine.db, &create_options, now).unwrap());
    let late = now + chrono::Duration::minutes(45);

    let convert_options = ConvertHoldOptions {
        property_id: engine.property,
        hold_id,
        payment: engine.payment("evt-late"),
    };
    let outcome = convert_hold(&mut engine.db, &convert_options, late).unwrap();
    assert_eq!(outcome, ConvertHoldOutcome::NeedsManual);

    // The hold is left for its expiry task; only the payment is parked.
    let hold = Database::get_hold(engine.db.connection(), engine.property, hold_id)
        .unwrap()
        .unwrap();
    assert_eq!(hold.status, HoldStatus::Active);
    assert_eq!(engine.counters(1).inv_held, 1);
    assert_eq!(engine.counters(1).inv_booked, 0);

    let payment = Database::get_payment(engine.db.connection(), engine.property, "stripe", "pi_100")
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::NeedsManual);
    assert!(
        Database::get_reservation_by_hold(engine.db.connection(), engine.property, hold_id)
            .unwrap()
            .is_none()
    );
    assert_eq!(
        outbox::count_events(
            engine.db.connection(),
            engine.property,
            EventType::PaymentNeedsManual
        )
        .unwrap(),
        1
    );
}

#[test]
fn test_payment_for_cancelled_hold_is_parked() {
    let mut engine = engine_with_capacity(1);
    let now = Utc::now();

    let create_options = engine.create_options("k-1");
    let hold_id = created(create_hold(&mut engine.db, &create_options, now).unwrap());
    cancel_hold(
        &mut engine.db,
        &CancelHoldOptions {
            property_id: engine.property,
            hold_id,
            actor: CancelActor::Operator,
            idempotency_key: "cancel-1".to_string(),
        },
        now,
    )
    .unwrap();

    let convert_options = ConvertHoldOptions {
        property_id: engine.property,
        hold_id,
        payment: engine.payment("evt-after-cancel"),
    };
    let outcome = convert_hold(
        &mut engine.db,
        &convert_options,
        now + chrono::Duration::minutes(1),
    )
    .unwrap();
    assert_eq!(outcome, ConvertHoldOutcome::NeedsManual);

    // Cancelled release stands; nothing was booked.
    assert_eq!(engine.counters(1).inv_held, 0);
    assert_eq!(engine.counters(1).inv_booked, 0);
}

#[test]
fn test_audit_is_clean_after_full_lifecycle() {
    let mut engine = engine_with_capacity(2);
    let now = Utc::now();

    let converted_options = engine.create_options("k-1");
    let converted = created(create_hold(&mut engine.db, &converted_options, now).unwrap());
    let convert_options = ConvertHoldOptions {
        property_id: engine.property,
        hold_id: converted,
        payment: engine.payment("evt-1"),
    };
    convert_hold(&mut engine.db, &convert_options, now).unwrap();

    let expired_options = engine.create_options("k-2");
    let expired = created(create_hold(&mut engine.db, &expired_options, now).unwrap());
    expire_hold(
        &mut engine.db,
        &ExpireHoldOptions {
            property_id: engine.property,
            hold_id: expired,
            task_id: "task-1".to_string(),
        },
        now + chrono::Duration::minutes(31),
    )
    .unwrap();

    let report = audit_inventory(&engine.db, engine.property).unwrap();
    assert!(report.is_clean(), "unexpected drift: {:?}", report.findings);
    assert_eq!(report.rows_checked, 10);
}

#[test]
fn test_audit_reports_manual_drift() {
    let mut engine = engine_with_capacity(2);
    let now = Utc::now();
    let create_options = engine.create_options("k-1");
    created(create_hold(&mut engine.db, &create_options, now).unwrap());

    // Corrupt a counter behind the engine's back.
    engine
        .db
        .connection()
        .execute(
            "UPDATE inventory_days SET inv_held = 2 WHERE date = ?",
            [date(1).to_string()],
        )
        .unwrap();

    let report = audit_inventory(&engine.db, engine.property).unwrap();
    assert_eq!(report.findings.len(), 1);
    let finding = &report.findings[0];
    assert_eq!(finding.date, date(1));
    assert_eq!(finding.inv_held, 2);
    assert_eq!(finding.expected_held, 1);
}

#[test]
fn test_audit_rejects_unreadable_date() {
    let engine = engine_with_capacity(2);

    // A date column no NaiveDate can come back from.
    engine
        .db
        .connection()
        .execute(
            "UPDATE inventory_days SET date = 'June 1st' WHERE date = ?",
            [date(1).to_string()],
        )
        .unwrap();

    let err = audit_inventory(&engine.db, engine.property).unwrap_err();
    assert!(matches!(err, Error::DatabaseCorruption { .. }));
    assert!(format!("{err}").contains("June 1st"));
}

#[test]
fn test_sweep_outbox_respects_retention_and_dry_run() {
    let mut engine = engine_with_capacity(2);
    let now = Utc::now();
    let create_options = engine.create_options("k-1");
    created(create_hold(&mut engine.db, &create_options, now).unwrap());

    // Nothing is old enough yet.
    let fresh = sweep_outbox(&mut engine.db, 30, false, now).unwrap();
    assert_eq!(fresh.sweepable, 0);
    assert_eq!(fresh.removed, 0);

    let later = now + chrono::Duration::days(31);
    let dry = sweep_outbox(&mut engine.db, 30, true, later).unwrap();
    assert_eq!(dry.sweepable, 1);
    assert_eq!(dry.removed, 0);
    assert_eq!(
        outbox::list_events(engine.db.connection(), engine.property)
            .unwrap()
            .len(),
        1
    );

    let real = sweep_outbox(&mut engine.db, 30, false, later).unwrap();
    assert_eq!(real.removed, 1);
    assert!(outbox::list_events(engine.db.connection(), engine.property)
        .unwrap()
        .is_empty());
}
