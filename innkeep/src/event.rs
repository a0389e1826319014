//! Domain event types for the outbox.
//!
//! Outbox rows are append-only and written in the same transaction as
//! the state change they describe, never speculatively and never after
//! commit. Payloads are built through [`EventPayload`], whose setters
//! are the allow-list: only residual, non-identifying facts can be
//! carried. Free-form fields (guest messages, names, contact details)
//! have no setter and therefore cannot leak into the event log.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::ids::PropertyId;

/// The kind of domain event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// A hold was created and inventory claimed.
    HoldCreated,
    /// A hold lapsed and its inventory was released.
    HoldExpired,
    /// A hold was cancelled and its inventory released.
    HoldCancelled,
    /// A payment was confirmed by its provider.
    PaymentSucceeded,
    /// A payment succeeded outside its hold's valid window and needs
    /// operator follow-up.
    PaymentNeedsManual,
    /// A reservation was confirmed.
    ReservationConfirmed,
}

impl EventType {
    /// Returns the column encoding of this event type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HoldCreated => "HOLD_CREATED",
            Self::HoldExpired => "HOLD_EXPIRED",
            Self::HoldCancelled => "HOLD_CANCELLED",
            Self::PaymentSucceeded => "PAYMENT_SUCCEEDED",
            Self::PaymentNeedsManual => "PAYMENT_NEEDS_MANUAL",
            Self::ReservationConfirmed => "RESERVATION_CONFIRMED",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The aggregate an event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateType {
    /// The event concerns a hold.
    Hold,
    /// The event concerns a payment.
    Payment,
    /// The event concerns a reservation.
    Reservation,
}

impl AggregateType {
    /// Returns the column encoding of this aggregate type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hold => "hold",
            Self::Payment => "payment",
            Self::Reservation => "reservation",
        }
    }
}

impl std::fmt::Display for AggregateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allow-listed event payload.
///
/// Every field is optional; emit sites set only what the event needs.
/// Serialization skips unset fields, keeping rows minimal.
///
/// # Examples
///
/// ```
/// use innkeep::EventPayload;
///
/// let payload = EventPayload::new()
///     .night_count(3)
///     .amount(18_000, "EUR");
///
/// let json = payload.to_json().unwrap();
/// assert_eq!(json["night_count"], 3);
/// assert_eq!(json["currency"], "EUR");
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    checkin: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    checkout: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    night_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl EventPayload {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stay window.
    #[must_use]
    pub const fn stay(mut self, checkin: NaiveDate, checkout: NaiveDate) -> Self {
        self.checkin = Some(checkin);
        self.checkout = Some(checkout);
        self
    }

    /// Sets the number of nights affected.
    #[must_use]
    pub const fn night_count(mut self, count: u32) -> Self {
        self.night_count = Some(count);
        self
    }

    /// Sets the amount and currency.
    #[must_use]
    pub fn amount(mut self, amount: i64, currency: impl Into<String>) -> Self {
        self.amount = Some(amount);
        self.currency = Some(currency.into());
        self
    }

    /// Sets the payment provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets a short machine-readable reason, e.g. `"hold_expired"`.
    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Serializes the payload to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// An outbox row as stored in the database.
#[derive(Debug, Clone)]
pub struct DomainEvent {
    /// The row's identifier.
    pub id: i64,
    /// The owning property.
    pub property_id: PropertyId,
    /// The kind of event.
    pub event_type: String,
    /// The aggregate the event is about.
    pub aggregate_type: String,
    /// The aggregate's identifier.
    pub aggregate_id: i64,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
    /// Correlates events triggered by the same conversation or request.
    pub correlation_id: Option<String>,
    /// The allow-listed payload.
    pub payload: serde_json::Value,
}
