//! The terminal reservation record.
//!
//! A reservation is produced at most once per hold when the hold is
//! successfully converted. The `UNIQUE(property_id, hold_id)` constraint
//! is part of the external contract and the ultimate backstop against
//! duplicate conversion.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ids::{HoldId, PropertyId, ReservationId};

/// Lifecycle state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// The booking stands.
    Confirmed,
    /// The booking was cancelled after confirmation.
    Cancelled,
}

impl ReservationStatus {
    /// Returns the column encoding of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses the column encoding back into a status.
    ///
    /// # Errors
    ///
    /// Returns the unrecognized input.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(other.to_string()),
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reservation row as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// The reservation's identifier.
    pub id: ReservationId,
    /// The owning property.
    pub property_id: PropertyId,
    /// The hold this reservation was converted from.
    pub hold_id: HoldId,
    /// Current lifecycle state.
    pub status: ReservationStatus,
    /// Check-in date, copied from the hold at conversion.
    pub checkin: NaiveDate,
    /// Check-out date, copied from the hold at conversion.
    pub checkout: NaiveDate,
    /// Total amount in minor currency units.
    pub total_amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
}
