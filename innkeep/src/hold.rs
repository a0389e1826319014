//! Hold types: the time-boxed claim on inventory.
//!
//! A hold is created `active` and transitions exactly once to one of the
//! terminal states `expired`, `cancelled`, or `converted`. Terminal
//! states are final; no procedure may revert them. The hold owns a set
//! of [`HoldNight`] rows, one per reserved night, created atomically
//! with the hold and never mutated afterward. Those rows are the
//! deterministic iteration set for every release and convert operation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{HoldId, PropertyId, RoomTypeId};
use crate::stay::StayDates;

/// Error returned when a hold field fails validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// A description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation error for '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Lifecycle state of a hold.
///
/// The only legal transitions are `Active` to one of the three terminal
/// states. Attempting any other transition is rejected by
/// [`HoldStatus::can_transition_to`], and the engine's procedures treat
/// a transition attempt on a non-active hold as a no-op success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldStatus {
    /// The hold currently claims inventory.
    Active,
    /// The hold lapsed before payment arrived; inventory was released.
    Expired,
    /// The hold was cancelled by the guest or an operator.
    Cancelled,
    /// The hold was converted into a confirmed reservation.
    Converted,
}

impl HoldStatus {
    /// Returns true for the three final states.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }

    /// Returns whether a transition from `self` to `target` is legal.
    ///
    /// # Examples
    ///
    /// ```
    /// use innkeep::HoldStatus;
    ///
    /// assert!(HoldStatus::Active.can_transition_to(HoldStatus::Expired));
    /// assert!(!HoldStatus::Expired.can_transition_to(HoldStatus::Converted));
    /// assert!(!HoldStatus::Active.can_transition_to(HoldStatus::Active));
    /// ```
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(self, Self::Active) && target.is_terminal()
    }

    /// Returns the column encoding of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
            Self::Converted => "converted",
        }
    }

    /// Parses the column encoding back into a status.
    ///
    /// # Errors
    ///
    /// Returns the unrecognized input. A failure here while reading a
    /// stored row means the database holds a status the engine never
    /// writes, which callers surface as corruption.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            "converted" => Ok(Self::Converted),
            other => Err(other.to_string()),
        }
    }
}

impl std::fmt::Display for HoldStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reserved night of a hold: `qty` units of a room type on a date.
///
/// Night rows are immutable once written. Every procedure that touches
/// them iterates in ascending `(room_type_id, date)` order, see
/// [`sort_nights`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldNight {
    /// The room type claimed for this night.
    pub room_type_id: RoomTypeId,
    /// The occupied date.
    pub date: NaiveDate,
    /// Number of units claimed. Always at least 1.
    pub qty: u32,
}

impl HoldNight {
    /// Creates a night claim.
    ///
    /// # Errors
    ///
    /// Returns an error if `qty` is zero.
    pub fn new(room_type_id: RoomTypeId, date: NaiveDate, qty: u32) -> Result<Self, ValidationError> {
        if qty == 0 {
            return Err(ValidationError {
                field: "qty".into(),
                message: "night quantity must be at least 1".into(),
            });
        }
        Ok(Self {
            room_type_id,
            date,
            qty,
        })
    }
}

/// Sorts nights into the global lock-acquisition order.
///
/// Every transaction that mutates inventory for more than one night
/// must walk the nights in ascending `(room_type_id, date)` order, so
/// that any two transactions touching overlapping nights acquire their
/// guarded writes in the same sequence and no lock cycle can form.
/// This is a sort step immediately before the mutation loop, never an
/// assumption about insertion order.
pub fn sort_nights(nights: &mut [HoldNight]) {
    nights.sort_by_key(|n| (n.room_type_id, n.date));
}

/// A hold row as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hold {
    /// The hold's identifier.
    pub id: HoldId,
    /// The owning property.
    pub property_id: PropertyId,
    /// The conversation this hold was created from.
    pub conversation_id: String,
    /// Opaque reference to the frozen quote option the guest accepted.
    pub quote_option_id: String,
    /// The stay window.
    pub stay: StayDates,
    /// Total amount in minor currency units.
    pub total_amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Current lifecycle state.
    pub status: HoldStatus,
    /// When the hold's claim lapses.
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A hold about to be created, before the database assigns its id.
///
/// Built through [`NewHold::builder`]; construction validates the
/// money fields and identifier strings.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use innkeep::{NewHold, PropertyId, StayDates};
///
/// let stay = StayDates::new(
///     NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
/// ).unwrap();
///
/// let hold = NewHold::builder(PropertyId::new(1), stay)
///     .conversation_id("conv-81")
///     .quote_option_id("qo-2")
///     .total_amount(18_000)
///     .currency("EUR")
///     .build()
///     .unwrap();
///
/// assert_eq!(hold.total_amount, 18_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHold {
    /// The owning property.
    pub property_id: PropertyId,
    /// The conversation this hold was created from.
    pub conversation_id: String,
    /// Opaque reference to the frozen quote option.
    pub quote_option_id: String,
    /// The stay window.
    pub stay: StayDates,
    /// Total amount in minor currency units.
    pub total_amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
}

impl NewHold {
    /// Creates a builder for a new hold.
    #[must_use]
    pub fn builder(property_id: PropertyId, stay: StayDates) -> NewHoldBuilder {
        NewHoldBuilder {
            property_id,
            stay,
            conversation_id: None,
            quote_option_id: None,
            total_amount: 0,
            currency: None,
        }
    }
}

/// Builder for [`NewHold`].
#[derive(Debug, Clone)]
pub struct NewHoldBuilder {
    property_id: PropertyId,
    stay: StayDates,
    conversation_id: Option<String>,
    quote_option_id: Option<String>,
    total_amount: i64,
    currency: Option<String>,
}

impl NewHoldBuilder {
    /// Sets the conversation identifier.
    #[must_use]
    pub fn conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    /// Sets the frozen quote option reference.
    #[must_use]
    pub fn quote_option_id(mut self, id: impl Into<String>) -> Self {
        self.quote_option_id = Some(id.into());
        self
    }

    /// Sets the total amount in minor currency units.
    #[must_use]
    pub const fn total_amount(mut self, amount: i64) -> Self {
        self.total_amount = amount;
        self
    }

    /// Sets the ISO 4217 currency code.
    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Validates and builds the hold.
    ///
    /// # Errors
    ///
    /// Returns an error if the conversation or quote option id is
    /// missing or blank, the amount is negative, or the currency is not
    /// a three-letter uppercase code.
    pub fn build(self) -> Result<NewHold, ValidationError> {
        let conversation_id = require_non_blank("conversation_id", self.conversation_id)?;
        let quote_option_id = require_non_blank("quote_option_id", self.quote_option_id)?;

        if self.total_amount < 0 {
            return Err(ValidationError {
                field: "total_amount".into(),
                message: "amount must not be negative".into(),
            });
        }

        let currency = require_non_blank("currency", self.currency)?;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError {
                field: "currency".into(),
                message: format!("'{currency}' is not a three-letter ISO 4217 code"),
            });
        }

        Ok(NewHold {
            property_id: self.property_id,
            conversation_id,
            quote_option_id,
            stay: self.stay,
            total_amount: self.total_amount,
            currency,
        })
    }
}

fn require_non_blank(field: &str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ValidationError {
            field: field.into(),
            message: "must be present and non-blank".into(),
        }),
    }
}
