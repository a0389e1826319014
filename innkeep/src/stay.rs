//! Stay window types.
//!
//! A stay is a half-open date interval `[checkin, checkout)`: the guest
//! occupies one night per date from check-in up to but excluding
//! check-out. All inventory accounting iterates these nights.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Upper bound on stay length, in nights.
///
/// Guards against runaway night loops from malformed input; real stays
/// in this system are days to weeks.
pub const MAX_STAY_NIGHTS: u32 = 90;

/// Error returned when a stay window is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStayError {
    /// The requested check-in date.
    pub checkin: NaiveDate,
    /// The requested check-out date.
    pub checkout: NaiveDate,
    /// The reason the stay is invalid.
    pub reason: String,
}

impl std::fmt::Display for InvalidStayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid stay {}..{}: {}",
            self.checkin, self.checkout, self.reason
        )
    }
}

impl std::error::Error for InvalidStayError {}

/// A validated stay window.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use innkeep::StayDates;
///
/// let checkin = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
/// let checkout = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
/// let stay = StayDates::new(checkin, checkout).unwrap();
///
/// assert_eq!(stay.night_count(), 3);
/// assert_eq!(stay.nights().next(), Some(checkin));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StayDates {
    checkin: NaiveDate,
    checkout: NaiveDate,
}

impl StayDates {
    /// Creates a validated stay window.
    ///
    /// # Errors
    ///
    /// Returns an error if checkout is not strictly after checkin, or if
    /// the stay exceeds [`MAX_STAY_NIGHTS`].
    pub fn new(checkin: NaiveDate, checkout: NaiveDate) -> Result<Self, InvalidStayError> {
        if checkout <= checkin {
            return Err(InvalidStayError {
                checkin,
                checkout,
                reason: "checkout must be strictly after checkin".into(),
            });
        }
        let nights = (checkout - checkin).num_days();
        if nights > i64::from(MAX_STAY_NIGHTS) {
            return Err(InvalidStayError {
                checkin,
                checkout,
                reason: format!("stay of {nights} nights exceeds maximum of {MAX_STAY_NIGHTS}"),
            });
        }
        Ok(Self { checkin, checkout })
    }

    /// Returns the check-in date.
    #[must_use]
    pub const fn checkin(&self) -> NaiveDate {
        self.checkin
    }

    /// Returns the check-out date.
    #[must_use]
    pub const fn checkout(&self) -> NaiveDate {
        self.checkout
    }

    /// Returns the number of nights in the stay.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn night_count(&self) -> u32 {
        (self.checkout - self.checkin).num_days() as u32
    }

    /// Iterates the occupied nights, checkout excluded, in ascending
    /// date order.
    pub fn nights(&self) -> impl Iterator<Item = NaiveDate> {
        let checkout = self.checkout;
        self.checkin
            .iter_days()
            .take_while(move |d| *d < checkout)
    }
}

impl std::fmt::Display for StayDates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.checkin, self.checkout)
    }
}
