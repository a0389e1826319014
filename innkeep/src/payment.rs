//! Payment types.
//!
//! A payment row tracks an external payment object, created independently
//! of the hold it pays for and linked by `hold_id`. The payment machine
//! synchronizes with the hold machine only at conversion time. The
//! `needs_manual` state is the safety valve for money that arrives after
//! the hold's claim has already lapsed.

use serde::{Deserialize, Serialize};

use crate::hold::ValidationError;
use crate::ids::{HoldId, PropertyId};

/// Lifecycle state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// The payment intent exists but nothing has happened yet.
    Created,
    /// The provider reports the payment as in flight.
    Pending,
    /// The provider confirmed the payment.
    Succeeded,
    /// The provider reported a failure.
    Failed,
    /// The payment succeeded after its hold left `active`; an operator
    /// must resolve it (refund or manual booking).
    NeedsManual,
}

impl PaymentStatus {
    /// Returns the column encoding of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::NeedsManual => "needs_manual",
        }
    }

    /// Parses the column encoding back into a status.
    ///
    /// # Errors
    ///
    /// Returns the unrecognized input.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "created" => Ok(Self::Created),
            "pending" => Ok(Self::Pending),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "needs_manual" => Ok(Self::NeedsManual),
            other => Err(other.to_string()),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment row as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    /// The owning property.
    pub property_id: PropertyId,
    /// The hold this payment pays for.
    pub hold_id: HoldId,
    /// The payment provider, e.g. `"stripe"`.
    pub provider: String,
    /// The provider's identifier for the payment object. Unique per
    /// provider per property.
    pub provider_object_id: String,
    /// Current lifecycle state.
    pub status: PaymentStatus,
    /// Amount in minor currency units.
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
}

/// The payment facts carried by a payment-succeeded event.
///
/// This is the input to the convert procedure: everything the engine
/// needs to upsert the payment row and dedupe the webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentContext {
    /// The payment provider.
    pub provider: String,
    /// The provider's identifier for the payment object.
    pub provider_object_id: String,
    /// The provider's identifier for this webhook event, used as the
    /// dedupe key for at-least-once delivery.
    pub event_id: String,
    /// Amount in minor currency units.
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
}

impl PaymentContext {
    /// Validates the context's identifier fields.
    ///
    /// # Errors
    ///
    /// Returns an error if any identifier is blank or the amount is
    /// negative.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("provider", &self.provider),
            ("provider_object_id", &self.provider_object_id),
            ("event_id", &self.event_id),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError {
                    field: field.into(),
                    message: "must be present and non-blank".into(),
                });
            }
        }
        if self.amount < 0 {
            return Err(ValidationError {
                field: "amount".into(),
                message: "amount must not be negative".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_encoding_roundtrip() {
        for status in [
            PaymentStatus::Created,
            PaymentStatus::Pending,
            PaymentStatus::Succeeded,
            PaymentStatus::Failed,
            PaymentStatus::NeedsManual,
        ] {
            assert_eq!(PaymentStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(PaymentStatus::parse("refunded").is_err());
    }

    #[test]
    fn test_context_validation() {
        let ctx = PaymentContext {
            provider: "stripe".into(),
            provider_object_id: "pi_123".into(),
            event_id: "evt_456".into(),
            amount: 18_000,
            currency: "EUR".into(),
        };
        assert!(ctx.validate().is_ok());

        let blank = PaymentContext {
            event_id: "  ".into(),
            ..ctx.clone()
        };
        assert_eq!(blank.validate().unwrap_err().field, "event_id");

        let negative = PaymentContext {
            amount: -1,
            ..ctx
        };
        assert_eq!(negative.validate().unwrap_err().field, "amount");
    }
}
