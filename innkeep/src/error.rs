//! Error types for the innkeep library.
//!
//! This module provides the error hierarchy for all operations in the
//! innkeep engine, using `thiserror` for ergonomic error handling.
//!
//! Note that "no availability" and "already processed" are *not* errors:
//! they are normal outcomes of the engine's procedures and are reported
//! through the outcome enums in [`crate::operations`]. The variants here
//! cover genuine failures: bad input, broken storage, violated invariants.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with an innkeep error.
///
/// # Examples
///
/// ```
/// use innkeep::{Error, Result};
///
/// fn example_operation() -> Result<u32> {
///     Ok(42)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the innkeep library.
#[derive(Debug, Error)]
pub enum Error {
    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A configuration error occurred.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialization error occurred while encoding or decoding a
    /// stored response or event payload.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// An invalid stay window was specified.
    #[error("invalid stay {checkin}..{checkout}: {reason}")]
    InvalidStay {
        /// The requested check-in date.
        checkin: chrono::NaiveDate,
        /// The requested check-out date.
        checkout: chrono::NaiveDate,
        /// The reason the stay is invalid.
        reason: String,
    },

    /// The requested resource was not found.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// The acting party is not allowed to perform the operation.
    #[error("unauthorized: {details}")]
    Unauthorized {
        /// Details about the rejected action.
        details: String,
    },

    /// A guarded ledger mutation failed after its preconditions were
    /// already validated as satisfiable.
    ///
    /// This indicates ledger corruption or a violated invariant
    /// elsewhere, never a normal race. The owning transaction is rolled
    /// back and the error must be surfaced loudly, not retried.
    #[error("integrity fault: {details}")]
    IntegrityFault {
        /// Details about the violated invariant.
        details: String,
    },

    /// A database lock timeout occurred.
    #[error("database lock timeout after {seconds}s")]
    LockTimeout {
        /// The number of seconds waited before timing out.
        seconds: u64,
    },

    /// The data directory was not found and auto-initialization is disabled.
    #[error("data directory not found: {}", path.display())]
    DataDirectoryNotFound {
        /// The expected path to the data directory.
        path: PathBuf,
    },

    /// Database corruption was detected.
    #[error("database corruption detected: {details}")]
    DatabaseCorruption {
        /// Details about the corruption.
        details: String,
    },

    /// An unsupported schema version was encountered.
    #[error("unsupported schema version: expected {expected}, found {found}")]
    UnsupportedSchemaVersion {
        /// The expected schema version.
        expected: i32,
        /// The schema version found in the database.
        found: i32,
    },
}

impl From<crate::stay::InvalidStayError> for Error {
    fn from(err: crate::stay::InvalidStayError) -> Self {
        Self::InvalidStay {
            checkin: err.checkin,
            checkout: err.checkout,
            reason: err.reason,
        }
    }
}

impl From<crate::hold::ValidationError> for Error {
    fn from(err: crate::hold::ValidationError) -> Self {
        Self::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl Error {
    /// Check if the error indicates a missing resource.
    ///
    /// # Examples
    ///
    /// ```
    /// use innkeep::Error;
    ///
    /// let err = Error::NotFound { resource: "hold 17".to_string() };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if the error is an integrity fault that must escalate.
    ///
    /// # Examples
    ///
    /// ```
    /// use innkeep::Error;
    ///
    /// let err = Error::IntegrityFault { details: "held went negative".to_string() };
    /// assert!(err.is_integrity_fault());
    /// ```
    #[must_use]
    pub fn is_integrity_fault(&self) -> bool {
        matches!(self, Self::IntegrityFault { .. })
    }
}
