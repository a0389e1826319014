//! Strongly-typed identifiers for engine entities.
//!
//! Every entity in the engine is addressed by a 64-bit rowid wrapped in
//! a dedicated newtype, so that a hold id can never be passed where a
//! room-type id is expected. All ids serialize transparently to their
//! inner integer, both for the database and for JSON payloads.

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw rowid.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw rowid.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map(Self)
            }
        }
    };
}

define_id! {
    /// Identifier of a property, the tenant boundary for every other entity.
    PropertyId
}

define_id! {
    /// Identifier of a bookable room category within a property.
    RoomTypeId
}

define_id! {
    /// Identifier of a temporary inventory hold.
    HoldId
}

define_id! {
    /// Identifier of a terminal reservation record.
    ReservationId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        let id = HoldId::new(17);
        assert_eq!(id.value(), 17);
        assert_eq!(format!("{id}"), "17");
        assert_eq!(HoldId::from(17), id);
    }

    #[test]
    fn test_ids_are_distinct_types() {
        // Compile-time property: this would not build if PropertyId and
        // HoldId were interchangeable. Runtime assertion is incidental.
        fn takes_property(id: PropertyId) -> i64 {
            id.value()
        }
        assert_eq!(takes_property(PropertyId::new(3)), 3);
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = RoomTypeId::new(9);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "9");
        let back: RoomTypeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_ordering() {
        let a = RoomTypeId::new(1);
        let b = RoomTypeId::new(2);
        assert!(a < b);
    }
}
