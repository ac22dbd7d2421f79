//! Entity identifiers
//!
//! Every entity gets its own UUID newtype so a student id can never be
//! passed where a fee record id is expected. Ids are rendered with a short
//! prefix (`STU-…`, `RCPT-…`) in logs and serialize as bare UUIDs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Text that is not a UUID, with or without the expected prefix
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{input}' is not a valid {kind} id")]
pub struct IdParseError {
    pub kind: &'static str,
    pub input: String,
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident => $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Random (v4) id
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Time-ordered (v7) id, used for rows that are listed by creation
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            pub fn prefix() -> &'static str {
                Self::PREFIX
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", Self::PREFIX, self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bare = s
                    .strip_prefix(Self::PREFIX)
                    .and_then(|rest| rest.strip_prefix('-'))
                    .unwrap_or(s);
                Uuid::parse_str(bare).map(Self).map_err(|_| IdParseError {
                    kind: stringify!($name),
                    input: s.to_string(),
                })
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

entity_id!(
    /// An admitted student
    StudentId => "STU"
);
entity_id!(
    /// One monthly fee record
    FeeObligationId => "FEE"
);
entity_id!(
    /// A payment receipt against a monthly fee record
    FeePaymentId => "RCPT"
);
entity_id!(ClassFeeId => "CLS");
entity_id!(TransportBandId => "TRN");
entity_id!(SettingsId => "SET");
entity_id!(ExpenseId => "EXP");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_the_kind() {
        let err = "FEE-42".parse::<FeeObligationId>().unwrap_err();
        assert_eq!(err.kind, "FeeObligationId");
        assert_eq!(err.to_string(), "'FEE-42' is not a valid FeeObligationId id");
    }

    #[test]
    fn test_wrong_prefix_is_rejected() {
        let id = StudentId::new();
        let as_expense = format!("EXP-{}", id.as_uuid());
        assert!(as_expense.parse::<StudentId>().is_err());
    }
}
