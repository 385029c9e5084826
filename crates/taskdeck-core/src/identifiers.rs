//! Record identifiers and the identifier generator.
//!
//! Identifiers have the shape `<DDMMYYYY>-<suffix>`: the local creation date
//! followed by five hexadecimal characters taken from a random v4 UUID. They
//! sort by creation date only within a day and are not guaranteed unique; the
//! store's conditional insert reports a collision as
//! [`InvalidArgument::DuplicateId`](crate::error::InvalidArgument::DuplicateId)
//! and callers regenerate.
//!
//! # Examples
//!
//! ```rust
//! use chrono::NaiveDate;
//! use taskdeck_core::identifiers::{TaskId, generate_id_at};
//!
//! let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
//! let id = generate_id_at(date);
//! assert!(id.starts_with("07032025-"));
//! assert_eq!(id.len(), 14);
//!
//! let task_id = TaskId::parse(&id).unwrap();
//! assert_eq!(task_id.as_str(), id);
//! assert!(TaskId::parse("not valid").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::validation::{IdentifierRules, ValidationError};

/// Number of random characters appended to the date.
pub const SUFFIX_LEN: usize = 5;

/// Generate an identifier for a record created today (local calendar).
pub fn generate_id() -> String {
    generate_id_at(Local::now().date_naive())
}

/// Generate an identifier for a record created on `date`.
pub fn generate_id_at(date: NaiveDate) -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", date.format("%d%m%Y"), &uuid[..SUFFIX_LEN])
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse and validate an identifier
            pub fn parse(id: impl AsRef<str>) -> Result<Self, ValidationError> {
                IdentifierRules::RECORD_ID.validate(id.as_ref()).map(Self)
            }

            /// Generate a fresh identifier dated today
            pub fn generate() -> Self {
                Self(generate_id())
            }

            /// Get the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert into the underlying string
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }
    };
}

record_id!(
    /// Identifier of a task record
    TaskId
);

record_id!(
    /// Identifier of a category record
    CategoryId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_shape() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let id = generate_id_at(date);

        let (prefix, suffix) = id.split_once('-').unwrap();
        assert_eq!(prefix, "31122024");
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_ids_are_valid_record_ids() {
        for _ in 0..50 {
            let id = TaskId::generate();
            assert!(TaskId::parse(id.as_str()).is_ok());
            assert!(CategoryId::parse(id.as_str()).is_ok());
        }
    }

    #[test]
    fn test_generated_ids_differ() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let ids: std::collections::HashSet<_> = (0..20).map(|_| generate_id_at(date)).collect();
        // 16^5 possible suffixes; twenty draws colliding would indicate a broken source.
        assert!(ids.len() > 1);
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let id = TaskId::parse("05052025-0a1b2").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"05052025-0a1b2\"");

        let back: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let bad: Result<TaskId, _> = serde_json::from_str("\"has space\"");
        assert!(bad.is_err());
    }
}
