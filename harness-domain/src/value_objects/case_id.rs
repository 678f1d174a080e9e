// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Case Identifier Value Object
//!
//! A `Case` is required to carry a canonical UUID v4 string, unique within a
//! suite. `CaseId` wraps that string so parsing/validation happens once, at
//! the boundary, rather than being re-checked ad hoc by every consumer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HarnessError;

/// A validated case identifier. Always a canonical (hyphenated, lowercase)
/// UUID v4 string.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaseId(Uuid);

impl CaseId {
    pub fn new_v4() -> Self {
        CaseId(Uuid::new_v4())
    }

    pub fn as_str(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl FromStr for CaseId {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = Uuid::parse_str(s)
            .map_err(|_| HarnessError::InvalidInput(format!("'{s}' is not a valid UUID")))?;
        if parsed.get_version_num() != 4 {
            return Err(HarnessError::InvalidInput(format!(
                "'{s}' is not a UUID v4"
            )));
        }
        Ok(CaseId(parsed))
    }
}

impl TryFrom<String> for CaseId {
    type Error = HarnessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CaseId> for String {
    fn from(id: CaseId) -> Self {
        id.as_str()
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_uuid_strings() {
        assert!("not-a-uuid".parse::<CaseId>().is_err());
    }

    #[test]
    fn rejects_non_v4_uuid() {
        // A well-formed UUID v1 string (version nibble = 1).
        let v1 = "6fa459ea-ee8a-1c1c-9ec9-bd21a8988f23";
        assert!(v1.parse::<CaseId>().is_err());
    }

    #[test]
    fn round_trips_through_string() {
        let id = CaseId::new_v4();
        let s = id.as_str();
        let back: CaseId = s.parse().unwrap();
        assert_eq!(id, back);
    }
}
