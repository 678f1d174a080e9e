// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Case
//!
//! An immutable input record (spec.md §3.1). The only attribute the harness
//! itself cares about is `uuid`; everything else is pipeline-defined payload,
//! represented as a `serde_json::Value` object so pipelines can shape it
//! however they need without the domain layer imposing a schema.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::{HarnessError, HarnessResult};
use crate::value_objects::case_id::CaseId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub uuid: CaseId,
    /// Pipeline-defined payload, excluding `uuid`. Always a JSON object.
    #[serde(flatten)]
    pub payload: Json,
}

impl Case {
    /// Parses a case from a raw JSON object, requiring a valid `uuid` field.
    pub fn from_json(value: Json) -> HarnessResult<Self> {
        let Json::Object(mut obj) = value else {
            return Err(HarnessError::InvalidInput(
                "case must be a JSON object".to_string(),
            ));
        };
        let uuid_value = obj.remove("uuid").ok_or_else(|| {
            HarnessError::InvalidInput("case missing 'uuid' field".to_string())
        })?;
        let uuid_str = uuid_value.as_str().ok_or_else(|| {
            HarnessError::InvalidInput("case 'uuid' field must be a string".to_string())
        })?;
        let uuid: CaseId = uuid_str.parse()?;
        Ok(Case {
            uuid,
            payload: Json::Object(obj),
        })
    }

    /// Looks up a field in the payload by dotted path (delegates to the
    /// dotted-path utility so case access and config access share one
    /// implementation).
    pub fn get(&self, dotted_path: &str) -> Option<&Json> {
        crate::services::dotted_path::get(&self.payload, dotted_path)
    }

    pub fn has_audio(&self) -> bool {
        self.payload.get("audio").is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_valid_case() {
        let value = json!({"uuid": "00000000-0000-4000-8000-000000000001", "keywords": ["a"]});
        let case = Case::from_json(value).unwrap();
        assert_eq!(case.get("keywords"), Some(&json!(["a"])));
    }

    #[test]
    fn rejects_missing_uuid() {
        let value = json!({"keywords": ["a"]});
        assert!(Case::from_json(value).is_err());
    }
}
