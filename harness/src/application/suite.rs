// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Suite Loading
//!
//! Reads a JSON array of cases from disk (spec.md §6.1 `run`/`add-ids`).
//! [`load_cases`] requires every case to already carry a valid `uuid`;
//! [`add_ids`] is the looser pass that assigns a fresh one to any case
//! missing it, for `add-ids` to run before `load_cases` ever sees the file.

use std::path::Path;

use harness_domain::entities::case::Case;
use harness_domain::error::{HarnessError, HarnessResult};
use harness_domain::value_objects::case_id::CaseId;
use serde_json::Value as Json;

pub fn load_cases(path: &Path) -> HarnessResult<Vec<Case>> {
    let raw = std::fs::read_to_string(path)?;
    let values: Vec<Json> = serde_json::from_str(&raw)?;
    let mut cases = Vec::with_capacity(values.len());
    let mut seen = std::collections::HashSet::new();
    for value in values {
        let case = Case::from_json(value)?;
        if !seen.insert(case.uuid.clone()) {
            return Err(HarnessError::InvalidInput(format!("duplicate case uuid '{}' in suite", case.uuid)));
        }
        cases.push(case);
    }
    Ok(cases)
}

/// Assigns a fresh v4 uuid to every case object in `path` missing a valid
/// one, returning the rewritten JSON text. Writes it back to `path` when
/// `in_place` is set; otherwise the caller is expected to print it.
pub fn add_ids(path: &Path, in_place: bool) -> HarnessResult<String> {
    let raw = std::fs::read_to_string(path)?;
    let mut values: Vec<Json> = serde_json::from_str(&raw)?;
    for value in &mut values {
        let Json::Object(obj) = value else {
            return Err(HarnessError::InvalidInput("every case must be a JSON object".to_string()));
        };
        let needs_id = match obj.get("uuid") {
            Some(Json::String(s)) => s.parse::<CaseId>().is_err(),
            _ => true,
        };
        if needs_id {
            obj.insert("uuid".to_string(), Json::String(CaseId::new_v4().as_str()));
        }
    }
    let rendered = serde_json::to_string_pretty(&values)?;
    if in_place {
        std::fs::write(path, &rendered)?;
    }
    Ok(rendered)
}
