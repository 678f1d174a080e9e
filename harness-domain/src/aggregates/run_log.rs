// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Run Log Aggregate
//!
//! The append-once, self-describing record of one `run`/`rerun` invocation
//! (spec.md §3.7): a run id, run-level metadata (pipeline name, resolved
//! config, command line, git sha/edits, timing), and one `RunResult` per
//! case. `RunLog` is the unit of persistence for `--save`/`history`/
//! `compare` and is otherwise opaque JSON to everything except the harness.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::entities::run_result::RunResult;
use crate::error::HarnessError;
use crate::value_objects::run_id::RunId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub pipeline: String,
    pub config: Json,
    pub command_line: Vec<String>,
    pub git_sha: Option<String>,
    pub git_diff_uncommitted: Option<bool>,
    pub start: String,
    pub end: Option<String>,
    pub elapsed: Option<String>,
    /// Present only when `process_all_cases` itself raised (spec.md §4.D
    /// CancelledBatch), carrying the reason as a human-readable message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
    pub uuid: RunId,
    pub metadata: RunMetadata,
    pub results: Vec<RunResult>,
}

impl RunLog {
    pub fn new(uuid: RunId, metadata: RunMetadata) -> Self {
        RunLog {
            uuid,
            metadata,
            results: Vec::new(),
        }
    }

    /// Appends one case's result. Run logs are append-only during a run; the
    /// director is the sole writer, one call per completed case.
    pub fn push(&mut self, result: RunResult) {
        self.results.push(result);
    }

    pub fn pass_count(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded).count()
    }

    pub fn fail_count(&self) -> usize {
        self.results.len() - self.pass_count()
    }

    /// Resolves a case by its minimal unique id prefix (spec.md §6.1
    /// `add-ids`/`rerun --id`), delegating to the short-id service so every
    /// command that accepts an id prefix shares one lookup rule.
    pub fn find_by_id_prefix(&self, prefix: &str) -> Result<&RunResult, HarnessError> {
        let ids: Vec<String> = self
            .results
            .iter()
            .map(|r| r.case.uuid.to_string())
            .collect();
        let full = crate::services::short_id::resolve_prefix(&ids, prefix)?;
        self.results
            .iter()
            .find(|r| r.case.uuid.to_string() == full)
            .ok_or_else(|| HarnessError::NotFound(format!("no case with id '{prefix}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::case::Case;
    use crate::entities::run_result::RunMetadata as CaseRunMetadata;
    use serde_json::json;

    fn sample_result(uuid: &str) -> RunResult {
        let case = Case::from_json(json!({"uuid": uuid})).unwrap();
        RunResult::success(
            case,
            json!({}),
            CaseRunMetadata {
                start: "2026-01-01T00:00:00Z".to_string(),
                end: Some("2026-01-01T00:00:01Z".to_string()),
                elapsed: Some("0:00:01".to_string()),
            },
        )
    }

    #[test]
    fn pass_and_fail_counts_reflect_pushed_results() {
        let mut log = RunLog::new(
            RunId::new_v4(),
            RunMetadata {
                pipeline: "demo".to_string(),
                config: json!({}),
                command_line: vec!["run".to_string()],
                git_sha: None,
                git_diff_uncommitted: None,
                start: "2026-01-01T00:00:00Z".to_string(),
                end: None,
                elapsed: None,
                exception: None,
            },
        );
        log.push(sample_result("00000000-0000-4000-8000-000000000001"));
        assert_eq!(log.pass_count(), 1);
        assert_eq!(log.fail_count(), 0);
    }
}
