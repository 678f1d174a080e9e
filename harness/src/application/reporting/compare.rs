// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Compare
//!
//! Compares two run logs case-by-case by uuid (spec.md §4.F `compare`):
//! cases only in the first run, only in the second, and in both, the last
//! group ordered so pass/fail transitions are easy to spot. Grounded on the
//! harness's original `compare.py`: `just_a`/`just_b`/`both` set membership,
//! and a sort key of `order_b * 4 + order_a` where `order_*` encodes
//! fail-before-pass — regressions and fixes sort to the ends, unchanged
//! cases cluster in the middle. Two callers-must-check-first preconditions
//! (§4.F): comparing a run against itself degenerates to `Summarize`, and
//! comparing runs of two different pipelines is refused outright — both are
//! handled by `App::compare` before this module is reached, since the
//! degenerate case needs a `PipelineSpec` this module has no reason to know
//! about.

use std::collections::BTreeMap;

use harness_domain::aggregates::run_log::RunLog;
use harness_domain::error::HarnessError;

/// Outcome classification for one case present in both runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Failed in both runs.
    StillFailing,
    /// Passed in the first run, failed in the second.
    Regressed,
    /// Failed in the first run, passed in the second.
    Fixed,
    /// Passed in both runs.
    StillPassing,
}

impl Transition {
    fn of(passed_a: bool, passed_b: bool) -> Self {
        match (passed_a, passed_b) {
            (false, false) => Transition::StillFailing,
            (true, false) => Transition::Regressed,
            (false, true) => Transition::Fixed,
            (true, true) => Transition::StillPassing,
        }
    }

    /// Sort key mirroring `order_b * 4 + order_a` from the original
    /// implementation: regressions first, then still-failing, then fixed,
    /// then still-passing last.
    fn sort_key(self) -> u8 {
        match self {
            Transition::Regressed => 0,
            Transition::StillFailing => 1,
            Transition::Fixed => 2,
            Transition::StillPassing => 3,
        }
    }
}

#[derive(Debug)]
pub struct CompareReport {
    pub only_in_a: Vec<String>,
    pub only_in_b: Vec<String>,
    pub both: Vec<(String, Transition)>,
    pub pass_rate_a: (usize, usize),
    pub pass_rate_b: (usize, usize),
}

/// Compares two runs of the *same* pipeline. Fails with `InvalidInput` if
/// `run_a`/`run_b` were produced by different pipelines (spec.md §4.F "If
/// pipeline names differ, refuse with a clear message"); callers are
/// responsible for the sibling "same uuid degenerates to Summarize" rule,
/// which needs a `PipelineSpec` this function has no reason to depend on.
pub fn compare(run_a: &RunLog, run_b: &RunLog) -> Result<CompareReport, HarnessError> {
    if run_a.metadata.pipeline != run_b.metadata.pipeline {
        return Err(HarnessError::InvalidInput(format!(
            "cannot compare runs of different pipelines: '{}' vs '{}'",
            run_a.metadata.pipeline, run_b.metadata.pipeline
        )));
    }

    let a: BTreeMap<String, bool> = run_a
        .results
        .iter()
        .map(|r| (r.case.uuid.to_string(), r.succeeded))
        .collect();
    let b: BTreeMap<String, bool> = run_b
        .results
        .iter()
        .map(|r| (r.case.uuid.to_string(), r.succeeded))
        .collect();

    let only_in_a: Vec<String> = a.keys().filter(|id| !b.contains_key(*id)).cloned().collect();
    let only_in_b: Vec<String> = b.keys().filter(|id| !a.contains_key(*id)).cloned().collect();

    let mut both: Vec<(String, Transition)> = a
        .iter()
        .filter_map(|(id, &passed_a)| {
            b.get(id).map(|&passed_b| (id.clone(), Transition::of(passed_a, passed_b)))
        })
        .collect();
    both.sort_by_key(|(id, transition)| (transition.sort_key(), id.clone()));

    Ok(CompareReport {
        only_in_a,
        only_in_b,
        both,
        pass_rate_a: (run_a.pass_count(), run_a.results.len()),
        pass_rate_b: (run_b.pass_count(), run_b.results.len()),
    })
}

impl CompareReport {
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.only_in_a.is_empty() {
            out.push_str(&format!("Only in first run: {}\n", self.only_in_a.join(", ")));
        }
        if !self.only_in_b.is_empty() {
            out.push_str(&format!("Only in second run: {}\n", self.only_in_b.join(", ")));
        }
        for (id, transition) in &self.both {
            out.push_str(&format!("{id}: {transition:?}\n"));
        }
        out.push_str(&format!(
            "\nFirst run: {}/{} passed. Second run: {}/{} passed.\n",
            self.pass_rate_a.0, self.pass_rate_a.1, self.pass_rate_b.0, self.pass_rate_b.1
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_domain::aggregates::run_log::RunMetadata as RunLogMetadata;
    use harness_domain::entities::case::Case;
    use harness_domain::entities::run_result::{RunMetadata, RunResult};
    use harness_domain::value_objects::run_id::RunId;
    use serde_json::json;

    fn log_with(pass_by_uuid: &[(&str, bool)]) -> RunLog {
        log_with_pipeline("demo", pass_by_uuid)
    }

    fn log_with_pipeline(pipeline: &str, pass_by_uuid: &[(&str, bool)]) -> RunLog {
        let mut log = RunLog::new(
            RunId::new_v4(),
            RunLogMetadata {
                pipeline: pipeline.to_string(),
                config: json!({}),
                command_line: vec![],
                git_sha: None,
                git_diff_uncommitted: None,
                start: "2026-01-01T00:00:00Z".to_string(),
                end: None,
                elapsed: None,
                exception: None,
            },
        );
        for (uuid, passed) in pass_by_uuid {
            let case = Case::from_json(json!({"uuid": uuid})).unwrap();
            let metadata = RunMetadata {
                start: "2026-01-01T00:00:00Z".to_string(),
                end: None,
                elapsed: None,
            };
            let result = if *passed {
                RunResult::success(case, json!({}), metadata)
            } else {
                RunResult::failure(
                    case,
                    json!({}),
                    harness_domain::error::ExceptionRecord::new(
                        &harness_domain::error::HarnessError::StageFailure("x".to_string()),
                        &[],
                    ),
                    metadata,
                )
            };
            log.push(result);
        }
        log
    }

    #[test]
    fn classifies_regressions_and_fixes() {
        let a = log_with(&[
            ("00000000-0000-4000-8000-000000000001", true),
            ("00000000-0000-4000-8000-000000000002", false),
        ]);
        let b = log_with(&[
            ("00000000-0000-4000-8000-000000000001", false),
            ("00000000-0000-4000-8000-000000000002", true),
        ]);
        let report = compare(&a, &b).unwrap();
        let transitions: Vec<Transition> = report.both.iter().map(|(_, t)| *t).collect();
        assert_eq!(transitions, vec![Transition::Regressed, Transition::Fixed]);
    }

    #[test]
    fn tracks_cases_unique_to_each_run() {
        let a = log_with(&[("00000000-0000-4000-8000-000000000001", true)]);
        let b = log_with(&[("00000000-0000-4000-8000-000000000002", true)]);
        let report = compare(&a, &b).unwrap();
        assert_eq!(report.only_in_a, vec!["00000000-0000-4000-8000-000000000001"]);
        assert_eq!(report.only_in_b, vec!["00000000-0000-4000-8000-000000000002"]);
    }

    #[test]
    fn refuses_to_compare_different_pipelines() {
        let a = log_with_pipeline("demo", &[("00000000-0000-4000-8000-000000000001", true)]);
        let b = log_with_pipeline("other", &[("00000000-0000-4000-8000-000000000001", true)]);
        let err = compare(&a, &b).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidInput(_)));
        assert!(err.to_string().contains("demo"));
        assert!(err.to_string().contains("other"));
    }
}
