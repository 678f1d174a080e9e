// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Specification Contract
//!
//! A `PipelineSpec` is the unit of work a user registers with the harness
//! (spec.md §3.3, §6.6): a name, a default configuration tree, a DAG
//! factory, and the reporting hooks (`expected`, `passed_predicate`,
//! `summarizer`, `formatter`, column mappings) that let generic `summarize`/
//! `compare`/`format` commands render pipeline-specific results without the
//! harness core knowing anything about a particular pipeline's domain.
//!
//! Grounded on the harness's original `Pipeline2` base class; the Rust
//! translation turns its duck-typed optional methods into trait methods
//! with default implementations, matching the `StageExecutor`/`Stage`
//! trait-object pattern the rest of this workspace uses at I/O ports.

use std::collections::BTreeMap;

use serde_json::Value as Json;

use crate::aggregates::dag::Dag;
use crate::entities::case::Case;
use crate::entities::run_result::RunResult;
use crate::error::HarnessResult;
use crate::value_objects::config_value::ConfigTree;

/// A single row of a `summarize` table: pipeline-chosen column values keyed
/// by column name, in whatever order the pipeline wants them displayed.
pub type SummaryRow = BTreeMap<String, Json>;

/// Conventional field names a pipeline assigns to the generic "initial
/// input" / "gold answer" / "model output" / "user turn" / "turn list"
/// roles (spec.md §3.3 `mappings`), used by multi-turn assembly
/// (`pipeline_assembly::assemble`) and by generic reporting. A pipeline with
/// no multi-turn cases leaves every field `None` and none of this applies.
#[derive(Debug, Clone, Default)]
pub struct Mappings {
    pub initial: Option<String>,
    pub expected: Option<String>,
    pub observed: Option<String>,
    pub user: Option<String>,
    /// The case field holding the turn list. Its presence is what tells
    /// `pipeline_assembly::assemble` to wrap the per-turn DAG in the
    /// synthetic `turns` node (spec.md §4.D).
    pub turns: Option<String>,
}

impl Mappings {
    pub fn initial_field(&self) -> &str {
        self.initial.as_deref().unwrap_or("initial")
    }

    pub fn expected_field(&self) -> &str {
        self.expected.as_deref().unwrap_or("expected")
    }

    pub fn observed_field(&self) -> &str {
        self.observed.as_deref().unwrap_or("observed")
    }

    pub fn turns_field(&self) -> &str {
        self.turns.as_deref().unwrap_or("turns")
    }
}

pub trait PipelineSpec: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// The pipeline's default configuration tree, with `Required` leaves
    /// marking values the caller must supply via `--override`/`--config`
    /// before a run can start.
    fn default_configuration(&self) -> ConfigTree;

    /// Builds this run's DAG from the merged configuration. Pure and
    /// synchronous — the returned `Dag` carries no execution state.
    fn create_dag(&self, configuration: &ConfigTree) -> HarnessResult<Dag>;

    /// Extracts the case's expected/gold output, if the case has one
    /// (spec.md §3.1). Used by `passed_predicate` and by `format` to show
    /// expected-vs-actual.
    fn expected(&self, case: &Case) -> Option<Json> {
        case.get("expected").cloned()
    }

    /// Whether a completed run counts as a pass. Default: a run with no
    /// exception and, if the case declares an `expected` value, an `actual`
    /// stage output equal to it.
    fn passed(&self, result: &RunResult) -> bool {
        result.succeeded
    }

    /// One `summarize` table row per case, or `None` to omit the case.
    fn summarize_row(&self, result: &RunResult) -> Option<SummaryRow> {
        let _ = result;
        None
    }

    /// Column display order for `summarize`'s table. Empty means "use
    /// whatever keys `summarize_row` returns, alphabetically".
    fn summary_columns(&self) -> Vec<String> {
        Vec::new()
    }

    /// Renders one case's full detail for `format` (spec.md §6.1 `format`).
    /// Default falls back to pretty-printed JSON of the case and its stage
    /// outputs.
    fn format_case(&self, result: &RunResult) -> String {
        format!(
            "{}\n{}",
            serde_json::to_string_pretty(&result.case).unwrap_or_default(),
            serde_json::to_string_pretty(&result.stages).unwrap_or_default()
        )
    }

    /// Field-name conventions for multi-turn cases. Default: no `turns`
    /// field, so `pipeline_assembly::assemble` runs the single-turn DAG
    /// unwrapped.
    fn mappings(&self) -> Mappings {
        Mappings::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::run_result::RunMetadata;
    use serde_json::json;

    struct Noop;

    impl PipelineSpec for Noop {
        fn name(&self) -> &str {
            "noop"
        }

        fn description(&self) -> &str {
            "does nothing"
        }

        fn default_configuration(&self) -> ConfigTree {
            ConfigTree::new()
        }

        fn create_dag(&self, _configuration: &ConfigTree) -> HarnessResult<Dag> {
            use crate::aggregates::dag::DagNodeSpec;
            Dag::build(vec![DagNodeSpec::new("only", vec![]).unwrap()])
        }
    }

    #[test]
    fn default_passed_predicate_checks_success_flag() {
        let case = Case::from_json(json!({"uuid": "00000000-0000-4000-8000-000000000001"})).unwrap();
        let result = RunResult::success(
            case,
            json!({}),
            RunMetadata {
                start: "2026-01-01T00:00:00Z".to_string(),
                end: None,
                elapsed: None,
            },
        );
        assert!(Noop.passed(&result));
    }

    #[test]
    fn default_dag_factory_builds() {
        assert!(Noop.create_dag(&ConfigTree::new()).is_ok());
    }
}
