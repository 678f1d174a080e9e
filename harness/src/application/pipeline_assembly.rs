// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Assembly
//!
//! Turns a registered [`PipelineSpec`] plus a user-supplied override patch
//! into an [`AssembledPipeline`] the director can run: merge the patch onto
//! the spec's defaults, fail fast on unresolved `Required` sentinels, then
//! ask the spec to build its DAG from the resolved configuration. Grounded
//! on the harness's original `Pipeline2.__init__`/`ensure_required_configs`
//! call sequence. When the spec's `mappings.turns` names a field,
//! `assemble` wraps the per-turn DAG in a synthetic single-node `turns` DAG
//! (spec.md §3.3, §4.D) rather than handing the per-turn DAG to the
//! director directly — multi-turn execution stays a wrapper around the
//! single-turn primitive, never a second code path through the engine.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as Json;

use harness_domain::aggregates::dag::{Dag, DagNodeSpec};
use harness_domain::entities::case::Case;
use harness_domain::entities::context::Context;
use harness_domain::error::{HarnessError, HarnessResult};
use harness_domain::repositories::stage::Stage;
use harness_domain::services::config_merge;
use harness_domain::services::pipeline_spec::{Mappings, PipelineSpec};
use harness_domain::value_objects::config_value::ConfigTree;
use harness_domain::value_objects::stage_name::StageName;

use crate::application::director::AssembledPipeline;
use crate::infrastructure::runtime::dag_executor;

/// Merges `patch` onto a base configuration and validates that no `Required`
/// sentinel remains unresolved (spec.md §4.A `merge(defaults, replacement?,
/// dotted_patch)`). The base is `replacement` when the caller supplies one
/// (a whole-tree config override, e.g. a saved run's own resolved config
/// fed into `rerun`), otherwise `spec`'s own defaults.
pub fn resolve_configuration(
    spec: &dyn PipelineSpec,
    replacement: Option<&ConfigTree>,
    patch: &serde_json::Map<String, serde_json::Value>,
) -> HarnessResult<ConfigTree> {
    let mut tree = replacement.cloned().unwrap_or_else(|| spec.default_configuration());
    config_merge::apply_patch(&mut tree, patch)?;
    config_merge::ensure_required_resolved(&tree)?;
    Ok(tree)
}

/// Builds a runnable [`AssembledPipeline`] from a spec, a resolved
/// configuration, and the stage implementations the harness's caller
/// registered for this pipeline (spec.md §6.6: a pipeline's DAG factory
/// names stages by `StageName`; the concrete `Stage` objects implementing
/// those names are supplied by the embedding application, e.g. a model-call
/// stage backed by a registered `ModelAdapter`).
pub fn assemble(
    spec: &dyn PipelineSpec,
    configuration: &ConfigTree,
    stages: HashMap<String, Arc<dyn Stage>>,
) -> HarnessResult<AssembledPipeline> {
    let dag = spec.create_dag(configuration)?;
    for node in dag.nodes() {
        if !stages.contains_key(node.name.as_str()) {
            return Err(HarnessError::InvalidSpec(format!(
                "DAG node '{}' has no registered stage implementation",
                node.name
            )));
        }
    }

    let mappings = spec.mappings();
    if mappings.turns.is_none() {
        return Ok(AssembledPipeline {
            dag,
            stages,
            configuration: configuration.clone(),
        });
    }

    let turns_name = StageName::new("turns")?;
    let turns_stage = TurnsStage {
        name: turns_name.clone(),
        inner_dag: dag,
        inner_stages: stages,
        mappings,
    };
    let mut wrapped_stages: HashMap<String, Arc<dyn Stage>> = HashMap::new();
    wrapped_stages.insert("turns".to_string(), Arc::new(turns_stage));
    let wrapped_dag = Dag::build(vec![DagNodeSpec::new("turns", vec![])?])?;
    Ok(AssembledPipeline {
        dag: wrapped_dag,
        stages: wrapped_stages,
        configuration: configuration.clone(),
    })
}

/// The synthetic single-node DAG wrapper for multi-turn cases (spec.md
/// §4.D). Reads the turn list from the case's mapped `turns` field and runs
/// the wrapped per-turn DAG once per turn, threading each turn's observed
/// output into the next turn's `initial` field.
struct TurnsStage {
    name: StageName,
    inner_dag: Dag,
    inner_stages: HashMap<String, Arc<dyn Stage>>,
    mappings: Mappings,
}

impl TurnsStage {
    /// Builds the per-turn `Case` the inner DAG runs against: the turn's own
    /// payload, plus the seed value recorded under the mapped `initial`
    /// field (spec.md §4.D "inject the initial field").
    fn turn_case(&self, case: &Case, turn_payload: &Json, seed: Option<Json>) -> HarnessResult<Case> {
        let mut obj = turn_payload
            .as_object()
            .cloned()
            .ok_or_else(|| HarnessError::InvalidSpec("each turn must be a JSON object".to_string()))?;
        if let Some(seed) = seed {
            obj.insert(self.mappings.initial_field().to_string(), seed);
        }
        obj.insert("uuid".to_string(), Json::String(case.uuid.to_string()));
        Case::from_json(Json::Object(obj))
    }

    fn turn_list<'a>(&self, case: &'a Case) -> HarnessResult<&'a [Json]> {
        case.get(self.mappings.turns_field())
            .and_then(Json::as_array)
            .map(|v| v.as_slice())
            .ok_or_else(|| {
                HarnessError::InvalidSpec(format!(
                    "case '{}' has no turn list at mapped field '{}'",
                    case.uuid,
                    self.mappings.turns_field()
                ))
            })
    }
}

#[async_trait]
impl Stage for TurnsStage {
    fn name(&self) -> &StageName {
        &self.name
    }

    fn inputs(&self) -> &[StageName] {
        &[]
    }

    async fn run(&self, context: &Context) -> HarnessResult<Json> {
        let turns = self.turn_list(&context.case)?;

        // A single isolated turn, seeded from the *previous turn's declared
        // expected value* rather than anything actually observed (spec.md
        // §4.D "seed single-turn runs from previous expected").
        if let Some(turn_index) = context.turn {
            let idx = usize::try_from(turn_index)
                .map_err(|_| HarnessError::InvalidInput(format!("negative turn index {turn_index}")))?;
            let turn_payload = turns
                .get(idx)
                .ok_or_else(|| HarnessError::InvalidInput(format!("turn index {idx} out of range")))?;
            let seed = if idx == 0 {
                context.case.get(self.mappings.initial_field()).cloned()
            } else {
                turns
                    .get(idx - 1)
                    .and_then(|prev| prev.get(self.mappings.expected_field()))
                    .cloned()
            };
            let turn_case = self.turn_case(&context.case, turn_payload, seed)?;
            let turn_context = Context::with_turn(turn_case, turn_index);
            let (turn_context, outcome) = dag_executor::run_dag(&self.inner_dag, &self.inner_stages, turn_context).await;
            outcome?;
            return Ok(turn_context.stages_as_json());
        }

        // The full multi-turn run: chain each turn's observed output into
        // the next turn's initial field, stopping early on failure or a
        // missing observed value (spec.md §4.D).
        let mut per_turn_results = Vec::new();
        let mut previous_observed: Option<Json> = None;
        for (idx, turn_payload) in turns.iter().enumerate() {
            let seed = if idx == 0 {
                context.case.get(self.mappings.initial_field()).cloned()
            } else {
                previous_observed.clone()
            };
            let turn_case = self.turn_case(&context.case, turn_payload, seed)?;
            let turn_context = Context::new(turn_case);
            let (turn_context, outcome) = dag_executor::run_dag(&self.inner_dag, &self.inner_stages, turn_context).await;
            if outcome.is_err() {
                break;
            }
            let observed = turn_context.stage(self.mappings.observed_field()).map(|o| o.value().clone());
            per_turn_results.push(turn_context.stages_as_json());
            match observed {
                Some(value) => previous_observed = Some(value),
                None => break,
            }
        }
        Ok(Json::Array(per_turn_results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use harness_domain::aggregates::dag::{Dag, DagNodeSpec};
    use harness_domain::entities::context::Context;
    use harness_domain::services::pipeline_spec::SummaryRow;
    use harness_domain::value_objects::config_value::ConfigNode;
    use harness_domain::value_objects::stage_name::StageName;
    use serde_json::json;

    struct Demo;
    impl PipelineSpec for Demo {
        fn name(&self) -> &str {
            "demo"
        }
        fn description(&self) -> &str {
            "demo"
        }
        fn default_configuration(&self) -> ConfigTree {
            let mut tree = ConfigTree::new();
            tree.insert("api_key".to_string(), ConfigNode::required("provider key"));
            tree
        }
        fn create_dag(&self, _configuration: &ConfigTree) -> HarnessResult<Dag> {
            Dag::build(vec![DagNodeSpec::new("only", vec![]).unwrap()])
        }
        fn summarize_row(&self, _result: &harness_domain::entities::run_result::RunResult) -> Option<SummaryRow> {
            None
        }
    }

    struct Noop(StageName);
    #[async_trait]
    impl Stage for Noop {
        fn name(&self) -> &StageName {
            &self.0
        }
        fn inputs(&self) -> &[StageName] {
            &[]
        }
        async fn run(&self, _context: &Context) -> HarnessResult<serde_json::Value> {
            Ok(json!(null))
        }
    }

    #[test]
    fn missing_required_config_is_rejected_before_assembly() {
        let spec = Demo;
        let patch = serde_json::Map::new();
        assert!(resolve_configuration(&spec, None, &patch).is_err());
    }

    #[test]
    fn assembly_fails_when_a_dag_node_has_no_stage() {
        let spec = Demo;
        let mut patch = serde_json::Map::new();
        patch.insert("api_key".to_string(), json!("sk-test"));
        let config = resolve_configuration(&spec, None, &patch).unwrap();
        let stages: HashMap<String, Arc<dyn Stage>> = HashMap::new();
        assert!(assemble(&spec, &config, stages).is_err());
    }

    #[test]
    fn assembly_succeeds_once_every_node_has_a_stage() {
        let spec = Demo;
        let mut patch = serde_json::Map::new();
        patch.insert("api_key".to_string(), json!("sk-test"));
        let config = resolve_configuration(&spec, None, &patch).unwrap();
        let mut stages: HashMap<String, Arc<dyn Stage>> = HashMap::new();
        stages.insert("only".to_string(), Arc::new(Noop(StageName::new("only").unwrap())));
        assert!(assemble(&spec, &config, stages).is_ok());
    }

    #[test]
    fn assembled_pipeline_exposes_config_dag_and_diff_against_defaults() {
        let spec = Demo;
        let defaults = spec.default_configuration();
        let mut patch = serde_json::Map::new();
        patch.insert("api_key".to_string(), json!("sk-test"));
        let config = resolve_configuration(&spec, None, &patch).unwrap();
        let mut stages: HashMap<String, Arc<dyn Stage>> = HashMap::new();
        stages.insert("only".to_string(), Arc::new(Noop(StageName::new("only").unwrap())));
        let pipeline = assemble(&spec, &config, stages).unwrap();

        assert_eq!(pipeline.get_config(), &config);
        assert_eq!(pipeline.get_dag().len(), 1);
        let diffs = pipeline.diff_configs(&defaults);
        assert!(diffs.iter().any(|d| d.path == "api_key"));
    }

    #[test]
    fn replacement_config_is_used_as_the_merge_base_instead_of_defaults() {
        let spec = Demo;
        let mut replacement = ConfigTree::new();
        replacement.insert("api_key".to_string(), ConfigNode::leaf(json!("sk-from-replacement")));
        let patch = serde_json::Map::new();
        let config = resolve_configuration(&spec, Some(&replacement), &patch).unwrap();
        assert_eq!(config.get("api_key"), Some(&ConfigNode::leaf(json!("sk-from-replacement"))));
    }

    struct TurnSpec;
    impl PipelineSpec for TurnSpec {
        fn name(&self) -> &str {
            "turn-spec"
        }
        fn description(&self) -> &str {
            "multi-turn demo"
        }
        fn default_configuration(&self) -> ConfigTree {
            ConfigTree::new()
        }
        fn create_dag(&self, _configuration: &ConfigTree) -> HarnessResult<Dag> {
            Dag::build(vec![DagNodeSpec::new("observed", vec![]).unwrap()])
        }
        fn mappings(&self) -> Mappings {
            Mappings {
                turns: Some("turns".to_string()),
                ..Mappings::default()
            }
        }
    }

    /// Echoes `initial` back as `observed`, so the chaining test can assert
    /// each turn's seed was the previous turn's echoed output.
    struct EchoInitialAsObserved(StageName);
    #[async_trait]
    impl Stage for EchoInitialAsObserved {
        fn name(&self) -> &StageName {
            &self.0
        }
        fn inputs(&self) -> &[StageName] {
            &[]
        }
        async fn run(&self, context: &Context) -> HarnessResult<serde_json::Value> {
            Ok(context.case.get("initial").cloned().unwrap_or(json!(null)))
        }
    }

    fn assemble_turn_spec() -> (TurnSpec, AssembledPipeline) {
        let spec = TurnSpec;
        let config = spec.default_configuration();
        let mut stages: HashMap<String, Arc<dyn Stage>> = HashMap::new();
        stages.insert(
            "observed".to_string(),
            Arc::new(EchoInitialAsObserved(StageName::new("observed").unwrap())),
        );
        let pipeline = assemble(&spec, &config, stages).unwrap();
        (spec, pipeline)
    }

    #[tokio::test]
    async fn turns_wrapper_chains_observed_output_into_next_turns_initial() {
        let (_spec, pipeline) = assemble_turn_spec();
        assert_eq!(pipeline.dag.len(), 1);
        assert!(pipeline.dag.node("turns").is_some());

        let case = Case::from_json(json!({
            "uuid": "00000000-0000-4000-8000-000000000001",
            "initial": "hello",
            "turns": [{}, {}],
        }))
        .unwrap();
        let context = Context::new(case);
        let (context, outcome) =
            dag_executor::run_dag(&pipeline.dag, &pipeline.stages, context).await;
        outcome.unwrap();
        let turns_output = context.stage("turns").unwrap().value().as_array().unwrap();
        assert_eq!(turns_output.len(), 2);
        assert_eq!(turns_output[0]["observed"], json!("hello"));
        // Second turn's initial was seeded from the first turn's observed output.
        assert_eq!(turns_output[1]["observed"], json!("hello"));
    }

    struct TurnSpecWithUnmetObservedMapping;
    impl PipelineSpec for TurnSpecWithUnmetObservedMapping {
        fn name(&self) -> &str {
            "turn-spec-unmet"
        }
        fn description(&self) -> &str {
            "multi-turn demo whose mapped observed field no stage ever writes"
        }
        fn default_configuration(&self) -> ConfigTree {
            ConfigTree::new()
        }
        fn create_dag(&self, _configuration: &ConfigTree) -> HarnessResult<Dag> {
            Dag::build(vec![DagNodeSpec::new("observed", vec![]).unwrap()])
        }
        fn mappings(&self) -> Mappings {
            Mappings {
                turns: Some("turns".to_string()),
                observed: Some("never_written".to_string()),
                ..Mappings::default()
            }
        }
    }

    #[tokio::test]
    async fn turns_wrapper_breaks_early_when_observed_field_is_missing() {
        let spec = TurnSpecWithUnmetObservedMapping;
        let config = spec.default_configuration();
        let mut stages: HashMap<String, Arc<dyn Stage>> = HashMap::new();
        stages.insert(
            "observed".to_string(),
            Arc::new(EchoInitialAsObserved(StageName::new("observed").unwrap())),
        );
        let pipeline = assemble(&spec, &config, stages).unwrap();

        let case = Case::from_json(json!({
            "uuid": "00000000-0000-4000-8000-000000000002",
            "initial": "hello",
            "turns": [{}, {}, {}],
        }))
        .unwrap();
        let context = Context::new(case);
        let (context, outcome) =
            dag_executor::run_dag(&pipeline.dag, &pipeline.stages, context).await;
        outcome.unwrap();
        let turns_output = context.stage("turns").unwrap().value().as_array().unwrap();
        // Stops after the first turn since its mapped observed field
        // ("never_written") is never written by any stage.
        assert_eq!(turns_output.len(), 1);
    }

    #[tokio::test]
    async fn turns_wrapper_isolated_turn_seeds_from_previous_expected() {
        let (_spec, pipeline) = assemble_turn_spec();

        let case = Case::from_json(json!({
            "uuid": "00000000-0000-4000-8000-000000000003",
            "initial": "unused-for-turn-1",
            "turns": [{"expected": "gold-from-turn-0"}, {}],
        }))
        .unwrap();
        let context = Context::with_turn(case, 1);
        let (context, outcome) =
            dag_executor::run_dag(&pipeline.dag, &pipeline.stages, context).await;
        outcome.unwrap();
        let turn_output = context.stage("turns").unwrap().value();
        assert_eq!(turn_output["observed"], json!("gold-from-turn-0"));
    }
}
