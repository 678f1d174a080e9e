// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Director
//!
//! Runs every case in a suite against an assembled pipeline, bounded to at
//! most `max_concurrency` cases in flight at once (spec.md §3.6, §4.D).
//! Grounded on the harness's original `Director2.process_all_cases`
//! (`asyncio.Semaphore` + `asyncio.gather`) and on this workspace's
//! `GlobalResourceManager` (`tokio::sync::Semaphore`, RAII permits) for the
//! Rust idiom of expressing the same bound.
//!
//! A case's own failure never aborts the batch: each case's `RunResult`
//! carries its own `succeeded`/`exception`. Only a bug in the harness
//! itself (not a stage/model failure) surfaces as `CancelledBatch` and
//! aborts the whole run, matching spec.md §4.D.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use harness_domain::entities::case::Case;
use harness_domain::entities::context::Context;
use harness_domain::entities::run_result::{RunMetadata, RunResult};
use harness_domain::error::{ExceptionRecord, HarnessError, HarnessResult};
use harness_domain::services::clock;
use harness_domain::services::pipeline_spec::PipelineSpec;
use serde_json::Value as Json;
use tokio::sync::Semaphore;

use crate::infrastructure::runtime::dag_executor;

/// Model types able to accept an `audio` case field (spec.md §4.E). Fixed
/// rather than derived from adapter capability traits, matching the
/// original harness's hardcoded `REALTIME_MODEL_TYPES` allow-list.
const AUDIO_CAPABLE_MODEL_TYPES: &[&str] = &["AZURE_OPEN_AI_REALTIME"];

/// Fails fast if any case needs audio but the configured model can't take
/// it (spec.md §4.E, §8 scenario 5), before any case is scheduled.
fn validate_audio_capability(model_metadata: Option<&HashMap<String, Json>>, cases: &[Case]) -> HarnessResult<()> {
    if !cases.iter().any(Case::has_audio) {
        return Ok(());
    }
    let model_type = model_metadata.and_then(|m| m.get("type")).and_then(Json::as_str);
    match model_type {
        Some(model_type) if AUDIO_CAPABLE_MODEL_TYPES.contains(&model_type) => Ok(()),
        _ => Err(HarnessError::InvalidInput(
            "Audio case requires an audio-capable model".to_string(),
        )),
    }
}

/// A registered stage set for one assembled pipeline run: the validated DAG,
/// the executable `Stage` for each of its node names, and the merged
/// configuration it was built from, produced by
/// `application::pipeline_assembly`.
pub struct AssembledPipeline {
    pub dag: harness_domain::aggregates::dag::Dag,
    pub stages: std::collections::HashMap<String, Arc<dyn harness_domain::repositories::stage::Stage>>,
    pub configuration: harness_domain::value_objects::config_value::ConfigTree,
}

impl AssembledPipeline {
    pub fn get_config(&self) -> &harness_domain::value_objects::config_value::ConfigTree {
        &self.configuration
    }

    pub fn get_dag(&self) -> &harness_domain::aggregates::dag::Dag {
        &self.dag
    }

    /// `(path, old, new)` triples between `defaults` and this pipeline's
    /// resolved configuration (spec.md §4.D `diff_configs`).
    pub fn diff_configs(
        &self,
        defaults: &harness_domain::value_objects::config_value::ConfigTree,
    ) -> Vec<harness_domain::services::config_merge::ConfigDiffEntry> {
        harness_domain::services::config_merge::diff(defaults, &self.configuration)
    }
}

pub struct Director {
    max_concurrency: usize,
}

impl Director {
    pub fn new(max_concurrency: usize) -> Self {
        Director {
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Runs `cases` against `pipeline`, honoring the concurrency bound.
    /// `model_metadata` is the configured inference model's own
    /// `ModelAdapter::metadata()` (spec.md §4.E); `None` means no case may
    /// declare an `audio` field. Returns one `RunResult` per case, in the
    /// same order as `cases`.
    pub async fn process_all_cases(
        &self,
        spec: &dyn PipelineSpec,
        pipeline: &AssembledPipeline,
        model_metadata: Option<&HashMap<String, Json>>,
        cases: Vec<Case>,
    ) -> HarnessResult<Vec<RunResult>> {
        validate_audio_capability(model_metadata, &cases)?;

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let dag = &pipeline.dag;
        let stages = &pipeline.stages;

        let futures = cases.into_iter().map(|case| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|e| HarnessError::CancelledBatch(e.to_string()))?;
                Ok::<RunResult, HarnessError>(self.process_one_case(spec, dag, stages, case).await)
            }
        });

        let outcomes = join_all(futures).await;
        let mut results = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            results.push(outcome?);
        }
        Ok(results)
    }

    async fn process_one_case(
        &self,
        spec: &dyn PipelineSpec,
        dag: &harness_domain::aggregates::dag::Dag,
        stages: &std::collections::HashMap<String, Arc<dyn harness_domain::repositories::stage::Stage>>,
        case: Case,
    ) -> RunResult {
        let start = clock::now_utc_iso();
        let mut context = Context::new(case.clone());
        context.set_extra("pipeline", spec.name().into());
        let (context, outcome) = dag_executor::run_dag(dag, stages, context).await;
        let end = clock::now_utc_iso();
        let metadata = RunMetadata {
            start,
            end: Some(end),
            elapsed: None,
        };
        match outcome {
            Ok(()) => RunResult::success(case, context.stages_as_json(), metadata),
            Err(err) => {
                let exception = ExceptionRecord::new(&err, &[]);
                RunResult::failure(case, context.stages_as_json(), exception, metadata)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use harness_domain::aggregates::dag::{Dag, DagNodeSpec};
    use harness_domain::repositories::stage::Stage;
    use harness_domain::services::pipeline_spec::SummaryRow;
    use harness_domain::value_objects::config_value::ConfigTree;
    use harness_domain::value_objects::stage_name::StageName;
    use serde_json::json;

    struct Echo(StageName);

    #[async_trait]
    impl Stage for Echo {
        fn name(&self) -> &StageName {
            &self.0
        }
        fn inputs(&self) -> &[StageName] {
            &[]
        }
        async fn run(&self, context: &Context) -> HarnessResult<serde_json::Value> {
            Ok(context.case.uuid.to_string().into())
        }
    }

    struct DemoSpec;
    impl PipelineSpec for DemoSpec {
        fn name(&self) -> &str {
            "demo"
        }
        fn description(&self) -> &str {
            "demo"
        }
        fn default_configuration(&self) -> ConfigTree {
            ConfigTree::new()
        }
        fn create_dag(&self, _configuration: &ConfigTree) -> HarnessResult<Dag> {
            Dag::build(vec![DagNodeSpec::new("echo", vec![]).unwrap()])
        }
        fn summarize_row(&self, _result: &RunResult) -> Option<SummaryRow> {
            None
        }
    }

    #[tokio::test]
    async fn runs_every_case_and_preserves_order() {
        let spec = DemoSpec;
        let dag = spec.create_dag(&spec.default_configuration()).unwrap();
        let mut stages: std::collections::HashMap<String, Arc<dyn Stage>> = std::collections::HashMap::new();
        stages.insert("echo".to_string(), Arc::new(Echo(StageName::new("echo").unwrap())));
        let pipeline = AssembledPipeline { dag, stages, configuration: ConfigTree::new() };

        let cases = vec![
            Case::from_json(json!({"uuid": "00000000-0000-4000-8000-000000000001"})).unwrap(),
            Case::from_json(json!({"uuid": "00000000-0000-4000-8000-000000000002"})).unwrap(),
        ];
        let director = Director::new(1);
        let results = director.process_all_cases(&spec, &pipeline, None, cases).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.succeeded));
    }

    #[tokio::test]
    async fn audio_case_without_audio_capable_model_fails_fast() {
        let spec = DemoSpec;
        let dag = spec.create_dag(&spec.default_configuration()).unwrap();
        let mut stages: std::collections::HashMap<String, Arc<dyn Stage>> = std::collections::HashMap::new();
        stages.insert("echo".to_string(), Arc::new(Echo(StageName::new("echo").unwrap())));
        let pipeline = AssembledPipeline { dag, stages, configuration: ConfigTree::new() };

        let case = Case::from_json(json!({
            "uuid": "00000000-0000-4000-8000-000000000001",
            "audio": "x.wav",
        }))
        .unwrap();
        let model_metadata = HashMap::from([("type".to_string(), json!("AZURE_OPEN_AI"))]);

        let director = Director::new(1);
        let err = director
            .process_all_cases(&spec, &pipeline, Some(&model_metadata), vec![case])
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::InvalidInput(_)));
        assert!(err.to_string().contains("Audio case requires an audio-capable model"));
    }

    #[tokio::test]
    async fn audio_case_with_realtime_model_is_accepted() {
        let spec = DemoSpec;
        let dag = spec.create_dag(&spec.default_configuration()).unwrap();
        let mut stages: std::collections::HashMap<String, Arc<dyn Stage>> = std::collections::HashMap::new();
        stages.insert("echo".to_string(), Arc::new(Echo(StageName::new("echo").unwrap())));
        let pipeline = AssembledPipeline { dag, stages, configuration: ConfigTree::new() };

        let case = Case::from_json(json!({
            "uuid": "00000000-0000-4000-8000-000000000001",
            "audio": "x.wav",
        }))
        .unwrap();
        let model_metadata = HashMap::from([("type".to_string(), json!("AZURE_OPEN_AI_REALTIME"))]);

        let director = Director::new(1);
        let results = director
            .process_all_cases(&spec, &pipeline, Some(&model_metadata), vec![case])
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }
}
