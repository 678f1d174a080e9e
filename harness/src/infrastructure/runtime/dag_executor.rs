// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # DAG Execute Phase
//!
//! Runs a validated [`Dag`] against a per-case [`Context`] on the Tokio
//! runtime (spec.md §4.C Execute phase). The build phase in
//! `harness_domain::aggregates::dag` is pure and synchronous; this module
//! is the only place a `Dag`'s nodes actually run.
//!
//! Scheduling mirrors the harness's original `run_dag`: a ready set seeded
//! from source nodes, each node spawned as soon as every input it declared
//! has completed, with a count of `waiting_for` decremented as inputs
//! finish. Unlike a naive "wait for everyone, then run downstream" approach,
//! a node only waits for *its own* declared inputs, so independent branches
//! of the DAG run fully concurrently.
//!
//! Failure policy (spec.md §8, a fixed Open Question from the original
//! design): siblings already in flight are allowed to finish; the first
//! failure observed is the one surfaced in the case's `RunResult`. This
//! keeps `Context.stages` as complete as possible for diagnostics without
//! the complexity of mid-flight cancellation.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use harness_domain::aggregates::dag::Dag;
use harness_domain::entities::context::Context;
use harness_domain::error::{HarnessError, HarnessResult};
use harness_domain::repositories::stage::Stage;
use harness_domain::value_objects::stage_name::StageName;
use tokio::sync::Mutex;

/// Runs every node of `dag` against `context`, writing each node's output
/// back into `context` as it completes, and hands `context` back regardless
/// of outcome so a failed case still carries whatever stages finished
/// before the first error (spec.md §3.6 partial results). `stages` supplies
/// the executable `Stage` for each DAG node name; a DAG node with no
/// matching stage is a caller bug (`PipelineSpec::create_dag` built a DAG
/// referencing a stage it never registered), not a runtime failure.
pub async fn run_dag(
    dag: &Dag,
    stages: &HashMap<String, Arc<dyn Stage>>,
    context: Context,
) -> (Context, HarnessResult<()>) {
    let context = Arc::new(Mutex::new(context));
    let mut waiting_for: HashMap<StageName, usize> = dag
        .nodes()
        .map(|n| (n.name.clone(), n.inputs.len()))
        .collect();
    let mut ready: Vec<StageName> = dag.source_nodes().map(|n| n.name.clone()).collect();
    let mut first_error: Option<HarnessError> = None;

    while !ready.is_empty() && first_error.is_none() {
        let batch = std::mem::take(&mut ready);
        let outcomes = join_all(batch.iter().map(|name| {
            let stage = stages.get(name.as_str()).cloned();
            let context = Arc::clone(&context);
            let name = name.clone();
            async move {
                let stage = stage.ok_or_else(|| {
                    HarnessError::DeadlockInternal(format!(
                        "no stage registered for DAG node '{name}'"
                    ))
                })?;
                // Clone a snapshot rather than holding the lock across the
                // stage's own await points, so independent siblings in the
                // same ready batch actually run concurrently.
                let snapshot = context.lock().await.clone();
                let output = stage.run(&snapshot).await?;
                Ok::<(StageName, serde_json::Value), HarnessError>((name, output))
            }
        }))
        .await;

        for outcome in outcomes {
            match outcome {
                Ok((name, output)) => {
                    let mut guard = context.lock().await;
                    if let Err(err) = guard.record_stage(name.as_str(), output) {
                        drop(guard);
                        first_error.get_or_insert(err);
                        continue;
                    }
                    drop(guard);
                    if let Some(node) = dag.node(name.as_str()) {
                        for downstream in &node.outputs {
                            if let Some(remaining) = waiting_for.get_mut(downstream) {
                                *remaining -= 1;
                                if *remaining == 0 {
                                    ready.push(downstream.clone());
                                }
                            }
                        }
                    }
                }
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
    }

    let context = Arc::try_unwrap(context)
        .unwrap_or_else(|_| panic!("dag executor: context outlived its single owning task"))
        .into_inner();

    match first_error {
        Some(err) => (context, Err(err)),
        None => (context, Ok(())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use harness_domain::entities::case::Case;
    use serde_json::json;
    use std::sync::OnceLock;

    struct Const {
        name: StageName,
        inputs: Vec<StageName>,
        value: serde_json::Value,
    }

    #[async_trait]
    impl Stage for Const {
        fn name(&self) -> &StageName {
            &self.name
        }

        fn inputs(&self) -> &[StageName] {
            &self.inputs
        }

        async fn run(&self, _context: &Context) -> HarnessResult<serde_json::Value> {
            Ok(self.value.clone())
        }
    }

    fn named(name: &str) -> StageName {
        static CACHE: OnceLock<()> = OnceLock::new();
        let _ = CACHE.get_or_init(|| ());
        StageName::new(name).unwrap()
    }

    #[tokio::test]
    async fn runs_a_diamond_dag_and_records_every_stage() {
        use harness_domain::aggregates::dag::DagNodeSpec;
        let dag = Dag::build(vec![
            DagNodeSpec::new("a", vec![]).unwrap(),
            DagNodeSpec::new("b", vec!["a"]).unwrap(),
            DagNodeSpec::new("c", vec!["a"]).unwrap(),
            DagNodeSpec::new("d", vec!["b", "c"]).unwrap(),
        ])
        .unwrap();

        let mut stages: HashMap<String, Arc<dyn Stage>> = HashMap::new();
        for n in ["a", "b", "c", "d"] {
            stages.insert(
                n.to_string(),
                Arc::new(Const {
                    name: named(n),
                    inputs: vec![],
                    value: json!(n),
                }),
            );
        }

        let case = Case::from_json(json!({"uuid": "00000000-0000-4000-8000-000000000001"})).unwrap();
        let context = Context::new(case);
        let (context, result) = run_dag(&dag, &stages, context).await;
        result.unwrap();
        assert_eq!(context.stages().len(), 4);
    }

    #[tokio::test]
    async fn sibling_continues_after_another_sibling_fails() {
        use harness_domain::aggregates::dag::DagNodeSpec;
        struct Failing(StageName);
        #[async_trait]
        impl Stage for Failing {
            fn name(&self) -> &StageName {
                &self.0
            }
            fn inputs(&self) -> &[StageName] {
                &[]
            }
            async fn run(&self, _context: &Context) -> HarnessResult<serde_json::Value> {
                Err(HarnessError::StageFailure("boom".to_string()))
            }
        }

        let dag = Dag::build(vec![
            DagNodeSpec::new("ok", vec![]).unwrap(),
            DagNodeSpec::new("bad", vec![]).unwrap(),
        ])
        .unwrap();
        let mut stages: HashMap<String, Arc<dyn Stage>> = HashMap::new();
        stages.insert(
            "ok".to_string(),
            Arc::new(Const {
                name: named("ok"),
                inputs: vec![],
                value: json!(1),
            }),
        );
        stages.insert("bad".to_string(), Arc::new(Failing(named("bad"))));

        let case = Case::from_json(json!({"uuid": "00000000-0000-4000-8000-000000000002"})).unwrap();
        let context = Context::new(case);
        let (context, result) = run_dag(&dag, &stages, context).await;
        assert!(result.is_err());
        assert!(context.stage("ok").is_some());
    }
}
