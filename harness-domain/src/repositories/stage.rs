// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage Port
//!
//! A `Stage` is one node's unit of work in a pipeline's DAG (spec.md §3.4,
//! §6.4): given the case and whatever upstream stage outputs it declared as
//! inputs, produce this node's output. Mirrors `StageExecutor` in the
//! teacher domain (`adaptive_pipeline_domain::repositories::stage_executor`)
//! as a domain-level async trait object; the infrastructure layer's DAG
//! scheduler (`harness::infrastructure::runtime::dag_executor`) is the sole
//! caller.

use async_trait::async_trait;

use crate::entities::context::Context;
use crate::error::HarnessResult;
use crate::value_objects::stage_name::StageName;

/// One executable node in a pipeline's DAG.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &StageName;

    /// Names of stages whose output this stage reads before running.
    fn inputs(&self) -> &[StageName];

    /// Runs this stage against the shared per-case context. Implementations
    /// read upstream outputs via `context.stage(name)` and must not write to
    /// `context` directly — the DAG engine records the returned value under
    /// this stage's name after the call returns successfully.
    async fn run(&self, context: &Context) -> HarnessResult<serde_json::Value>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Stage for Echo {
        fn name(&self) -> &StageName {
            static NAME: std::sync::OnceLock<StageName> = std::sync::OnceLock::new();
            NAME.get_or_init(|| StageName::new("echo").unwrap())
        }

        fn inputs(&self) -> &[StageName] {
            &[]
        }

        async fn run(&self, _context: &Context) -> HarnessResult<serde_json::Value> {
            Ok(json!({"ok": true}))
        }
    }

    #[test]
    fn stage_object_is_callable_through_trait_object() {
        use crate::entities::case::Case;
        let case = Case::from_json(json!({"uuid": "00000000-0000-4000-8000-000000000001"})).unwrap();
        let ctx = Context::new(case);
        let stage: Box<dyn Stage> = Box::new(Echo);
        let out = futures::executor::block_on(stage.run(&ctx)).unwrap();
        assert_eq!(out, json!({"ok": true}));
    }
}
