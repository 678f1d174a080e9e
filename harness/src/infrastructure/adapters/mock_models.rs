// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Mock Model Adapters
//!
//! Deterministic test doubles registered into every pipeline's child model
//! registry (spec.md §4.D), grounded on `gotaglio/mocks.py`. `Perfect`
//! always returns the case's expected answer; `Flakey` cycles between the
//! expected answer, an unrelated string, and a synthetic failure, to
//! exercise reporting's pass/fail handling without a real model call.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use harness_domain::entities::context::Context;
use harness_domain::error::{HarnessError, HarnessResult};
use harness_domain::repositories::model_registry::{Message, ModelAdapter};
use serde_json::Value as Json;

/// Reads the expected answer for the case currently in `context`, mirroring
/// `PipelineSpec::expected` without requiring a `&dyn PipelineSpec` to be
/// threaded through the adapter itself.
pub type ExpectedFn = Arc<dyn Fn(&Context) -> Option<Json> + Send + Sync>;

fn to_llm_string(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub struct PerfectModel {
    expected: ExpectedFn,
}

impl PerfectModel {
    pub fn new(expected: ExpectedFn) -> Self {
        Self { expected }
    }
}

#[async_trait]
impl ModelAdapter for PerfectModel {
    async fn infer(&self, _messages: &[Message], context: &mut Context) -> HarnessResult<String> {
        let value = (self.expected)(context)
            .ok_or_else(|| HarnessError::InvalidInput("case has no expected value for the perfect model".to_string()))?;
        Ok(to_llm_string(&value))
    }

    fn metadata(&self) -> HashMap<String, Json> {
        HashMap::from([("type".to_string(), Json::String("MOCK".to_string()))])
    }
}

pub struct FlakeyModel {
    expected: ExpectedFn,
    counter: AtomicU64,
}

impl FlakeyModel {
    pub fn new(expected: ExpectedFn) -> Self {
        Self {
            expected,
            counter: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl ModelAdapter for FlakeyModel {
    async fn infer(&self, _messages: &[Message], context: &mut Context) -> HarnessResult<String> {
        let turn = self.counter.fetch_add(1, Ordering::SeqCst);
        match turn % 3 {
            0 => {
                let value = (self.expected)(context)
                    .ok_or_else(|| HarnessError::InvalidInput("case has no expected value for the flakey model".to_string()))?;
                Ok(to_llm_string(&value))
            }
            1 => Ok("hello world".to_string()),
            _ => Err(HarnessError::StageFailure("flakey model failed".to_string())),
        }
    }

    fn metadata(&self) -> HashMap<String, Json> {
        HashMap::from([("type".to_string(), Json::String("MOCK".to_string()))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_domain::entities::case::Case;
    use serde_json::json;

    fn sample_context() -> Context {
        Context::new(Case::from_json(json!({"uuid": "00000000-0000-4000-8000-000000000001", "answer": "42"})).unwrap())
    }

    fn expected_from_answer() -> ExpectedFn {
        Arc::new(|ctx: &Context| ctx.case.get("answer").cloned())
    }

    #[test]
    fn perfect_model_returns_expected_answer() {
        let model = PerfectModel::new(expected_from_answer());
        let mut ctx = sample_context();
        let output = futures::executor::block_on(model.infer(&[], &mut ctx)).unwrap();
        assert_eq!(output, "42");
    }

    #[test]
    fn flakey_model_cycles_through_three_behaviors() {
        let model = FlakeyModel::new(expected_from_answer());
        let mut ctx = sample_context();
        let first = futures::executor::block_on(model.infer(&[], &mut ctx)).unwrap();
        let second = futures::executor::block_on(model.infer(&[], &mut ctx)).unwrap();
        let third = futures::executor::block_on(model.infer(&[], &mut ctx));
        assert_eq!(first, "42");
        assert_eq!(second, "hello world");
        assert!(third.is_err());
    }
}
