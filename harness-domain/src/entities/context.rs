// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Per-Case Context
//!
//! A mutable record scoped to a single case execution (spec.md §3.5). Its
//! Python predecessor threads a free-form dict through stage
//! execution; per the redesign note in spec.md §9 this becomes an explicit
//! record whose `stages` field is a typed heterogeneous map (stage name →
//! an opaque `StageOutput`, which stages only ever populate, never replace).
//!
//! `Context` also carries a small set of named extension slots
//! (`audio_bytes`, `audio_file`, `realtime`, `realtime_events`, ...) used by
//! the realtime adapter and by multi-turn execution. These are represented
//! as an `extra: serde_json::Map` bag rather than individual struct fields,
//! since the set of stage-specific context keys is open-ended by design
//! (spec.md §3.5 "Additional fields set by stages").

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::entities::case::Case;
use crate::error::HarnessError;

/// The return value of a completed stage. Newtype around `Json` so stage
/// outputs are easy to serialize into the run log while remaining distinct
/// from ordinary config/case values in type signatures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageOutput(pub Json);

impl StageOutput {
    pub fn value(&self) -> &Json {
        &self.0
    }
}

impl From<Json> for StageOutput {
    fn from(value: Json) -> Self {
        StageOutput(value)
    }
}

/// Per-case mutable execution state. Created by the director at the start of
/// a case, read-only outside the worker that owns it, discarded after the
/// case result is assembled (spec.md §3.5 Lifetime).
#[derive(Debug, Clone)]
pub struct Context {
    pub case: Case,
    stages: HashMap<String, StageOutput>,
    /// Set when running a single turn in isolation (spec.md §4.D).
    pub turn: Option<i64>,
    pub metadata: Map<String, Json>,
    /// Open-ended extension bag: `audio_bytes`, `audio_file`, `realtime`,
    /// `instructions`, `convert_to_pcm16`, `realtime_events`, etc.
    extra: Map<String, Json>,
}

impl Context {
    pub fn new(case: Case) -> Self {
        Context {
            case,
            stages: HashMap::new(),
            turn: None,
            metadata: Map::new(),
            extra: Map::new(),
        }
    }

    pub fn with_turn(case: Case, turn: i64) -> Self {
        let mut ctx = Self::new(case);
        ctx.turn = Some(turn);
        ctx
    }

    /// Writes a stage's output. Fails if the stage name was already written
    /// during this case execution — the DAG engine's atomicity invariant
    /// (spec.md §3.4, §8 "No duplicate stage writes").
    pub fn record_stage(&mut self, name: &str, value: Json) -> Result<(), HarnessError> {
        if self.stages.contains_key(name) {
            return Err(HarnessError::DeadlockInternal(format!(
                "stage '{name}' already recorded in context.stages"
            )));
        }
        self.stages.insert(name.to_string(), StageOutput(value));
        Ok(())
    }

    pub fn stage(&self, name: &str) -> Option<&StageOutput> {
        self.stages.get(name)
    }

    pub fn stages(&self) -> &HashMap<String, StageOutput> {
        &self.stages
    }

    pub fn stages_as_json(&self) -> Json {
        Json::Object(
            self.stages
                .iter()
                .map(|(k, v)| (k.clone(), v.0.clone()))
                .collect(),
        )
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: Json) {
        self.extra.insert(key.into(), value);
    }

    pub fn get_extra(&self, key: &str) -> Option<&Json> {
        self.extra.get(key)
    }

    pub fn audio_bytes_b64(&self) -> Option<&str> {
        self.get_extra("audio_bytes").and_then(Json::as_str)
    }

    pub fn audio_file(&self) -> Option<&str> {
        self.get_extra("audio_file").and_then(Json::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_case() -> Case {
        Case::from_json(json!({"uuid": "00000000-0000-4000-8000-000000000001"})).unwrap()
    }

    #[test]
    fn cannot_write_same_stage_twice() {
        let mut ctx = Context::new(sample_case());
        ctx.record_stage("a", json!(1)).unwrap();
        let err = ctx.record_stage("a", json!(2)).unwrap_err();
        assert!(matches!(err, HarnessError::DeadlockInternal(_)));
    }

    #[test]
    fn extra_bag_round_trips() {
        let mut ctx = Context::new(sample_case());
        ctx.set_extra("voice", json!("alloy"));
        assert_eq!(ctx.get_extra("voice"), Some(&json!("alloy")));
    }
}
