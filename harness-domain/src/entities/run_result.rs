// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # RunResult
//!
//! Produced by the director for each case (spec.md §3.6): whether the DAG
//! ran to completion, the (possibly partial) stage outputs, the exception
//! if any, and `{start, end, elapsed}` timing.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::entities::case::Case;
use crate::error::ExceptionRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub start: String,
    pub end: Option<String>,
    pub elapsed: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub case: Case,
    pub succeeded: bool,
    pub stages: Json,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionRecord>,
    pub metadata: RunMetadata,
}

impl RunResult {
    pub fn success(case: Case, stages: Json, metadata: RunMetadata) -> Self {
        RunResult {
            case,
            succeeded: true,
            stages,
            exception: None,
            metadata,
        }
    }

    pub fn failure(
        case: Case,
        stages: Json,
        exception: ExceptionRecord,
        metadata: RunMetadata,
    ) -> Self {
        RunResult {
            case,
            succeeded: false,
            stages,
            exception: Some(exception),
            metadata,
        }
    }
}
