// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Run Log Repository Port
//!
//! Persistence contract for `RunLog` (spec.md §3.7, §6.2/§6.3): write a
//! completed run, read one back by id or prefix, and list what's on disk
//! (newest first) for `history`/`rerun --latest`. The filesystem
//! implementation lives in `harness::infrastructure::repositories::run_log_fs`
//! and stores one JSON file per run under a logs directory, named by the
//! run's UUID — directly grounded on the harness's original
//! `uuid.json`-per-run convention.

use async_trait::async_trait;

use crate::aggregates::run_log::RunLog;
use crate::error::HarnessResult;
use crate::value_objects::run_id::RunId;

/// Summary metadata about a stored run, cheap to list without loading every
/// result (spec.md §6.1 `history`).
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub uuid: RunId,
    pub pipeline: String,
    pub start: String,
    pub pass_count: usize,
    pub fail_count: usize,
}

#[async_trait]
pub trait RunLogRepository: Send + Sync {
    async fn save(&self, log: &RunLog) -> HarnessResult<()>;

    async fn load(&self, id: &RunId) -> HarnessResult<RunLog>;

    /// Resolves a minimal unique prefix of a run id to the full `RunLog`
    /// (spec.md §6.2 "positional id argument may be a full UUID or any
    /// unambiguous prefix").
    async fn load_by_prefix(&self, prefix: &str) -> HarnessResult<RunLog>;

    /// The most recently saved run, if any (spec.md §6.2 `--latest`).
    async fn load_latest(&self) -> HarnessResult<Option<RunLog>>;

    /// All stored runs, newest first.
    async fn list(&self) -> HarnessResult<Vec<RunSummary>>;
}
