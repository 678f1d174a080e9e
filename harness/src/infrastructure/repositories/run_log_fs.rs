// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Filesystem Run Log Repository
//!
//! Stores each `RunLog` as `<run_uuid>.json` under a configured directory
//! (spec.md §3.7, §6.2 `--save`, `history`, `compare`). `load_latest` and
//! `list` scan the directory by modification time rather than maintaining a
//! separate index file, matching the harness's single-writer-per-run model:
//! there is never a concurrent writer to race against.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use harness_domain::aggregates::run_log::RunLog;
use harness_domain::error::{HarnessError, HarnessResult};
use harness_domain::repositories::run_log_repository::{RunLogRepository, RunSummary};
use harness_domain::value_objects::run_id::RunId;

pub struct FsRunLogRepository {
    directory: PathBuf,
}

impl FsRunLogRepository {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn path_for(&self, id: &RunId) -> PathBuf {
        self.directory.join(format!("{}.json", id.file_stem()))
    }

    fn list_run_files(&self) -> HarnessResult<Vec<PathBuf>> {
        if !self.directory.exists() {
            return Ok(Vec::new());
        }
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.directory)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    fn read_log(path: &Path) -> HarnessResult<RunLog> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl RunLogRepository for FsRunLogRepository {
    async fn save(&self, log: &RunLog) -> HarnessResult<()> {
        std::fs::create_dir_all(&self.directory)?;
        let path = self.path_for(&log.uuid);
        let json = serde_json::to_string_pretty(log)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    async fn load(&self, id: &RunId) -> HarnessResult<RunLog> {
        let path = self.path_for(id);
        Self::read_log(&path).map_err(|_| HarnessError::NotFound(format!("no run log with id '{id}'")))
    }

    async fn load_by_prefix(&self, prefix: &str) -> HarnessResult<RunLog> {
        let paths = self.list_run_files()?;
        let stems: Vec<String> = paths
            .iter()
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        let full = harness_domain::services::short_id::resolve_prefix(&stems, prefix)?;
        let path = self.directory.join(format!("{full}.json"));
        Self::read_log(&path)
    }

    async fn load_latest(&self) -> HarnessResult<Option<RunLog>> {
        let paths = self.list_run_files()?;
        let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
        for path in paths {
            let modified = std::fs::metadata(&path)?.modified()?;
            if newest.as_ref().map(|(t, _)| modified > *t).unwrap_or(true) {
                newest = Some((modified, path));
            }
        }
        newest.map(|(_, path)| Self::read_log(&path)).transpose()
    }

    async fn list(&self) -> HarnessResult<Vec<RunSummary>> {
        let mut summaries = Vec::new();
        for path in self.list_run_files()? {
            let log = Self::read_log(&path)?;
            let pass_count = log.pass_count();
            let fail_count = log.fail_count();
            summaries.push(RunSummary {
                uuid: log.uuid,
                pipeline: log.metadata.pipeline,
                start: log.metadata.start,
                pass_count,
                fail_count,
            });
        }
        summaries.sort_by(|a, b| a.start.cmp(&b.start));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_domain::aggregates::run_log::RunMetadata as RunLogMetadata;
    use serde_json::json;

    fn sample_log() -> RunLog {
        RunLog::new(
            RunId::new_v4(),
            RunLogMetadata {
                pipeline: "demo".to_string(),
                config: json!({}),
                command_line: vec![],
                git_sha: None,
                git_diff_uncommitted: None,
                start: "2026-01-01T00:00:00Z".to_string(),
                end: None,
                elapsed: None,
                exception: None,
            },
        )
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsRunLogRepository::new(dir.path());
        let log = sample_log();
        let id = log.uuid;
        futures::executor::block_on(repo.save(&log)).unwrap();
        let loaded = futures::executor::block_on(repo.load(&id)).unwrap();
        assert_eq!(loaded.uuid, id);
    }

    #[test]
    fn load_latest_returns_none_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsRunLogRepository::new(dir.path());
        assert!(futures::executor::block_on(repo.load_latest()).unwrap().is_none());
    }
}
