// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Interface Layer
//!
//! Translates a parsed [`Command`] into calls against the application layer
//! and renders the result through a [`ReportSink`] (spec.md §1's abstract
//! `print(line)` contract, §6.1's CLI surface). Kept deliberately thin: no
//! subcommand here does more than call one application function and render
//! its output, matching `gotaglio/main.py`'s dispatch table.

use std::collections::HashMap;
use std::sync::Arc;

use harness_domain::error::{HarnessError, HarnessResult};
use harness_domain::repositories::run_log_repository::RunLogRepository;
use harness_domain::repositories::stage::Stage;
use harness_domain::services::pipeline_spec::PipelineSpec;
use harness_domain::value_objects::run_id::RunId;

use crate::application::commands::{AddIdsCommand, Command, CompareCommand, FormatCommand, LogSelector, RerunCommand, RunCommand};
use crate::application::director::Director;
use crate::application::{pipeline_assembly, reporting, suite};

/// Where rendered report text goes. Abstracts over stdout vs. an
/// in-memory buffer so reporting can be exercised by tests without
/// capturing process stdout.
pub trait ReportSink: Send + Sync {
    fn print(&self, line: &str);
}

pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn print(&self, line: &str) {
        println!("{line}");
    }
}

#[derive(Default)]
pub struct VecSink(std::sync::Mutex<Vec<String>>);

impl ReportSink for VecSink {
    fn print(&self, line: &str) {
        self.0.lock().expect("VecSink mutex poisoned").push(line.to_string());
    }
}

impl VecSink {
    pub fn lines(&self) -> Vec<String> {
        self.0.lock().expect("VecSink mutex poisoned").clone()
    }
}

/// A pipeline as registered by the embedding application (spec.md §3.3,
/// §6.6): a `PipelineSpec` plus the concrete `Stage` implementation for
/// every name its DAG factory can produce. The harness core never
/// constructs either — both arrive pre-built from outside.
pub struct RegisteredPipeline {
    pub spec: Arc<dyn PipelineSpec>,
    pub stages: HashMap<String, Arc<dyn Stage>>,
    /// The configured inference model's own `metadata()`, if this pipeline
    /// calls a specific model (spec.md §4.E's audio-capability check reads
    /// `metadata().type` from here). `None` for pipelines with no audio
    /// cases, where the check never triggers.
    pub model_metadata: Option<HashMap<String, serde_json::Value>>,
}

pub type PipelineRegistry = HashMap<String, RegisteredPipeline>;

pub struct App {
    pub pipelines: PipelineRegistry,
    pub run_log_repository: Arc<dyn RunLogRepository>,
}

impl App {
    fn pipeline(&self, name: &str) -> HarnessResult<&RegisteredPipeline> {
        self.pipelines
            .get(name)
            .ok_or_else(|| HarnessError::NotFound(format!("no pipeline registered with name '{name}'")))
    }

    async fn resolve_log(&self, selector: &LogSelector) -> HarnessResult<harness_domain::aggregates::run_log::RunLog> {
        match selector {
            LogSelector::Latest => self
                .run_log_repository
                .load_latest()
                .await?
                .ok_or_else(|| HarnessError::NotFound("no run logs found".to_string())),
            LogSelector::IdOrPrefix(prefix) => self.run_log_repository.load_by_prefix(prefix).await,
        }
    }

    pub async fn dispatch(&self, command: Command, sink: &dyn ReportSink) -> HarnessResult<()> {
        match command {
            Command::Run(cmd) => self.run(cmd, sink).await,
            Command::Rerun(cmd) => self.rerun(cmd, sink).await,
            Command::Compare(cmd) => self.compare(cmd, sink).await,
            Command::History => self.history(sink).await,
            Command::Models => self.models(sink),
            Command::Pipelines => self.pipelines_list(sink),
            Command::Summarize(selector) => self.summarize(selector, sink).await,
            Command::Format(cmd) => self.format(cmd, sink).await,
            Command::AddIds(cmd) => self.add_ids(cmd, sink),
        }
    }

    async fn run(&self, cmd: RunCommand, sink: &dyn ReportSink) -> HarnessResult<()> {
        let registered = self.pipeline(&cmd.pipeline)?;
        let spec = registered.spec.clone();
        let cases = suite::load_cases(&cmd.suite_path)?;
        let configuration = pipeline_assembly::resolve_configuration(spec.as_ref(), None, &cmd.overrides)?;
        let pipeline = pipeline_assembly::assemble(spec.as_ref(), &configuration, registered.stages.clone())?;

        let director = Director::new(cmd.concurrency);
        let results = director
            .process_all_cases(spec.as_ref(), &pipeline, registered.model_metadata.as_ref(), cases)
            .await?;

        let mut log = new_run_log(&cmd.pipeline, &configuration, &cmd.overrides);
        for result in results {
            log.push(result);
        }
        if cmd.save {
            self.run_log_repository.save(&log).await?;
        }

        let options = reporting::FormatOptions {
            id_prefix: cmd.id_prefix.as_deref(),
            keywords: cmd.keywords.as_deref(),
        };
        sink.print(&reporting::render_format(&log, spec.as_ref(), &options)?);
        sink.print(&reporting::render_summary(&log, spec.as_ref()));
        Ok(())
    }

    async fn rerun(&self, cmd: RerunCommand, sink: &dyn ReportSink) -> HarnessResult<()> {
        let prior = self.resolve_log(&cmd.run_selector).await?;
        let registered = self.pipeline(&prior.metadata.pipeline)?;
        let spec = registered.spec.clone();
        let overrides: serde_json::Map<String, serde_json::Value> = prior
            .metadata
            .config
            .as_object()
            .cloned()
            .unwrap_or_default();
        let configuration = pipeline_assembly::resolve_configuration(spec.as_ref(), None, &overrides)?;
        let pipeline = pipeline_assembly::assemble(spec.as_ref(), &configuration, registered.stages.clone())?;

        let cases: Vec<harness_domain::entities::case::Case> = if let Some(prefix) = &cmd.id_prefix {
            vec![prior.find_by_id_prefix(prefix)?.case.clone()]
        } else {
            prior.results.iter().map(|r| r.case.clone()).collect()
        };

        let director = Director::new(cmd.concurrency);
        let results = director
            .process_all_cases(spec.as_ref(), &pipeline, registered.model_metadata.as_ref(), cases)
            .await?;
        let mut log = new_run_log(&prior.metadata.pipeline, &configuration, &overrides);
        for result in results {
            log.push(result);
        }
        if cmd.save {
            self.run_log_repository.save(&log).await?;
        }
        sink.print(&reporting::render_summary(&log, spec.as_ref()));
        Ok(())
    }

    async fn compare(&self, cmd: CompareCommand, sink: &dyn ReportSink) -> HarnessResult<()> {
        let a = self.resolve_log(&cmd.first).await?;
        let b = self.resolve_log(&cmd.second).await?;
        if a.uuid == b.uuid {
            let registered = self.pipeline(&a.metadata.pipeline)?;
            sink.print(&reporting::render_summary(&a, registered.spec.as_ref()));
            return Ok(());
        }
        let report = reporting::compare(&a, &b)?;
        sink.print(&report.render());
        Ok(())
    }

    async fn history(&self, sink: &dyn ReportSink) -> HarnessResult<()> {
        for summary in self.run_log_repository.list().await? {
            sink.print(&format!(
                "{} {} {} ({}/{} passed)",
                summary.uuid,
                summary.start,
                summary.pipeline,
                summary.pass_count,
                summary.pass_count + summary.fail_count
            ));
        }
        Ok(())
    }

    fn models(&self, sink: &dyn ReportSink) -> HarnessResult<()> {
        sink.print("models are registered per-process by the embedding application");
        Ok(())
    }

    fn pipelines_list(&self, sink: &dyn ReportSink) -> HarnessResult<()> {
        let mut names: Vec<&String> = self.pipelines.keys().collect();
        names.sort();
        for name in names {
            let registered = &self.pipelines[name];
            sink.print(&format!("{name}: {}", registered.spec.description()));
        }
        Ok(())
    }

    async fn summarize(&self, selector: LogSelector, sink: &dyn ReportSink) -> HarnessResult<()> {
        let log = self.resolve_log(&selector).await?;
        let registered = self.pipeline(&log.metadata.pipeline)?;
        sink.print(&reporting::render_summary(&log, registered.spec.as_ref()));
        Ok(())
    }

    async fn format(&self, cmd: FormatCommand, sink: &dyn ReportSink) -> HarnessResult<()> {
        let log = self.resolve_log(&cmd.run_selector).await?;
        let registered = self.pipeline(&log.metadata.pipeline)?;
        let options = reporting::FormatOptions {
            id_prefix: cmd.id_prefix.as_deref(),
            keywords: cmd.keywords.as_deref(),
        };
        sink.print(&reporting::render_format(&log, registered.spec.as_ref(), &options)?);
        Ok(())
    }

    fn add_ids(&self, cmd: AddIdsCommand, sink: &dyn ReportSink) -> HarnessResult<()> {
        let rendered = suite::add_ids(&cmd.suite_path, cmd.in_place)?;
        if !cmd.in_place {
            sink.print(&rendered);
        }
        Ok(())
    }
}

fn new_run_log(
    pipeline: &str,
    configuration: &harness_domain::value_objects::config_value::ConfigTree,
    overrides: &serde_json::Map<String, serde_json::Value>,
) -> harness_domain::aggregates::run_log::RunLog {
    use harness_domain::aggregates::run_log::{RunLog, RunMetadata};
    use harness_domain::services::clock::now_utc_iso;
    use harness_domain::services::config_merge::to_display_json;

    let mut config = to_display_json(configuration);
    if let Json::Object(obj) = &mut config {
        for (k, v) in overrides {
            obj.insert(k.clone(), v.clone());
        }
    }

    RunLog::new(
        RunId::new_v4(),
        RunMetadata {
            pipeline: pipeline.to_string(),
            config,
            command_line: std::env::args().collect(),
            git_sha: crate::infrastructure::provenance::git_sha(),
            git_diff_uncommitted: crate::infrastructure::provenance::git_has_uncommitted_changes(),
            start: now_utc_iso(),
            end: None,
            elapsed: None,
            exception: None,
        },
    )
}

use serde_json::Value as Json;
