// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Harness CLI
//!
//! Entry point: parses argv via `harness_bootstrap`, wires a filesystem run
//! log repository and the model registry, installs a shutdown-signal
//! listener, and dispatches the parsed command to `harness::presentation::App`.
//!
//! This binary ships with no pipelines registered — [`register_pipelines`] is
//! the extension point an embedding project fills in with its own
//! `PipelineSpec`/`Stage` implementations before building `App`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use harness::application::commands::{Command, LogSelector, RunCommand};
use harness::infrastructure::config::app_config::AppConfig;
use harness::infrastructure::logging::init_tracing;
use harness::infrastructure::repositories::run_log_fs::FsRunLogRepository;
use harness::presentation::{App, PipelineRegistry, StdoutSink};
use harness_bootstrap::cli::{ValidatedCommand, ValidatedLogSelector};
use harness_bootstrap::shutdown::ShutdownCoordinator;
use harness_domain::error::HarnessError;
use harness_domain::repositories::model_registry::ModelRegistry;

/// Where no pipeline is registered by default; fill this in with the
/// embedding project's own `PipelineSpec`/`Stage` implementations.
fn register_pipelines(_registry: &mut PipelineRegistry, _models: &ModelRegistry) {}

fn run_log_directory() -> PathBuf {
    std::env::var("HARNESS_RUN_LOG_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(".harness/runs"))
}

fn load_model_registry() -> Result<ModelRegistry, HarnessError> {
    let mut registry = ModelRegistry::new();
    if let Ok(models_path) = std::env::var("HARNESS_MODELS_PATH") {
        let credentials_path = std::env::var("HARNESS_CREDENTIALS_PATH").ok().map(PathBuf::from);
        let config = AppConfig::load(&PathBuf::from(models_path), credentials_path.as_deref())?;
        harness::infrastructure::adapters::register_models(&mut registry, &config)?;
    }
    Ok(registry)
}

fn selector(raw: ValidatedLogSelector) -> LogSelector {
    match raw {
        ValidatedLogSelector::Latest => LogSelector::Latest,
        ValidatedLogSelector::IdOrPrefix(prefix) => LogSelector::IdOrPrefix(prefix),
    }
}

fn into_command(validated: ValidatedCommand) -> Command {
    match validated {
        ValidatedCommand::Run { pipeline, cases, overrides, concurrency, save, id_prefix, keywords } => {
            Command::Run(RunCommand {
                pipeline,
                suite_path: cases,
                overrides,
                concurrency,
                save,
                id_prefix,
                keywords,
            })
        }
        ValidatedCommand::Rerun { run, overrides, concurrency, save, id_prefix } => {
            let _ = overrides;
            Command::Rerun(harness::application::commands::RerunCommand {
                run_selector: selector(run),
                id_prefix,
                concurrency,
                save,
            })
        }
        ValidatedCommand::Compare { first, second } => {
            Command::Compare(harness::application::commands::CompareCommand {
                first: selector(first),
                second: selector(second),
            })
        }
        ValidatedCommand::History => Command::History,
        ValidatedCommand::Models => Command::Models,
        ValidatedCommand::Pipelines => Command::Pipelines,
        ValidatedCommand::Summarize { run } => Command::Summarize(selector(run)),
        ValidatedCommand::Format { run, case_prefix, keywords } => {
            Command::Format(harness::application::commands::FormatCommand {
                run_selector: selector(run),
                id_prefix: case_prefix,
                keywords,
            })
        }
        ValidatedCommand::AddIds { cases, in_place } => {
            Command::AddIds(harness::application::commands::AddIdsCommand { suite_path: cases, in_place })
        }
    }
}

async fn run() -> Result<(), HarnessError> {
    init_tracing();

    let validated_cli = harness_bootstrap::bootstrap_cli().map_err(|err| HarnessError::InvalidInput(err.to_string()))?;

    let models = load_model_registry()?;
    let mut pipelines = PipelineRegistry::new();
    register_pipelines(&mut pipelines, &models);

    let app = App {
        pipelines,
        run_log_repository: Arc::new(FsRunLogRepository::new(run_log_directory())),
    };

    let coordinator = ShutdownCoordinator::new(Duration::from_secs(harness_bootstrap::shutdown::DEFAULT_GRACE_PERIOD_SECS));
    let token = coordinator.token();
    tokio::spawn(harness_bootstrap::signals::wait_for_shutdown_signal(coordinator));

    let sink = StdoutSink;
    tokio::select! {
        result = app.dispatch(into_command(validated_cli.command), &sink) => result,
        _ = token.cancelled() => {
            Err(HarnessError::CancelledBatch("shutdown signal received".to_string()))
        }
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    harness_bootstrap::result_to_exit_code(run().await)
}
