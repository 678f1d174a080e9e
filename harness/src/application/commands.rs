// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application Commands
//!
//! The CLI surface (spec.md §6.1) translated into one immutable, validated
//! struct per subcommand. `harness_bootstrap::cli` parses argv into these;
//! `presentation` dispatches each to the application/infrastructure calls
//! that carry it out. Keeping a `Command` enum between the two means the
//! dispatcher is exhaustively checked by the compiler as new subcommands are
//! added, rather than falling through a string-matched command name.

use std::path::PathBuf;

/// One invocation of the harness's CLI (spec.md §6.1).
#[derive(Debug, Clone)]
pub enum Command {
    Run(RunCommand),
    Rerun(RerunCommand),
    Compare(CompareCommand),
    History,
    Models,
    Pipelines,
    Summarize(LogSelector),
    Format(FormatCommand),
    AddIds(AddIdsCommand),
}

/// Selects a suite and pipeline, with optional case filtering and an output
/// destination (spec.md §6.2).
#[derive(Debug, Clone)]
pub struct RunCommand {
    pub pipeline: String,
    pub suite_path: PathBuf,
    pub overrides: serde_json::Map<String, serde_json::Value>,
    pub concurrency: usize,
    pub save: bool,
    pub id_prefix: Option<String>,
    pub keywords: Option<String>,
}

/// Re-runs a prior run's suite, optionally narrowed to one case (spec.md
/// §6.2 `rerun`).
#[derive(Debug, Clone)]
pub struct RerunCommand {
    pub run_selector: LogSelector,
    pub id_prefix: Option<String>,
    pub concurrency: usize,
    pub save: bool,
}

#[derive(Debug, Clone)]
pub struct CompareCommand {
    pub first: LogSelector,
    pub second: LogSelector,
}

/// How a stored run log is named on the command line: an explicit id/prefix
/// or the sentinel for "whatever ran most recently" (spec.md §6.2
/// `--latest`).
#[derive(Debug, Clone)]
pub enum LogSelector {
    Latest,
    IdOrPrefix(String),
}

#[derive(Debug, Clone)]
pub struct FormatCommand {
    pub run_selector: LogSelector,
    pub id_prefix: Option<String>,
    pub keywords: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AddIdsCommand {
    pub suite_path: PathBuf,
    pub in_place: bool,
}
