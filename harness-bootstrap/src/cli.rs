// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parsing and Validation
//!
//! Parses argv into a [`ValidatedCli`] that `main` hands straight to
//! `harness::presentation::App::dispatch` — no business logic lives here
//! beyond argument shape and range validation. A bare `k=v` positional (e.g.
//! `model.temperature=0.7`) becomes a config override; the value is parsed as
//! JSON when possible (`0.7`, `true`, `"x"`) and falls back to a plain string
//! otherwise, so a caller can write `timeout=30` without quoting.

use clap::{Parser, Subcommand};
use serde_json::{Map, Value as Json};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "harness", about = "Run, compare, and report on LLM evaluation suites")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a suite of cases against a pipeline
    Run {
        pipeline: String,
        cases: PathBuf,
        #[arg(short = 'c', long, default_value_t = 1)]
        concurrency: usize,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        keywords: Option<String>,
        #[arg(long)]
        save: bool,
        /// `key=value` configuration overrides, dotted paths allowed
        overrides: Vec<String>,
    },
    /// Re-run a prior run's cases
    Rerun {
        /// Run id/prefix, or `latest`
        run: String,
        #[arg(short = 'c', long, default_value_t = 1)]
        concurrency: usize,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        save: bool,
        overrides: Vec<String>,
    },
    /// Compare two prior runs
    Compare { first: String, second: String },
    /// List all stored runs
    History,
    /// List all registered models
    Models,
    /// List all registered pipelines
    Pipelines,
    /// Print a fixed-width summary of a run
    Summarize {
        /// Run id/prefix, or `latest`
        run: String,
    },
    /// Print a full formatted transcript of a run
    Format {
        /// Run id/prefix, or `latest`
        run: String,
        case_prefix: Option<String>,
        #[arg(long)]
        keywords: Option<String>,
    },
    /// Assign missing case ids in a suite file
    AddIds {
        cases: PathBuf,
        #[arg(long)]
        in_place: bool,
    },
}

#[derive(Debug, Clone)]
pub enum ValidatedLogSelector {
    Latest,
    IdOrPrefix(String),
}

#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Run {
        pipeline: String,
        cases: PathBuf,
        overrides: Map<String, Json>,
        concurrency: usize,
        save: bool,
        id_prefix: Option<String>,
        keywords: Option<String>,
    },
    Rerun {
        run: ValidatedLogSelector,
        overrides: Map<String, Json>,
        concurrency: usize,
        save: bool,
        id_prefix: Option<String>,
    },
    Compare { first: ValidatedLogSelector, second: ValidatedLogSelector },
    History,
    Models,
    Pipelines,
    Summarize { run: ValidatedLogSelector },
    Format { run: ValidatedLogSelector, case_prefix: Option<String>, keywords: Option<String> },
    AddIds { cases: PathBuf, in_place: bool },
}

#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid override '{0}': expected key=value")]
    MalformedOverride(String),
    #[error("concurrency must be at least 1, got {0}")]
    ZeroConcurrency(usize),
}

fn selector(raw: &str) -> ValidatedLogSelector {
    if raw.eq_ignore_ascii_case("latest") {
        ValidatedLogSelector::Latest
    } else {
        ValidatedLogSelector::IdOrPrefix(raw.to_string())
    }
}

fn parse_overrides(raw: &[String]) -> Result<Map<String, Json>, ParseError> {
    let mut overrides = Map::new();
    for entry in raw {
        let (key, value) =
            entry.split_once('=').ok_or_else(|| ParseError::MalformedOverride(entry.clone()))?;
        if key.is_empty() {
            return Err(ParseError::MalformedOverride(entry.clone()));
        }
        let parsed = serde_json::from_str::<Json>(value).unwrap_or_else(|_| Json::String(value.to_string()));
        overrides.insert(key.to_string(), parsed);
    }
    Ok(overrides)
}

fn validate_concurrency(concurrency: usize) -> Result<usize, ParseError> {
    if concurrency == 0 {
        Err(ParseError::ZeroConcurrency(concurrency))
    } else {
        Ok(concurrency)
    }
}

pub fn validate(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let command = match cli.command {
        Commands::Run { pipeline, cases, concurrency, id, keywords, save, overrides } => {
            ValidatedCommand::Run {
                pipeline,
                cases,
                overrides: parse_overrides(&overrides)?,
                concurrency: validate_concurrency(concurrency)?,
                save,
                id_prefix: id,
                keywords,
            }
        }
        Commands::Rerun { run, concurrency, id, save, overrides } => ValidatedCommand::Rerun {
            run: selector(&run),
            overrides: parse_overrides(&overrides)?,
            concurrency: validate_concurrency(concurrency)?,
            save,
            id_prefix: id,
        },
        Commands::Compare { first, second } => {
            ValidatedCommand::Compare { first: selector(&first), second: selector(&second) }
        }
        Commands::History => ValidatedCommand::History,
        Commands::Models => ValidatedCommand::Models,
        Commands::Pipelines => ValidatedCommand::Pipelines,
        Commands::Summarize { run } => ValidatedCommand::Summarize { run: selector(&run) },
        Commands::Format { run, case_prefix, keywords } => {
            ValidatedCommand::Format { run: selector(&run), case_prefix, keywords }
        }
        Commands::AddIds { cases, in_place } => ValidatedCommand::AddIds { cases, in_place },
    };
    Ok(ValidatedCli { command })
}

pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    validate(Cli::parse())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_with_numeric_value_parses_as_json_number() {
        let overrides = parse_overrides(&["timeout=30".to_string()]).unwrap();
        assert_eq!(overrides.get("timeout"), Some(&Json::from(30)));
    }

    #[test]
    fn override_with_bare_word_falls_back_to_string() {
        let overrides = parse_overrides(&["model.name=gpt".to_string()]).unwrap();
        assert_eq!(overrides.get("model.name"), Some(&Json::String("gpt".to_string())));
    }

    #[test]
    fn override_without_equals_sign_is_rejected() {
        assert!(parse_overrides(&["bogus".to_string()]).is_err());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        assert!(validate_concurrency(0).is_err());
        assert!(validate_concurrency(1).is_ok());
    }

    #[test]
    fn latest_selector_is_case_insensitive() {
        assert!(matches!(selector("LATEST"), ValidatedLogSelector::Latest));
        assert!(matches!(selector("abc123"), ValidatedLogSelector::IdOrPrefix(_)));
    }
}
