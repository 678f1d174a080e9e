// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Bootstrap Module
//!
//! Sits **outside** the `harness`/`harness-domain` layers and owns everything
//! that has to exist before a pipeline or a model does: CLI parsing, process
//! configuration, signal handling, and exit code mapping. Enterprise layers
//! never depend back on this crate.
//!
//! ## Module structure
//!
//! - `cli` - argument parsing and validation (clap-derived)
//! - `config` - bootstrap-phase process configuration
//! - `exit_code` - `HarnessError` → process exit code mapping
//! - `shutdown` - graceful shutdown coordination
//! - `signals` - SIGTERM/SIGINT/SIGHUP handling
//!
//! ## Usage
//!
//! ```no_run
//! use harness_bootstrap::{bootstrap_cli, result_to_exit_code};
//!
//! #[tokio::main]
//! async fn main() -> std::process::ExitCode {
//!     let validated_cli = match bootstrap_cli() {
//!         Ok(cli) => cli,
//!         Err(e) => {
//!             eprintln!("error: {e}");
//!             return std::process::ExitCode::from(65);
//!         }
//!     };
//!     let _ = validated_cli;
//!     std::process::ExitCode::from(0)
//! }
//! ```

pub mod cli;
pub mod config;
pub mod exit_code;
pub mod shutdown;
pub mod signals;

pub use cli::{parse_and_validate, ValidatedCli, ValidatedCommand};
pub use exit_code::{map_error_to_exit_code, result_to_exit_code, ExitCode};

/// Parses and validates argv. Clap handles `--help`/`--version` itself and
/// exits the process before returning.
pub fn bootstrap_cli() -> Result<ValidatedCli, cli::ParseError> {
    cli::parse_and_validate()
}
