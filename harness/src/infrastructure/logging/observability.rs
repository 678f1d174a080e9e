// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Observability
//!
//! Structured logging setup and lightweight operation tracking for the
//! harness CLI. `init_tracing` wires a `tracing-subscriber` layer whose
//! format (human-readable or JSON) follows the `HARNESS_LOG_FORMAT`
//! environment variable, and whose level follows `RUST_LOG` (defaulting to
//! `info`). `OperationTracker` emits a start/end span pair around a run so
//! each case's timing shows up in the log stream without threading a timer
//! through every call site by hand.

use std::time::Instant;

use tracing::{info, info_span, Span};
use tracing_subscriber::EnvFilter;

/// Output format for the process's log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match std::env::var("HARNESS_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Human,
        }
    }
}

/// Installs the process-wide `tracing` subscriber. Safe to call once per
/// process; a second call is a no-op rather than a panic, since tests and
/// `main` can both want logging initialized.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match LogFormat::from_env() {
        LogFormat::Json => subscriber.json().try_init(),
        LogFormat::Human => subscriber.try_init(),
    };
    if let Err(err) = result {
        eprintln!("tracing subscriber already initialized: {err}");
    }
}

/// Tracks one case's wall-clock duration and logs it on drop, regardless of
/// whether the case succeeded. Grounded on the per-operation span pattern
/// used elsewhere in this crate's infrastructure layer for tracking
/// in-flight work.
pub struct OperationTracker {
    span: Span,
    started: Instant,
    case_id: String,
}

impl OperationTracker {
    pub fn start(pipeline: &str, case_id: &str) -> Self {
        let span = info_span!("case", pipeline = pipeline, case_id = case_id);
        let _enter = span.enter();
        info!("case started");
        drop(_enter);
        Self {
            span,
            started: Instant::now(),
            case_id: case_id.to_string(),
        }
    }

    pub fn finish(self, succeeded: bool) {
        let _enter = self.span.enter();
        info!(
            case_id = %self.case_id,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            succeeded,
            "case finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_defaults_to_human_when_unset() {
        std::env::remove_var("HARNESS_LOG_FORMAT");
        assert_eq!(LogFormat::from_env(), LogFormat::Human);
    }

    #[test]
    fn log_format_reads_json_from_env() {
        std::env::set_var("HARNESS_LOG_FORMAT", "json");
        assert_eq!(LogFormat::from_env(), LogFormat::Json);
        std::env::remove_var("HARNESS_LOG_FORMAT");
    }
}
