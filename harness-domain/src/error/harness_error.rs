// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Harness Error Taxonomy
//!
//! A single, hierarchical error enum for the evaluation harness, following the
//! domain error pattern used throughout this workspace: one `thiserror` enum
//! per layer, categorized by failure mode rather than by the module that
//! raised it.
//!
//! ## Categories
//!
//! - **Configuration**: `InvalidPatch`, `MissingRequired`, `Misconfigured`
//! - **DAG construction**: `InvalidSpec`
//! - **Case/input validation**: `InvalidInput`
//! - **Registry**: `NotFound`, `Duplicate`
//! - **Execution**: `StageFailure`, `DeadlockInternal`, `CancelledBatch`
//! - **Realtime protocol**: surfaced as event-log entries, not raised from
//!   `infer` (see `harness::infrastructure::adapters::realtime`); this enum
//!   still carries `ProtocolError` for the cases where a caller must be told
//!   synchronously (e.g. misconfigured adapter credentials).

use std::fmt;

use thiserror::Error;

/// Errors produced anywhere in the evaluation harness.
#[derive(Error, Debug, Clone)]
pub enum HarnessError {
    /// A dotted-patch override attempted to overwrite a config subtree.
    #[error("Invalid patch for '{path}': value would overwrite a subtree. {hint}")]
    InvalidPatch { path: String, hint: String },

    /// One or more Required-from-user sentinels remain unresolved after merge.
    #[error("{0}")]
    MissingRequired(String),

    /// A DAG specification is malformed.
    #[error("{0}")]
    InvalidSpec(String),

    /// Input data (cases, context) failed validation.
    #[error("{0}")]
    InvalidInput(String),

    /// Adapter credentials/endpoint are missing, or an unsupported model type
    /// was requested.
    #[error("{0}")]
    Misconfigured(String),

    /// A named model or pipeline could not be found.
    #[error("{0}")]
    NotFound(String),

    /// A duplicate registration was attempted.
    #[error("{0}")]
    Duplicate(String),

    /// A stage function raised while executing a case.
    #[error("{0}")]
    StageFailure(String),

    /// A realtime-adapter connection or session misconfiguration that must be
    /// raised synchronously (as opposed to degrading to an event-log entry).
    #[error("{0}")]
    ProtocolError(String),

    /// The DAG engine's internal bookkeeping reached an inconsistent state.
    /// Unreachable for a DAG that passed validation; indicates a bug in the
    /// engine itself.
    #[error("internal error: {0}")]
    DeadlockInternal(String),

    /// A whole-batch exception surfaced during `process_all_cases`.
    #[error("{0}")]
    CancelledBatch(String),

    /// Wraps an I/O failure (reading/writing run logs, config files, audio).
    #[error("IO error: {0}")]
    Io(String),

    /// Wraps a JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<std::io::Error> for HarnessError {
    fn from(e: std::io::Error) -> Self {
        HarnessError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(e: serde_json::Error) -> Self {
        HarnessError::Json(e.to_string())
    }
}

/// A `{message, traceback, time}` record attached to a failed `RunResult` or
/// to run-log metadata when a whole batch aborts. `traceback` is a
/// best-effort rendering (Rust has no Python-style tracebacks); it carries
/// the error's `Display` chain plus the active `OpContext` stack.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExceptionRecord {
    pub message: String,
    pub traceback: String,
    pub time: String,
}

impl ExceptionRecord {
    pub fn new(err: &HarnessError, context_stack: &[String]) -> Self {
        let message = format_with_context(err, context_stack);
        ExceptionRecord {
            message: err.to_string(),
            traceback: message,
            time: crate::services::clock::now_utc_iso(),
        }
    }
}

fn format_with_context(err: &HarnessError, context_stack: &[String]) -> String {
    if context_stack.is_empty() {
        err.to_string()
    } else {
        format!("{} > {}", context_stack.join(" > "), err)
    }
}

impl fmt::Display for ExceptionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
