// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Harness
//!
//! A CLI harness for running, comparing, and reporting on LLM evaluation
//! suites across pluggable pipelines.
//!
//! The harness core never constructs a pipeline or a model: an embedding
//! application registers both and the harness drives them. Follows Clean
//! Architecture, the same layering `harness-domain` establishes for its own
//! types:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Interface Layer (presentation)              │
//! │  (CLI dispatch, report rendering)                             │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Application Layer (application)             │
//! │  (pipeline assembly, the director, suite loading, reports)   │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Domain Layer (harness-domain)              │
//! │  (entities, value objects, services, repository ports)        │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Infrastructure Layer (infrastructure)          │
//! │  (model adapters, run log storage, config, logging)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Core concepts
//!
//! A **case** is one evaluation input with an optional expected output. A
//! **pipeline** (`PipelineSpec`) turns a case into a DAG of named stages and
//! knows how to summarize/format/score its own results; stage
//! implementations (model calls, scoring, post-processing) are supplied by
//! the embedding application, not by the pipeline spec itself. A **run**
//! processes every case in a suite against one assembled pipeline, bounded
//! to a fixed concurrency, and produces a **run log** that can be saved,
//! diffed against another run (`compare`), or re-executed (`rerun`).
//!
//! ## Error handling
//!
//! All fallible operations return `harness_domain::error::HarnessResult`, a
//! single hierarchical `HarnessError` enum. A case's own failure never
//! aborts a run — it is captured in that case's `RunResult`; only a bug in
//! the harness itself surfaces as `HarnessError::CancelledBatch` and aborts
//! the whole batch.

pub mod application;
pub mod infrastructure;
pub mod presentation;
