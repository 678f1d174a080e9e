// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Runtime
//!
//! [`dag_executor`] carries out a `Dag` against a set of registered `Stage`s,
//! scheduling ready nodes in batches and fanning each batch out with
//! `tokio`/`futures` (spec.md §4.E, §6.4).

pub mod dag_executor;

pub use dag_executor::run_dag;
