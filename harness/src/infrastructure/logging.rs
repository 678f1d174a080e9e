// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Logging
//!
//! Structured logging for the harness CLI, built on `tracing` /
//! `tracing-subscriber`. See [`observability`] for the subscriber setup and
//! per-case operation tracking.

pub mod observability;
pub use observability::*;
