// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Repositories
//!
//! Concrete implementations of the domain's repository ports.
//! [`run_log_fs`] implements `RunLogRepository` against the filesystem: one
//! JSON file per run, named by its `RunId` (spec.md §3.7, §6.2, §6.3).

pub mod run_log_fs;

pub use run_log_fs::FsRunLogRepository;
