// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Aggregates: consistency boundaries with invariants enforced at
//! construction time. `Dag` can only exist validated; `RunLog` can only be
//! appended to, never mutated in place.

pub mod dag;
pub mod run_log;

pub use dag::{Dag, DagNode, DagNodeSpec};
pub use run_log::{RunLog, RunMetadata as RunLogMetadata};
