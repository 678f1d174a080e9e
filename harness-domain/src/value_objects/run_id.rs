// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Run Identifier Value Object
//!
//! Each run log gets a fresh UUID v4 (spec.md §3.7). Unlike `CaseId`, a
//! `RunId` is always freshly generated by the harness itself, never parsed
//! from user input, but it still round-trips through the log file name
//! (`<run_uuid>.json`) and through "latest"/prefix resolution (§6.2).

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new_v4() -> Self {
        RunId(Uuid::new_v4())
    }

    pub fn as_str(&self) -> String {
        self.0.hyphenated().to_string()
    }

    pub fn file_stem(&self) -> String {
        self.as_str()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
