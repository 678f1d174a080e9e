// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain events: append-only records of things that happened during a run,
//! as opposed to entities/aggregates, which hold current state.

pub mod realtime_event;

pub use realtime_event::{EventKind, EventLog, RealtimeEvent};
