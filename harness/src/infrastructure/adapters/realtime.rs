// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Realtime Streaming Model Adapter
//!
//! [`session_params`] resolves and validates voice/modality/turn-detection
//! options before any connection opens; [`protocol`] builds/classifies wire
//! frames; [`client`] drives the WebSocket state machine and implements
//! `ModelAdapter` (spec.md §4.G).

pub mod client;
pub mod protocol;
pub mod session_params;

pub use client::{AudioConverter, RealtimeAdapterConfig, RealtimeModelAdapter};
