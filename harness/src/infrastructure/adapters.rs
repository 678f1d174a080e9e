// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Adapters
//!
//! Concrete `ModelAdapter` implementations: [`chat_completion`] for
//! request/response models, [`realtime`] for the streaming WebSocket
//! adapter, and [`mock_models`] for the `perfect`/`flakey` test doubles
//! every pipeline's child registry gets (spec.md §4.D). [`model_registration`]
//! wires loaded model configuration to the right adapter by `type`.

pub mod chat_completion;
pub mod mock_models;
pub mod model_registration;
pub mod realtime;

pub use mock_models::{FlakeyModel, PerfectModel};
pub use model_registration::register_models;
