// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Model Registration
//!
//! Turns loaded [`AppConfig`] model descriptors into registered
//! `ModelAdapter`s (spec.md §6.3), grounded on
//! `gotaglio/models.py::register_models`. An unsupported `type` fails with
//! `HarnessError::Misconfigured`, named with the offending model.

use std::sync::Arc;

use harness_domain::error::{HarnessError, HarnessResult};
use harness_domain::repositories::model_registry::ModelRegistry;

use crate::infrastructure::adapters::chat_completion::{ChatCompletionAdapter, ChatCompletionConfig, ChatCompletionKind};
use crate::infrastructure::adapters::realtime::{RealtimeAdapterConfig, RealtimeModelAdapter};
use crate::infrastructure::config::app_config::AppConfig;

pub fn register_models(registry: &mut ModelRegistry, config: &AppConfig) -> HarnessResult<()> {
    for model in &config.models {
        let registered = register_one(model).map_err(|err| {
            HarnessError::Misconfigured(format!("While registering model '{}': {err}", model.name))
        })?;
        registry.register(model.name.clone(), registered)?;
    }
    Ok(())
}

fn register_one(model: &crate::infrastructure::config::app_config::ModelDescriptor) -> HarnessResult<Arc<dyn harness_domain::repositories::model_registry::ModelAdapter>> {
    match model.model_type.as_str() {
        "AZURE_AI" => {
            let config = ChatCompletionConfig::from_json(ChatCompletionKind::AzureAi, &model.extra)?;
            Ok(Arc::new(ChatCompletionAdapter::new(config)))
        }
        "AZURE_OPEN_AI" => {
            let config = ChatCompletionConfig::from_json(ChatCompletionKind::AzureOpenAi, &model.extra)?;
            Ok(Arc::new(ChatCompletionAdapter::new(config)))
        }
        "AZURE_OPEN_AI_REALTIME" => {
            let fields: std::collections::HashMap<String, serde_json::Value> = model.extra.clone().into_iter().collect();
            let config = RealtimeAdapterConfig::from_json(&fields)?;
            Ok(Arc::new(RealtimeModelAdapter::new(config)))
        }
        other => Err(HarnessError::Misconfigured(format!("unsupported model type: {other}"))),
    }
}
