// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Model and Credentials Configuration
//!
//! Loads the model registry's wiring: a JSON array of model descriptors
//! (`{"name": ..., "type": ..., ...}`) and a JSON credentials map keyed by
//! model name, merging each model's `key` field into its descriptor before
//! registration (spec.md §6.3). Grounded on `gotaglio/models.py::register_models`.

use std::path::Path;

use harness_domain::error::HarnessResult;
use serde::Deserialize;
use serde_json::Value as Json;

/// One model's descriptor as read from the models file, after credential
/// merging. `extra` carries every field besides `name`/`model_type` —
/// adapters read whatever they need out of it (endpoint, deployment id,
/// sample rate, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub model_type: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Json>,
}

/// A name → API key map, loaded from a separate credentials file so keys
/// never need to live alongside the (often checked-in) models file.
pub type ModelCredentials = serde_json::Map<String, Json>;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub models: Vec<ModelDescriptor>,
}

impl AppConfig {
    /// Reads `models_path` and, if given, `credentials_path`, merging each
    /// model's credential under the `"key"` field. A model with no matching
    /// credential entry is left without a `"key"` — adapters that require
    /// one surface that as a registration-time error, not a loader error,
    /// since not every model type needs a key (e.g. a mock model).
    pub fn load(models_path: &Path, credentials_path: Option<&Path>) -> HarnessResult<Self> {
        let raw = std::fs::read_to_string(models_path)?;
        let mut models: Vec<ModelDescriptor> = serde_json::from_str(&raw)?;

        if let Some(path) = credentials_path {
            let raw = std::fs::read_to_string(path)?;
            let credentials: ModelCredentials = serde_json::from_str(&raw)?;
            for model in &mut models {
                if let Some(key) = credentials.get(&model.name) {
                    model.extra.insert("key".to_string(), key.clone());
                }
            }
        }

        Ok(Self { models })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn merges_credential_key_into_matching_model() {
        let mut models_file = tempfile::NamedTempFile::new().unwrap();
        write!(
            models_file,
            r#"[{{"name": "gpt", "type": "openai_chat", "temperature": 0.0}}]"#
        )
        .unwrap();
        let mut creds_file = tempfile::NamedTempFile::new().unwrap();
        write!(creds_file, r#"{{"gpt": "sk-test"}}"#).unwrap();

        let config = AppConfig::load(models_file.path(), Some(creds_file.path())).unwrap();
        assert_eq!(config.models.len(), 1);
        assert_eq!(config.models[0].extra.get("key").and_then(|v| v.as_str()), Some("sk-test"));
    }

    #[test]
    fn model_without_matching_credential_has_no_key() {
        let mut models_file = tempfile::NamedTempFile::new().unwrap();
        write!(models_file, r#"[{{"name": "mock", "type": "mock"}}]"#).unwrap();
        let mut creds_file = tempfile::NamedTempFile::new().unwrap();
        write!(creds_file, r#"{{"other": "sk-test"}}"#).unwrap();

        let config = AppConfig::load(models_file.path(), Some(creds_file.path())).unwrap();
        assert!(config.models[0].extra.get("key").is_none());
    }
}
