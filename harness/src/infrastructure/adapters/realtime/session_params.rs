// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Realtime Session Parameter Resolution
//!
//! Resolves `voice`/`modalities`/`turn_detection` by precedence
//! (per-call context, context-level `realtime` overrides, model config,
//! then built-in defaults) and validates the result before a connection is
//! ever opened, per spec.md §4.G.2.

use harness_domain::error::{HarnessError, HarnessResult};
use serde_json::{Map, Value as Json};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionParams {
    pub voice: String,
    pub modalities: Vec<String>,
    pub turn_detection: Json,
    pub instructions: Option<String>,
}

const VALID_MODALITIES: [&str; 2] = ["text", "audio"];
const SERVER_VAD_KEYS: [&str; 6] = [
    "threshold",
    "prefix_padding_ms",
    "silence_duration_ms",
    "create_response",
    "interrupt_response",
    "type",
];
const SEMANTIC_VAD_KEYS: [&str; 4] = ["eagerness", "create_response", "interrupt_response", "type"];

/// Looks up `key` in `context`, then `context.realtime`, then
/// `model_config`, returning the first non-null value found.
fn resolve(key: &str, context: &Json, realtime: &Json, model_config: &Json) -> Option<Json> {
    for source in [context, realtime, model_config] {
        if let Some(value) = source.get(key) {
            if !value.is_null() {
                return Some(value.clone());
            }
        }
    }
    None
}

pub fn resolve_session_params(context: &Json, model_config: &Json) -> HarnessResult<SessionParams> {
    let empty = Json::Object(Map::new());
    let realtime = context.get("realtime").cloned().unwrap_or(empty.clone());

    let voice = resolve("voice", context, &realtime, model_config)
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "alloy".to_string());
    if voice.is_empty() {
        return Err(HarnessError::InvalidInput("realtime voice must be non-empty".to_string()));
    }

    let modalities = resolve("modalities", context, &realtime, model_config)
        .map(validate_modalities)
        .transpose()?
        .unwrap_or_else(|| vec!["text".to_string()]);

    let turn_detection = resolve("turn_detection", context, &realtime, model_config)
        .map(validate_turn_detection)
        .transpose()?
        .unwrap_or_else(|| serde_json::json!({"type": "none"}));

    let instructions = resolve("instructions", context, &realtime, model_config).and_then(|v| v.as_str().map(str::to_string));

    Ok(SessionParams {
        voice,
        modalities,
        turn_detection,
        instructions,
    })
}

fn validate_modalities(value: Json) -> HarnessResult<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| HarnessError::InvalidInput("modalities must be a non-empty array".to_string()))?;
    if items.is_empty() {
        return Err(HarnessError::InvalidInput("modalities must be non-empty".to_string()));
    }
    let mut seen = Vec::new();
    for item in items {
        let s = item
            .as_str()
            .ok_or_else(|| HarnessError::InvalidInput("modalities entries must be strings".to_string()))?;
        if !VALID_MODALITIES.contains(&s) {
            return Err(HarnessError::InvalidInput(format!("unknown modality '{s}'")));
        }
        if !seen.contains(&s.to_string()) {
            seen.push(s.to_string());
        }
    }
    Ok(seen)
}

fn validate_turn_detection(value: Json) -> HarnessResult<Json> {
    if value.is_null() {
        return Ok(serde_json::json!({"type": "none"}));
    }
    let obj = value
        .as_object()
        .ok_or_else(|| HarnessError::InvalidInput("turn_detection must be an object".to_string()))?;
    let kind = obj.get("type").and_then(Json::as_str).unwrap_or("");
    let allowed: &[&str] = match kind {
        "server_vad" => &SERVER_VAD_KEYS,
        "semantic_vad" => &SEMANTIC_VAD_KEYS,
        "none" => return Ok(serde_json::json!({"type": "none"})),
        other => return Err(HarnessError::InvalidInput(format!("unsupported turn_detection type '{other}'"))),
    };
    let mut kept = Map::new();
    for (key, v) in obj {
        if allowed.contains(&key.as_str()) {
            kept.insert(key.clone(), v.clone());
        }
    }
    Ok(Json::Object(kept))
}
