// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Chat Completion Model Adapters
//!
//! `AZURE_AI` and `AZURE_OPEN_AI` model types (spec.md §6.3), grounded on
//! `gotaglio/models.py::AzureAI`/`AzureOpenAI`. Both are a single HTTP POST
//! to a chat-completions endpoint; they differ only in URL shape and which
//! fields the endpoint expects, so they share `ChatCompletionAdapter` and
//! are distinguished by `ChatCompletionKind`.

use std::collections::HashMap;

use async_trait::async_trait;
use harness_domain::entities::context::Context;
use harness_domain::error::{HarnessError, HarnessResult};
use harness_domain::repositories::model_registry::{Message, ModelAdapter};
use serde_json::Value as Json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCompletionKind {
    AzureAi,
    AzureOpenAi,
}

impl ChatCompletionKind {
    /// The model type string this kind was registered under
    /// (`model_registration::register_one`), surfaced through
    /// `metadata()["type"]` so callers can tell adapters apart without
    /// downcasting (spec.md §4.E audio-capability check).
    fn type_name(self) -> &'static str {
        match self {
            ChatCompletionKind::AzureAi => "AZURE_AI",
            ChatCompletionKind::AzureOpenAi => "AZURE_OPEN_AI",
        }
    }
}

pub struct ChatCompletionConfig {
    pub kind: ChatCompletionKind,
    pub endpoint: String,
    pub key: String,
    pub api: Option<String>,
    pub deployment: Option<String>,
    /// Every field from the models file besides `key`, surfaced verbatim by
    /// `metadata()` (spec.md §8 "No secret leakage").
    pub extra: serde_json::Map<String, Json>,
}

impl ChatCompletionConfig {
    pub fn from_json(kind: ChatCompletionKind, config: &serde_json::Map<String, Json>) -> HarnessResult<Self> {
        let field = |name: &str| -> HarnessResult<String> {
            config
                .get(name)
                .and_then(Json::as_str)
                .map(str::to_string)
                .ok_or_else(|| HarnessError::Misconfigured(format!("model adapter missing required field '{name}'")))
        };
        let mut extra = config.clone();
        extra.remove("key");
        Ok(Self {
            kind,
            endpoint: field("endpoint")?,
            key: field("key")?,
            api: config.get("api").and_then(Json::as_str).map(str::to_string),
            deployment: config.get("deployment").and_then(Json::as_str).map(str::to_string),
            extra,
        })
    }
}

pub struct ChatCompletionAdapter {
    config: ChatCompletionConfig,
    client: reqwest::Client,
}

impl ChatCompletionAdapter {
    pub fn new(config: ChatCompletionConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn request_url(&self) -> HarnessResult<String> {
        match self.config.kind {
            ChatCompletionKind::AzureAi => Ok(format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))),
            ChatCompletionKind::AzureOpenAi => {
                let deployment = self.config.deployment.as_deref().ok_or_else(|| {
                    HarnessError::Misconfigured("AZURE_OPEN_AI model is missing required field 'deployment'".to_string())
                })?;
                let api = self.config.api.as_deref().unwrap_or("2024-06-01");
                Ok(format!(
                    "{}/openai/deployments/{}/chat/completions?api-version={}",
                    self.config.endpoint.trim_end_matches('/'),
                    deployment,
                    api
                ))
            }
        }
    }
}

#[async_trait]
impl ModelAdapter for ChatCompletionAdapter {
    async fn infer(&self, messages: &[Message], _context: &mut Context) -> HarnessResult<String> {
        let url = self.request_url()?;
        let body = serde_json::json!({
            "messages": messages,
            "max_tokens": 800,
            "temperature": 0.7,
            "top_p": 0.95,
            "frequency_penalty": 0,
            "presence_penalty": 0,
            "stream": false,
        });

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.config.key)
            .json(&body)
            .send()
            .await
            .map_err(|err| HarnessError::ProtocolError(format!("chat completion request failed: {err}")))?;

        let status = response.status();
        let payload: Json = response
            .json()
            .await
            .map_err(|err| HarnessError::ProtocolError(format!("parsing chat completion response: {err}")))?;

        if !status.is_success() {
            return Err(HarnessError::ProtocolError(format!("chat completion returned {status}: {payload}")));
        }

        payload
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(Json::as_str)
            .map(str::to_string)
            .ok_or_else(|| HarnessError::ProtocolError("chat completion response had no message content".to_string()))
    }

    fn metadata(&self) -> HashMap<String, Json> {
        let mut map: HashMap<String, Json> = self.config.extra.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        map.insert("type".to_string(), Json::String(self.config.kind.type_name().to_string()));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn azure_open_ai_requires_deployment() {
        let mut fields = serde_json::Map::new();
        fields.insert("endpoint".to_string(), json!("https://x"));
        fields.insert("key".to_string(), json!("sk"));
        let config = ChatCompletionConfig::from_json(ChatCompletionKind::AzureOpenAi, &fields).unwrap();
        let adapter = ChatCompletionAdapter::new(config);
        assert!(adapter.request_url().is_err());
    }

    #[test]
    fn metadata_never_contains_the_key() {
        let mut fields = serde_json::Map::new();
        fields.insert("endpoint".to_string(), json!("https://x"));
        fields.insert("key".to_string(), json!("sk-secret"));
        fields.insert("name".to_string(), json!("gpt"));
        let config = ChatCompletionConfig::from_json(ChatCompletionKind::AzureAi, &fields).unwrap();
        let adapter = ChatCompletionAdapter::new(config);
        assert!(!adapter.metadata().contains_key("key"));
    }
}
