// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Model Registry Port
//!
//! `ModelAdapter` is the contract every inference backend implements
//! (spec.md §6.5); `ModelRegistry` is a two-level chain-of-maps lookup
//! (spec.md §4.B): a process-wide registry holds real models, a per-pipeline
//! child registry adds test doubles. Children never shadow a parent name —
//! duplicate registration at either level fails outright.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as Json;

use crate::entities::context::Context;
use crate::error::{HarnessError, HarnessResult};

/// A chat-style message, the unit `ModelAdapter::infer` consumes. Realtime
/// adapters ignore `messages` entirely and pull audio from `Context`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// A model adapter: something that can turn messages (plus optional
/// per-case context) into a text completion.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    async fn infer(&self, messages: &[Message], context: &mut Context) -> HarnessResult<String>;

    /// Adapter configuration with secrets stripped. `"key"` must never
    /// appear in the returned map (spec.md §8 "No secret leakage").
    fn metadata(&self) -> HashMap<String, Json>;
}

/// A two-level chain-of-maps registry. `parent: None` marks the process-wide
/// root registry; a pipeline-scoped registry sets `parent` to that root.
#[derive(Default)]
pub struct ModelRegistry {
    parent: Option<Arc<ModelRegistry>>,
    models: HashMap<String, Arc<dyn ModelAdapter>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        ModelRegistry {
            parent: None,
            models: HashMap::new(),
        }
    }

    pub fn child_of(parent: Arc<ModelRegistry>) -> Self {
        ModelRegistry {
            parent: Some(parent),
            models: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, model: Arc<dyn ModelAdapter>) -> HarnessResult<()> {
        let name = name.into();
        if self.models.contains_key(&name) {
            return Err(HarnessError::Duplicate(format!(
                "Attempting to register duplicate model '{name}'."
            )));
        }
        self.models.insert(name, model);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> HarnessResult<Arc<dyn ModelAdapter>> {
        self.lookup_helper(name).ok_or_else(|| {
            let mut names = self.list();
            names.sort();
            HarnessError::NotFound(format!(
                "Model '{name}' not found. Available models include {}.",
                format_list(&names)
            ))
        })
    }

    fn lookup_helper(&self, name: &str) -> Option<Arc<dyn ModelAdapter>> {
        if let Some(model) = self.models.get(name) {
            return Some(Arc::clone(model));
        }
        self.parent.as_ref().and_then(|p| p.lookup_helper(name))
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.keys().cloned().collect();
        if let Some(parent) = &self.parent {
            names.extend(parent.list());
        }
        names
    }
}

fn format_list(values: &[String]) -> String {
    match values.len() {
        0 => String::new(),
        1 => values[0].clone(),
        2 => format!("{} and {}", values[0], values[1]),
        _ => {
            let (last, rest) = values.split_last().unwrap();
            format!("{}, and {}", rest.join(", "), last)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub;

    #[async_trait]
    impl ModelAdapter for Stub {
        async fn infer(&self, _messages: &[Message], _context: &mut Context) -> HarnessResult<String> {
            Ok("stub".to_string())
        }

        fn metadata(&self) -> HashMap<String, Json> {
            HashMap::new()
        }
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = ModelRegistry::new();
        registry.register("a", Arc::new(Stub)).unwrap();
        let err = registry.register("a", Arc::new(Stub)).unwrap_err();
        assert!(matches!(err, HarnessError::Duplicate(_)));
    }

    #[test]
    fn child_never_shadows_parent_but_can_add_new_names() {
        let mut parent = ModelRegistry::new();
        parent.register("real", Arc::new(Stub)).unwrap();
        let parent = Arc::new(parent);

        let mut child = ModelRegistry::child_of(Arc::clone(&parent));
        child.register("perfect", Arc::new(Stub)).unwrap();

        assert!(child.lookup("real").is_ok());
        assert!(child.lookup("perfect").is_ok());
        let mut names = child.list();
        names.sort();
        assert_eq!(names, vec!["perfect".to_string(), "real".to_string()]);
    }

    #[test]
    fn lookup_of_unknown_name_lists_available() {
        let mut registry = ModelRegistry::new();
        registry.register("zeta", Arc::new(Stub)).unwrap();
        match registry.lookup("missing") {
            Err(HarnessError::NotFound(msg)) => assert!(msg.contains("zeta")),
            _ => panic!("expected NotFound"),
        }
    }
}
