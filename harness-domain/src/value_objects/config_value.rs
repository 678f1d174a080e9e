// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Configuration Value Object
//!
//! Replaces the `Prompt`/`Internal` marker-class pattern from its Python
//! predecessor with a proper tagged sum, per the redesign note
//! in spec.md §9: `ConfigValue = Scalar(v) | Required(description) |
//! Internal`. Walking a config tree becomes a recursive match instead of
//! `isinstance` checks.
//!
//! A `ConfigTree` is the nested-mapping shape from spec.md §3.2: string keys
//! to either a leaf `ConfigValue` or another nested `ConfigTree`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// One leaf of a configuration tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ConfigValue {
    /// A concrete, resolved value.
    Scalar(Json),
    /// Must be supplied by the caller (dotted override or replacement
    /// config) before the configuration is valid. Carries a human
    /// description used in the `MissingRequired` error message.
    Required { description: String },
    /// Filled in by the runtime; never displayed in diffs or help.
    Internal,
}

impl ConfigValue {
    pub fn scalar(value: impl Into<Json>) -> Self {
        ConfigValue::Scalar(value.into())
    }

    pub fn required(description: impl Into<String>) -> Self {
        ConfigValue::Required {
            description: description.into(),
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, ConfigValue::Required { .. })
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, ConfigValue::Internal)
    }

    pub fn as_scalar(&self) -> Option<&Json> {
        match self {
            ConfigValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Renders the way `diff_configs` renders an unresolved Required
    /// sentinel: the literal tag `"PROMPT"`.
    pub fn display_for_diff(&self) -> Json {
        match self {
            ConfigValue::Scalar(v) => v.clone(),
            ConfigValue::Required { .. } => Json::String("PROMPT".to_string()),
            ConfigValue::Internal => Json::Null,
        }
    }
}

/// A node in a configuration tree: either a concrete/sentinel leaf, or a
/// nested sub-tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigNode {
    Leaf(ConfigValue),
    Nested(ConfigTree),
}

impl ConfigNode {
    pub fn leaf(value: impl Into<Json>) -> Self {
        ConfigNode::Leaf(ConfigValue::scalar(value))
    }

    pub fn required(description: impl Into<String>) -> Self {
        ConfigNode::Leaf(ConfigValue::required(description))
    }

    pub fn internal() -> Self {
        ConfigNode::Leaf(ConfigValue::Internal)
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, ConfigNode::Nested(_))
    }
}

/// An ordered map from key to `ConfigNode`. `BTreeMap` is used (rather than
/// `HashMap`) so that flattened/diffed output is deterministic, matching the
/// reproducibility invariant in spec.md §8 ("two identical runs ... produce
/// identical results").
pub type ConfigTree = BTreeMap<String, ConfigNode>;
