// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Configuration Merge, Validation, and Diff
//!
//! A pipeline's effective configuration is its defaults layered under a
//! user-supplied override patch (spec.md §3.2, §4.A), then checked for
//! unresolved `Required` sentinels. Grounded on the harness's original
//! `apply_patch`/`apply_patch_in_place` (dotted overrides, refuses to
//! overwrite a subtree) and `ensure_required_configs` (collects every
//! unresolved prompt before raising, rather than failing on the first one).

use serde_json::Value as Json;

use crate::error::HarnessError;
use crate::value_objects::config_value::{ConfigNode, ConfigTree, ConfigValue};

/// Applies a flat `{"a.b.c": value, ...}` override patch onto a config tree.
/// A patch key may only reach a leaf: if the dotted path still has segments
/// left after hitting a `ConfigNode::Leaf`, or the root is being asked to
/// replace a `Nested` subtree with a scalar, the patch is rejected with the
/// offending path named (spec.md §4.A "Patches must target leaves").
pub fn apply_patch(tree: &mut ConfigTree, patch: &serde_json::Map<String, Json>) -> Result<(), HarnessError> {
    for (path, value) in patch {
        apply_one(tree, path, value.clone())?;
    }
    Ok(())
}

fn apply_one(tree: &mut ConfigTree, path: &str, value: Json) -> Result<(), HarnessError> {
    let segments: Vec<&str> = path.split('.').collect();
    set_node(tree, &segments, path, value)
}

fn set_node(
    tree: &mut ConfigTree,
    segments: &[&str],
    full_path: &str,
    value: Json,
) -> Result<(), HarnessError> {
    let (head, rest) = segments.split_first().expect("path must be non-empty");
    if rest.is_empty() {
        match tree.get(*head) {
            Some(ConfigNode::Nested(subtree)) => {
                let mut leaves = Vec::new();
                collect_leaf_paths(subtree, head.to_string(), &mut leaves);
                return Err(HarnessError::InvalidPatch {
                    path: full_path.to_string(),
                    hint: format!("target is a config subtree, not a leaf value: {}", leaves.join(", ")),
                });
            }
            _ => {
                tree.insert((*head).to_string(), ConfigNode::leaf(value));
                return Ok(());
            }
        }
    }
    match tree.entry((*head).to_string()).or_insert_with(|| ConfigNode::Nested(ConfigTree::new())) {
        ConfigNode::Nested(subtree) => set_node(subtree, rest, full_path, value),
        ConfigNode::Leaf(_) => Err(HarnessError::InvalidPatch {
            path: full_path.to_string(),
            hint: format!("'{head}' is a leaf value, cannot descend into it"),
        }),
    }
}

/// Lists every leaf's dotted path under `tree`, used to enumerate the hint
/// paths when a patch tries to overwrite a subtree (spec.md §4.A, §8
/// scenario 4: `{m: {x, y}}` overwritten by `m: "oops"` hints `m.x`, `m.y`).
fn collect_leaf_paths(tree: &ConfigTree, prefix: String, out: &mut Vec<String>) {
    for (key, node) in tree {
        let path = format!("{prefix}.{key}");
        match node {
            ConfigNode::Leaf(_) => out.push(path),
            ConfigNode::Nested(subtree) => collect_leaf_paths(subtree, path, out),
        }
    }
}

/// Walks a merged config tree and collects the dotted paths of every
/// `Required` sentinel that was never overridden, then fails with all of
/// them at once (spec.md §4.A, mirrors `ensure_required_configs` collecting
/// every missing prompt rather than stopping at the first).
pub fn ensure_required_resolved(tree: &ConfigTree) -> Result<(), HarnessError> {
    let mut missing = Vec::new();
    collect_required(tree, String::new(), &mut missing);
    if missing.is_empty() {
        return Ok(());
    }
    let lines: Vec<String> = missing
        .iter()
        .map(|(path, description)| format!("  {path}: {description}"))
        .collect();
    Err(HarnessError::MissingRequired(format!(
        "Missing required configuration values:\n{}",
        lines.join("\n")
    )))
}

fn collect_required(tree: &ConfigTree, prefix: String, out: &mut Vec<(String, String)>) {
    for (key, node) in tree {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match node {
            ConfigNode::Leaf(ConfigValue::Required { description }) => {
                out.push((path, description.clone()));
            }
            ConfigNode::Nested(subtree) => collect_required(subtree, path, out),
            ConfigNode::Leaf(_) => {}
        }
    }
}

/// Renders a config tree to plain JSON for display/serialization, replacing
/// any still-`Required` leaf with the literal `"PROMPT"` sentinel and
/// dropping `Internal` leaves to `null` (spec.md §4.A `diff_configs`).
pub fn to_display_json(tree: &ConfigTree) -> Json {
    let mut obj = serde_json::Map::new();
    for (key, node) in tree {
        let value = match node {
            ConfigNode::Leaf(v) => v.display_for_diff(),
            ConfigNode::Nested(subtree) => to_display_json(subtree),
        };
        obj.insert(key.clone(), value);
    }
    Json::Object(obj)
}

/// One differing entry between a pipeline's defaults and its effective
/// (merged) configuration: the dotted path, the old value (absent if the
/// path only exists on the `effective` side), and the new value (absent if
/// only on the `defaults` side).
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDiffEntry {
    pub path: String,
    pub old: Option<Json>,
    pub new: Option<Json>,
}

/// Produces `(path, old, new)` triples between `defaults` and `effective`,
/// one entry per dotted leaf path whose value differs (spec.md §4.A
/// `diff(defaults, effective) → list of (path, old, new)`). `Internal`
/// leaves are excluded from both sides; `Required` sentinels render as the
/// literal tag `"PROMPT"`.
pub fn diff(defaults: &ConfigTree, effective: &ConfigTree) -> Vec<ConfigDiffEntry> {
    let mut old_flat = serde_json::Map::new();
    collect_diff_leaves(defaults, String::new(), &mut old_flat);
    let mut new_flat = serde_json::Map::new();
    collect_diff_leaves(effective, String::new(), &mut new_flat);

    let mut paths: Vec<&String> = old_flat.keys().chain(new_flat.keys()).collect();
    paths.sort();
    paths.dedup();

    paths
        .into_iter()
        .filter_map(|path| {
            let old = old_flat.get(path).cloned();
            let new = new_flat.get(path).cloned();
            if old == new {
                return None;
            }
            Some(ConfigDiffEntry {
                path: path.clone(),
                old,
                new,
            })
        })
        .collect()
}

/// Flattens a config tree to dotted leaf paths for `diff`, dropping
/// `Internal` leaves entirely rather than rendering them as `null`
/// (unlike [`to_display_json`], which keeps the key for general display).
fn collect_diff_leaves(tree: &ConfigTree, prefix: String, out: &mut serde_json::Map<String, Json>) {
    for (key, node) in tree {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match node {
            ConfigNode::Leaf(ConfigValue::Internal) => {}
            ConfigNode::Leaf(v) => {
                out.insert(path, v.display_for_diff());
            }
            ConfigNode::Nested(subtree) => collect_diff_leaves(subtree, path, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree_with_required() -> ConfigTree {
        let mut tree = ConfigTree::new();
        tree.insert("temperature".to_string(), ConfigNode::leaf(json!(0.7)));
        tree.insert(
            "api_key".to_string(),
            ConfigNode::required("the model provider's API key"),
        );
        tree
    }

    #[test]
    fn patch_overrides_leaf() {
        let mut tree = tree_with_required();
        let mut patch = serde_json::Map::new();
        patch.insert("temperature".to_string(), json!(0.1));
        apply_patch(&mut tree, &patch).unwrap();
        assert_eq!(
            tree.get("temperature"),
            Some(&ConfigNode::leaf(json!(0.1)))
        );
    }

    #[test]
    fn patch_resolves_required_sentinel() {
        let mut tree = tree_with_required();
        assert!(ensure_required_resolved(&tree).is_err());
        let mut patch = serde_json::Map::new();
        patch.insert("api_key".to_string(), json!("sk-test"));
        apply_patch(&mut tree, &patch).unwrap();
        assert!(ensure_required_resolved(&tree).is_ok());
    }

    #[test]
    fn patch_into_nested_subtree_is_rejected() {
        let mut tree = ConfigTree::new();
        let mut nested = ConfigTree::new();
        nested.insert("x".to_string(), ConfigNode::leaf(json!(1)));
        tree.insert("group".to_string(), ConfigNode::Nested(nested));

        let mut patch = serde_json::Map::new();
        patch.insert("group".to_string(), json!(5));
        let err = apply_patch(&mut tree, &patch).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidPatch { .. }));
    }

    #[test]
    fn patch_overwrite_guard_hint_enumerates_leaf_descendants() {
        // Defaults `{m: {x: 1, y: 2}}`, patch `{m: "oops"}` (spec.md §8 scenario 4).
        let mut tree = ConfigTree::new();
        let mut nested = ConfigTree::new();
        nested.insert("x".to_string(), ConfigNode::leaf(json!(1)));
        nested.insert("y".to_string(), ConfigNode::leaf(json!(2)));
        tree.insert("m".to_string(), ConfigNode::Nested(nested));

        let mut patch = serde_json::Map::new();
        patch.insert("m".to_string(), json!("oops"));
        let err = apply_patch(&mut tree, &patch).unwrap_err();
        match err {
            HarnessError::InvalidPatch { path, hint } => {
                assert_eq!(path, "m");
                assert!(hint.contains("m.x"), "hint was: {hint}");
                assert!(hint.contains("m.y"), "hint was: {hint}");
            }
            other => panic!("expected InvalidPatch, got {other:?}"),
        }
    }

    #[test]
    fn display_json_hides_required_behind_prompt() {
        let tree = tree_with_required();
        let json = to_display_json(&tree);
        assert_eq!(json["api_key"], Json::String("PROMPT".to_string()));
    }

    #[test]
    fn diff_reports_old_and_new_for_changed_paths() {
        let mut defaults = ConfigTree::new();
        defaults.insert("temperature".to_string(), ConfigNode::leaf(json!(0.7)));
        defaults.insert("unused".to_string(), ConfigNode::leaf(json!("kept")));

        let mut effective = ConfigTree::new();
        effective.insert("temperature".to_string(), ConfigNode::leaf(json!(0.1)));
        effective.insert("unused".to_string(), ConfigNode::leaf(json!("kept")));
        effective.insert("new_field".to_string(), ConfigNode::leaf(json!(true)));

        let entries = diff(&defaults, &effective);
        assert_eq!(entries.len(), 2);

        let temp = entries.iter().find(|e| e.path == "temperature").unwrap();
        assert_eq!(temp.old, Some(json!(0.7)));
        assert_eq!(temp.new, Some(json!(0.1)));

        let added = entries.iter().find(|e| e.path == "new_field").unwrap();
        assert_eq!(added.old, None);
        assert_eq!(added.new, Some(json!(true)));
    }

    #[test]
    fn diff_excludes_internal_leaves_from_both_sides() {
        let mut defaults = ConfigTree::new();
        defaults.insert("secret".to_string(), ConfigNode::Leaf(ConfigValue::Internal));

        let mut effective = ConfigTree::new();
        effective.insert("secret".to_string(), ConfigNode::Leaf(ConfigValue::Internal));

        assert!(diff(&defaults, &effective).is_empty());
    }
}
