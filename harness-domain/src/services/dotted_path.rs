// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Dotted-Path Utilities
//!
//! Get/set/flatten helpers over `serde_json::Value`, the shared primitive
//! behind config overrides (`--override a.b.c=1`), case field lookup
//! (`Case::get`), and config-tree diffing. Grounded on the harness's
//! original `flatten_dict`/`apply_patch_in_place`/dotted-key addressing.

use serde_json::{Map, Value as Json};

/// Reads a value at a dotted path (`"a.b.c"`). Returns `None` if any
/// intermediate segment is missing or not an object.
pub fn get<'a>(value: &'a Json, path: &str) -> Option<&'a Json> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Writes a value at a dotted path, creating intermediate objects as
/// needed. Fails (returns `Err`) if a path segment already holds a
/// non-object value and more segments remain — mirrors
/// `apply_patch_in_place`'s "would overwrite a subtree" guard, though the
/// caller (config_merge) is responsible for turning that into a domain
/// error with a path-specific message.
pub fn set(root: &mut Json, path: &str, value: Json) -> Result<(), String> {
    let segments: Vec<&str> = path.split('.').collect();
    set_recursive(root, &segments, value)
}

fn set_recursive(node: &mut Json, segments: &[&str], value: Json) -> Result<(), String> {
    let (head, rest) = segments.split_first().expect("path must be non-empty");
    if !node.is_object() {
        *node = Json::Object(Map::new());
    }
    let obj = node.as_object_mut().expect("just ensured object");
    if rest.is_empty() {
        obj.insert((*head).to_string(), value);
        return Ok(());
    }
    let child = obj.entry((*head).to_string()).or_insert_with(|| Json::Object(Map::new()));
    if !child.is_object() && !child.is_null() {
        return Err(format!(
            "segment '{head}' already holds a scalar value, cannot descend into it"
        ));
    }
    set_recursive(child, rest, value)
}

/// Flattens a nested JSON object into `{"a.b.c": value, ...}`, the inverse
/// of repeated `set` calls. Non-object leaves (including arrays) terminate
/// flattening at that key.
pub fn flatten(value: &Json) -> Map<String, Json> {
    let mut out = Map::new();
    flatten_into(value, String::new(), &mut out);
    out
}

fn flatten_into(value: &Json, prefix: String, out: &mut Map<String, Json>) {
    match value {
        Json::Object(obj) if !obj.is_empty() => {
            for (key, child) in obj {
                let next_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(child, next_prefix, out);
            }
        }
        _ => {
            out.insert(prefix, value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_resolves_nested_path() {
        let value = json!({"a": {"b": {"c": 1}}});
        assert_eq!(get(&value, "a.b.c"), Some(&json!(1)));
    }

    #[test]
    fn get_missing_path_is_none() {
        let value = json!({"a": 1});
        assert_eq!(get(&value, "a.b"), None);
    }

    #[test]
    fn set_creates_intermediate_objects() {
        let mut value = json!({});
        set(&mut value, "a.b.c", json!(42)).unwrap();
        assert_eq!(value, json!({"a": {"b": {"c": 42}}}));
    }

    #[test]
    fn set_rejects_descending_into_scalar() {
        let mut value = json!({"a": 1});
        assert!(set(&mut value, "a.b", json!(2)).is_err());
    }

    #[test]
    fn flatten_round_trips_with_set() {
        let nested = json!({"a": {"b": 1, "c": 2}, "d": 3});
        let flat = flatten(&nested);
        let mut rebuilt = json!({});
        for (key, value) in &flat {
            set(&mut rebuilt, key, value.clone()).unwrap();
        }
        assert_eq!(rebuilt, nested);
    }
}
