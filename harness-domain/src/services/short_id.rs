// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Short-Id Resolution
//!
//! `add-ids`/`rerun --id`/`format --keywords` all need to let a human type a
//! few characters of a case UUID instead of the whole thing (spec.md §6.1,
//! §6.2). This mirrors the harness's original `IdShortener`: the *minimal
//! unique prefix* of a full id is the shortest leading substring that no
//! other id in the set shares, and resolving a prefix back to a full id
//! fails loudly on no match or ambiguous match rather than guessing.

use crate::error::HarnessError;

/// The shortest prefix length (starting at 1) at which `target` is
/// distinguishable from every other string in `all`. Returns the full
/// string's length if no shorter prefix is unique (including when `all`
/// has only one element).
pub fn minimal_unique_prefix(target: &str, all: &[String]) -> String {
    for len in 1..=target.chars().count() {
        let candidate: String = target.chars().take(len).collect();
        let collides = all
            .iter()
            .filter(|other| other.as_str() != target)
            .any(|other| other.starts_with(&candidate));
        if !collides {
            return candidate;
        }
    }
    target.to_string()
}

/// The display prefix length for a table listing every id in `all`: the
/// longest of each id's own minimal unique prefix, floored at 3 (spec.md
/// §4.F "Short-id rule"). Every row in the table truncates to this same
/// length, so ids remain visually aligned even though only some of them
/// needed the extra characters to stay unique.
pub fn uniform_prefix_length(all: &[String]) -> usize {
    all.iter()
        .map(|id| minimal_unique_prefix(id, all).chars().count())
        .max()
        .unwrap_or(0)
        .max(3)
}

/// Resolves a user-supplied prefix against a set of full ids. Errors if zero
/// or more than one id matches.
pub fn resolve_prefix(all: &[String], prefix: &str) -> Result<String, HarnessError> {
    let matches: Vec<&String> = all.iter().filter(|id| id.starts_with(prefix)).collect();
    match matches.as_slice() {
        [] => Err(HarnessError::NotFound(format!(
            "no id matches prefix '{prefix}'"
        ))),
        [only] => Ok((*only).clone()),
        many => Err(HarnessError::InvalidInput(format!(
            "prefix '{prefix}' is ambiguous, matches {} ids",
            many.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_shortest_distinguishing_prefix() {
        let all = vec!["abc123".to_string(), "abd456".to_string()];
        assert_eq!(minimal_unique_prefix("abc123", &all), "abc");
        assert_eq!(minimal_unique_prefix("abd456", &all), "abd");
    }

    #[test]
    fn single_id_gets_one_character_prefix() {
        let all = vec!["abc123".to_string()];
        assert_eq!(minimal_unique_prefix("abc123", &all), "a");
    }

    #[test]
    fn resolve_prefix_rejects_ambiguous_match() {
        let all = vec!["abc123".to_string(), "abc999".to_string()];
        assert!(resolve_prefix(&all, "abc").is_err());
    }

    #[test]
    fn resolve_prefix_finds_unique_match() {
        let all = vec!["abc123".to_string(), "xyz999".to_string()];
        assert_eq!(resolve_prefix(&all, "abc").unwrap(), "abc123");
    }

    #[test]
    fn uniform_prefix_length_is_floored_at_three() {
        let all = vec!["abc123".to_string(), "xyz999".to_string()];
        assert_eq!(uniform_prefix_length(&all), 3);
    }

    #[test]
    fn uniform_prefix_length_grows_to_the_longest_needed_prefix() {
        let all = vec!["abc123".to_string(), "abd456".to_string(), "xyz999".to_string()];
        assert_eq!(uniform_prefix_length(&all), 3);
    }

    #[test]
    fn uniform_prefix_length_widens_for_deep_collisions() {
        let all = vec!["abcd11".to_string(), "abcd22".to_string(), "xyz999".to_string()];
        assert_eq!(uniform_prefix_length(&all), 5);
    }
}
