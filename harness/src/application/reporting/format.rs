// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Format
//!
//! Renders one case's full detail from a run log, optionally filtered by a
//! keyword expression and/or a short-id prefix (spec.md §6.1 `format`).
//! Delegates per-case rendering to `PipelineSpec::format_case` so the
//! harness core stays pipeline-agnostic.

use harness_domain::aggregates::run_log::RunLog;
use harness_domain::entities::run_result::RunResult;
use harness_domain::error::HarnessResult;
use harness_domain::services::bool_expr::Expr as KeywordExpr;
use harness_domain::services::pipeline_spec::PipelineSpec;

pub struct FormatOptions<'a> {
    pub id_prefix: Option<&'a str>,
    pub keywords: Option<&'a str>,
}

/// Renders the cases in `log` matching `options`, each separated by a blank
/// line. An explicit `id_prefix` narrows to exactly one case (erroring if
/// it's missing or ambiguous); `keywords` filters by the case's
/// `"keywords"` array, evaluated through the boolean-expression service.
pub fn render(log: &RunLog, spec: &dyn PipelineSpec, options: &FormatOptions) -> HarnessResult<String> {
    let selected: Vec<&RunResult> = if let Some(prefix) = options.id_prefix {
        vec![log.find_by_id_prefix(prefix)?]
    } else {
        log.results.iter().collect()
    };

    let filter = options.keywords.map(KeywordExpr::parse).transpose()?;
    let mut out = Vec::new();
    for result in selected {
        if let Some(expr) = &filter {
            let keywords = case_keywords(result);
            if !expr.evaluate(&keywords) {
                continue;
            }
        }
        out.push(spec.format_case(result));
    }
    Ok(out.join("\n\n"))
}

fn case_keywords(result: &RunResult) -> Vec<String> {
    result
        .case
        .get("keywords")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_domain::aggregates::run_log::RunMetadata as RunLogMetadata;
    use harness_domain::entities::case::Case;
    use harness_domain::entities::run_result::RunMetadata;
    use harness_domain::value_objects::config_value::ConfigTree;
    use harness_domain::value_objects::run_id::RunId;
    use serde_json::json;

    struct Demo;
    impl PipelineSpec for Demo {
        fn name(&self) -> &str {
            "demo"
        }
        fn description(&self) -> &str {
            "demo"
        }
        fn default_configuration(&self) -> ConfigTree {
            ConfigTree::new()
        }
        fn create_dag(&self, _configuration: &ConfigTree) -> harness_domain::error::HarnessResult<harness_domain::aggregates::dag::Dag> {
            unimplemented!()
        }
    }

    fn sample_log() -> RunLog {
        let mut log = RunLog::new(
            RunId::new_v4(),
            RunLogMetadata {
                pipeline: "demo".to_string(),
                config: json!({}),
                command_line: vec![],
                git_sha: None,
                git_diff_uncommitted: None,
                start: "2026-01-01T00:00:00Z".to_string(),
                end: None,
                elapsed: None,
                exception: None,
            },
        );
        let case_a = Case::from_json(json!({"uuid": "00000000-0000-4000-8000-000000000001", "keywords": ["math"]})).unwrap();
        let case_b = Case::from_json(json!({"uuid": "00000000-0000-4000-8000-000000000002", "keywords": ["science"]})).unwrap();
        for case in [case_a, case_b] {
            log.push(RunResult::success(
                case,
                json!({}),
                RunMetadata {
                    start: "2026-01-01T00:00:00Z".to_string(),
                    end: None,
                    elapsed: None,
                },
            ));
        }
        log
    }

    #[test]
    fn keyword_filter_narrows_output() {
        let log = sample_log();
        let options = FormatOptions {
            id_prefix: None,
            keywords: Some("math"),
        };
        let rendered = render(&log, &Demo, &options).unwrap();
        assert!(rendered.contains("000000000001"));
        assert!(!rendered.contains("000000000002"));
    }

    #[test]
    fn id_prefix_narrows_to_one_case() {
        let log = sample_log();
        let options = FormatOptions {
            id_prefix: Some("00000000-0000-4000-8000-000000000002"),
            keywords: None,
        };
        let rendered = render(&log, &Demo, &options).unwrap();
        assert!(rendered.contains("000000000002"));
        assert!(!rendered.contains("000000000001"));
    }
}
