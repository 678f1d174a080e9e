// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Summarize
//!
//! Renders a run log as a plain-text table: a leading `id`/`status` pair
//! generic across every pipeline, then pipeline-defined columns, then a
//! totals footer with percentages (spec.md §4.F). Column values and order
//! for the pipeline-defined part come from the pipeline spec
//! (`PipelineSpec::summarize_row`/`summary_columns`); grounded on the
//! harness's original `summarize.py` column-spec renderer.

use harness_domain::aggregates::run_log::RunLog;
use harness_domain::services::pipeline_spec::PipelineSpec;
use harness_domain::services::short_id;

const LEADING_COLUMNS: [&str; 2] = ["id", "status"];

/// Renders `log` as a fixed-width table using `spec`'s column choices.
pub fn render(log: &RunLog, spec: &dyn PipelineSpec) -> String {
    let all_ids: Vec<String> = log.results.iter().map(|r| r.case.uuid.to_string()).collect();
    let id_len = short_id::uniform_prefix_length(&all_ids);

    let mut pipeline_columns = spec.summary_columns();
    let pipeline_rows: Vec<_> = log
        .results
        .iter()
        .filter_map(|r| spec.summarize_row(r).map(|row| (r, row)))
        .collect();

    if pipeline_columns.is_empty() {
        let mut seen = std::collections::BTreeSet::new();
        for (_, row) in &pipeline_rows {
            for key in row.keys() {
                seen.insert(key.clone());
            }
        }
        pipeline_columns = seen.into_iter().collect();
    }

    let columns: Vec<String> = LEADING_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(pipeline_columns.iter().cloned())
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
    let cells: Vec<Vec<String>> = pipeline_rows
        .iter()
        .map(|(result, row)| {
            let id = result.case.uuid.to_string().chars().take(id_len).collect::<String>();
            let status = if result.succeeded { "COMPLETE" } else { "ERROR" }.to_string();
            std::iter::once(id)
                .chain(std::iter::once(status))
                .chain(pipeline_columns.iter().map(|col| row.get(col).map(display_value).unwrap_or_default()))
                .collect()
        })
        .collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::new();
    out.push_str(&render_row(&columns, &widths));
    out.push('\n');
    out.push_str(&"-".repeat(widths.iter().sum::<usize>() + widths.len().saturating_sub(1)));
    out.push('\n');
    for row in &cells {
        out.push_str(&render_row(row, &widths));
        out.push('\n');
    }
    out.push_str(&render_footer(log, spec));
    out
}

fn render_footer(log: &RunLog, spec: &dyn PipelineSpec) -> String {
    let total = log.results.len();
    let complete = log.results.iter().filter(|r| r.succeeded).count();
    let error = total - complete;
    let passed = log.results.iter().filter(|r| spec.passed(r)).count();
    let failed = total - passed;

    let pct = |n: usize| if total == 0 { 0.0 } else { (n as f64) * 100.0 / (total as f64) };

    format!(
        "\nTotal: {total}, Complete: {complete} ({:.1}%), Error: {error} ({:.1}%), Passed: {passed} ({:.1}%), Failed: {failed} ({:.1}%)\n",
        pct(complete),
        pct(error),
        pct(passed),
        pct(failed),
    )
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
