//! Terminal rendering of run results.

use crate::metrics::{flatten_metrics, MetricType, MetricValues};
use crate::quality::CacheStats;
use crate::solution::Solution;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};

fn metric_columns(solutions: &[Solution]) -> Vec<MetricType> {
    let mut types: Vec<MetricType> = solutions
        .iter()
        .flat_map(|s| s.metric_values.keys().copied())
        .collect();
    types.sort();
    types.dedup();
    types
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e9 {
        format!("{:.0}", value)
    } else {
        format!("{:.4}", value)
    }
}

fn flat_values(values: &MetricValues, types: &[MetricType]) -> Vec<String> {
    types
        .iter()
        .flat_map(|t| match values.get(t) {
            Some(vs) => vs.iter().map(|v| format_value(*v)).collect::<Vec<_>>(),
            None => vec!["-".to_string(); t.metrics().len()],
        })
        .collect()
}

/// One row per solution: size, quality and raw metric values.
pub fn solutions_table(solutions: &[Solution]) -> Table {
    let types = metric_columns(solutions);
    let mut header = vec![
        Cell::new("#"),
        Cell::new("services"),
        Cell::new("quality"),
    ];
    header.extend(flatten_metrics(&types).into_iter().map(|m| Cell::new(m.as_str())));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for (idx, solution) in solutions.iter().enumerate() {
        let mut row = vec![
            idx.to_string(),
            solution.cluster_count().to_string(),
            solution
                .quality
                .map(format_value)
                .unwrap_or_else(|| "-".to_string()),
        ];
        row.extend(flat_values(&solution.metric_values, &types));
        table.add_row(row);
    }
    table
}

/// Members of each microservice in one solution.
pub fn microservices_table(solution: &Solution) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["service", "classes", "members"]);
    for service in &solution.microservices {
        table.add_row(vec![
            service.ordinal.to_string(),
            service.classes.len().to_string(),
            service.classes.join(", "),
        ]);
    }
    table
}

pub fn cache_line(stats: &CacheStats) -> String {
    format!(
        "cache: {} hits, {} misses ({:.1}% hit ratio), {} entries, {} clears",
        stats.hits,
        stats.misses,
        stats.hit_ratio() * 100.0,
        stats.entries,
        stats.clears
    )
}

pub fn print_heading(text: &str) {
    println!("\n{}", text.bold());
}

pub fn print_warning(text: &str) {
    println!("{}", text.yellow());
}
