use super::report::{microservices_table, print_heading, solutions_table};
use super::{load_graph, resolve_config};
use crate::clustering::ClusteringBuilder;
use crate::errors;
use crate::graph::EvaluationInput;
use crate::metrics::MetricType;
use crate::quality::{weighted_total_quality, OptimizationData, QualityCalculator};
use crate::solution::Solution;
use crate::store::read_solution;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Recompute raw metrics of `solution` against `input`.
///
/// Quality is the weighted sum of the raw values when `weights` is given.
pub fn evaluate_solution(
    input: &EvaluationInput,
    solution: &Solution,
    metric_types: &[MetricType],
    weights: Option<&[f64]>,
) -> errors::Result<Solution> {
    let clustering = ClusteringBuilder::from_solution(input, solution)?.build();
    let cache = OptimizationData::new();
    let raw = QualityCalculator::new(input, &cache).perform_metrics(metric_types, &clustering);

    let mut evaluated = Solution::from_clustering(input, &clustering);
    evaluated.id = solution.id.clone();
    if let Some(weights) = weights {
        evaluated = evaluated.with_quality(weighted_total_quality(&raw, weights)?);
    }
    Ok(evaluated.with_metrics(raw, Default::default()))
}

pub fn handle_evaluate(
    graph: PathBuf,
    solution_path: PathBuf,
    index: usize,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = resolve_config(config.as_deref())?;
    let input = load_graph(&graph)?;
    let solution = read_solution(&solution_path, index)
        .with_context(|| format!("Failed to read solution {}", solution_path.display()))?;

    let weights = config.ahca.resolved_weights();
    let evaluated = evaluate_solution(&input, &solution, &config.ahca.metrics, Some(&weights))
        .context("Solution does not fit the graph")?;

    print_heading(&format!(
        "{} services over {} classes",
        evaluated.cluster_count(),
        evaluated.class_count()
    ));
    println!("{}", solutions_table(std::slice::from_ref(&evaluated)));
    println!("{}", microservices_table(&evaluated));
    Ok(())
}
