//! The clustering problem handed to a multi-objective optimizer.

use super::encoding::{dense_labels, Encoding};
use crate::clustering::{Clustering, ClusteringBuilder};
use crate::config::MoecaConfig;
use crate::errors::{Error, Result};
use crate::graph::EvaluationInput;
use crate::metrics::{flatten_values, flattened_len, MetricType, MetricValues};
use crate::observability::increment_evaluated;
use crate::quality::{MinMax, MinMaxAccumulator, OptimizationData, QualityCalculator};
use crate::solution::Solution;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Objectives and constraint violation of one genome.
///
/// Infeasible genomes carry no objectives; optimizers rank them by
/// violation alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub objectives: Vec<f64>,
    pub violation: f64,
}

impl Evaluation {
    pub fn feasible(objectives: Vec<f64>) -> Self {
        Self {
            objectives,
            violation: 0.0,
        }
    }

    pub fn infeasible(violation: f64) -> Self {
        Self {
            objectives: Vec::new(),
            violation,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.violation <= 0.0
    }
}

/// What an optimizer needs to know about a problem.
///
/// `evaluate` is called concurrently from the optimizer's worker pool.
pub trait Problem: Sync {
    fn genome_len(&self) -> usize;

    /// Largest allowed gene value; genes range over `0..=gene_upper_bound`
    fn gene_upper_bound(&self) -> usize;

    fn objective_count(&self) -> usize;

    fn constraint_count(&self) -> usize {
        1
    }

    fn evaluate(&self, genome: &[usize]) -> Evaluation;
}

/// Partitioning of an input's behavioral classes.
pub struct MoecaProblem<'a> {
    calculator: QualityCalculator<'a>,
    encoding: Encoding,
    metrics: Vec<MetricType>,
    min_cluster_amount: usize,
    max_cluster_amount: usize,
    min_max: MinMaxAccumulator,
    evaluations: AtomicUsize,
}

impl<'a> MoecaProblem<'a> {
    pub fn new(
        input: &'a EvaluationInput,
        cache: &'a OptimizationData,
        config: &MoecaConfig,
    ) -> Self {
        Self {
            calculator: QualityCalculator::new(input, cache),
            encoding: config.encoding,
            metrics: config.metrics.clone(),
            min_cluster_amount: config.min_cluster_amount,
            max_cluster_amount: config.max_cluster_amount,
            min_max: MinMaxAccumulator::new(),
            evaluations: AtomicUsize::new(0),
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn input(&self) -> &'a EvaluationInput {
        self.calculator.input()
    }

    /// Partition described by a genome.
    pub fn decode(&self, genome: &[usize]) -> Clustering {
        let input = self.input();
        let mut builder = ClusteringBuilder::new();
        for (class, label) in input.other_classes().iter().zip(self.encoding.decode(genome)) {
            builder.add_to_cluster(*class, label);
        }
        builder.build()
    }

    /// Cluster-label genome of a persisted solution, for seeding.
    pub fn encode_solution(&self, solution: &Solution) -> Result<Vec<usize>> {
        if self.encoding != Encoding::ClusterLabel {
            return Err(Error::solver(format!(
                "seed solutions require the cluster-label encoding, not {}",
                self.encoding
            )));
        }
        let input = self.input();
        let builder = ClusteringBuilder::from_solution(input, solution)?;
        let mut labels = Vec::with_capacity(input.other_classes().len());
        for class in input.other_classes() {
            let cluster = builder.cluster_of(*class).ok_or_else(|| {
                Error::validation(format!(
                    "seed does not place class '{}'",
                    input.class(*class).identifier
                ))
            })?;
            labels.push(cluster);
        }

        let genome = dense_labels(labels);
        let upper = self.gene_upper_bound();
        if genome.iter().any(|gene| *gene > upper) {
            return Err(Error::validation(format!(
                "seed has {} clusters but genes are limited to {}",
                builder.cluster_count(),
                upper + 1
            )));
        }
        Ok(genome)
    }

    /// Raw metric values of a genome.
    pub fn metric_values(&self, genome: &[usize]) -> MetricValues {
        self.calculator
            .perform_metrics(&self.metrics, &self.decode(genome))
    }

    /// Bounds observed over every feasible evaluation so far.
    pub fn global_min_max(&self) -> MinMax {
        self.min_max.snapshot()
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }

    fn violation(&self, clusters: usize) -> f64 {
        if clusters < self.min_cluster_amount {
            (self.min_cluster_amount - clusters) as f64
        } else if clusters > self.max_cluster_amount {
            (clusters - self.max_cluster_amount) as f64
        } else {
            0.0
        }
    }
}

impl Problem for MoecaProblem<'_> {
    fn genome_len(&self) -> usize {
        self.input().other_classes().len()
    }

    fn gene_upper_bound(&self) -> usize {
        self.encoding
            .gene_upper_bound(self.genome_len(), self.max_cluster_amount)
    }

    fn objective_count(&self) -> usize {
        flattened_len(&self.metrics)
    }

    fn evaluate(&self, genome: &[usize]) -> Evaluation {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        increment_evaluated();

        let clustering = self.decode(genome);
        let violation = self.violation(clustering.cluster_count());
        if violation > 0.0 {
            return Evaluation::infeasible(violation);
        }

        let values = self
            .calculator
            .perform_metrics(&self.metrics, &clustering);
        self.min_max.update(&values);
        Evaluation::feasible(flatten_values(&values))
    }
}
