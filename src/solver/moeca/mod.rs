//! Multi-objective evolutionary clustering.
//!
//! The problem ([`MoecaProblem`]) turns genomes into clusterings and
//! clusterings into one objective per metric; an [`Optimizer`] picked by
//! name searches it. The non-dominated feasible members of the final
//! population become the run's solutions, normalized against the bounds
//! seen over the whole run.

pub mod encoding;
pub mod indicators;
pub mod nsga2;
pub mod optimizer;
pub mod problem;

pub use encoding::{decode_cluster_labels, decode_graph_adjacency, dense_labels, Encoding};
pub use indicators::{PopulationIndicators, REFERENCE_MARGIN};
pub use nsga2::{Nsga2, INFEASIBLE_PENALTY, NSGA2};
pub use optimizer::{
    available_optimizers, constrained_ranks, dominates, non_dominated, optimizer_by_name,
    ArchiveEvolution, Individual, Optimizer, OptimizerSettings, Population, ARCHIVE_EVOLUTION,
};
pub use problem::{Evaluation, MoecaProblem, Problem};

use crate::clustering::cluster_key;
use crate::config::{validate_moeca, MoecaConfig};
use crate::errors::{Error, Result};
use crate::graph::EvaluationInput;
use crate::metrics::flatten_values;
use crate::observability::{set_phase, set_solver, SolverPhase};
use crate::quality::{normalize, CacheStats, OptimizationData};
use crate::solution::Solution;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info_span;

/// Result of one MOECA run.
#[derive(Debug, Clone, Serialize)]
pub struct MoecaOutcome {
    /// Distinct partitions of the final front
    pub solutions: Vec<Solution>,
    pub indicators: PopulationIndicators,
    pub evaluations: usize,
    pub generations: usize,
    /// Infeasible members left in the final population
    pub infeasible: usize,
    pub elapsed_secs: f64,
    pub cache: CacheStats,
}

pub struct MoecaSolver<'a> {
    input: &'a EvaluationInput,
    config: MoecaConfig,
    cache: OptimizationData,
    seeds: Vec<Solution>,
}

impl<'a> MoecaSolver<'a> {
    pub fn new(input: &'a EvaluationInput, config: MoecaConfig) -> Self {
        Self {
            input,
            config,
            cache: OptimizationData::new(),
            seeds: Vec::new(),
        }
    }

    pub fn with_cache(mut self, cache: OptimizationData) -> Self {
        self.cache = cache;
        self
    }

    /// Inject a known partition into the initial population.
    pub fn with_seed(mut self, seed: Solution) -> Self {
        self.seeds.push(seed);
        self
    }

    pub fn run(&self) -> Result<MoecaOutcome> {
        validate_moeca(&self.config)?;
        if self.input.other_classes().is_empty() {
            return Err(Error::solver("input has no behavioral classes to cluster"));
        }
        let optimizer = optimizer_by_name(&self.config.algorithm).ok_or_else(|| {
            Error::configuration(format!("unknown optimizer '{}'", self.config.algorithm))
        })?;

        let _solver = set_solver("moeca");
        let span = info_span!(
            "moeca",
            classes = self.input.other_classes().len(),
            encoding = %self.config.encoding,
            optimizer = optimizer.name()
        );
        let _enter = span.enter();

        let problem = MoecaProblem::new(self.input, &self.cache, &self.config);
        let seeds = self
            .seeds
            .iter()
            .map(|seed| problem.encode_solution(seed))
            .collect::<Result<Vec<_>>>()?;

        let settings = OptimizerSettings {
            population_size: self.config.population_size,
            max_evaluations: self.config.max_evaluations,
            max_time: self.config.max_time(),
            seed: self.config.seed,
        };
        let population = optimizer.run(&problem, seeds, &settings)?;
        log::info!(
            "{} finished: {} evaluations over {} generations in {:.2?}",
            optimizer.name(),
            population.evaluations,
            population.generations,
            population.elapsed
        );

        let _phase = set_phase(SolverPhase::ResultExtraction);
        let bounds = problem.global_min_max();
        let mut seen = BTreeSet::new();
        let mut solutions = Vec::new();
        let mut front = Vec::new();

        for idx in non_dominated(&population.individuals) {
            let individual = &population.individuals[idx];
            if !individual.evaluation.is_feasible() {
                continue;
            }
            let clustering = problem.decode(&individual.genome);
            let key: Vec<String> = clustering
                .clusters()
                .map(|(_, members)| cluster_key(members))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            if !seen.insert(key) {
                continue;
            }

            let raw = problem.metric_values(&individual.genome);
            let normalized = normalize(&raw, &bounds);
            front.push(flatten_values(&normalized));
            solutions.push(
                Solution::from_clustering(self.input, &clustering).with_metrics(raw, normalized),
            );
        }

        let infeasible = population
            .individuals
            .iter()
            .filter(|i| !i.evaluation.is_feasible())
            .count();
        if solutions.is_empty() {
            log::warn!(
                "No feasible partition found between {} and {} clusters",
                self.config.min_cluster_amount,
                self.config.max_cluster_amount
            );
        }

        Ok(MoecaOutcome {
            indicators: PopulationIndicators::from_front(&front),
            solutions,
            evaluations: population.evaluations,
            generations: population.generations,
            infeasible,
            elapsed_secs: population.elapsed.as_secs_f64(),
            cache: self.cache.stats(),
        })
    }
}

/// Run MOECA with a fresh cache sized by `memory_limit`.
pub fn run_moeca(
    input: &EvaluationInput,
    config: &MoecaConfig,
    seeds: Vec<Solution>,
    memory_limit: usize,
) -> Result<MoecaOutcome> {
    let mut solver = MoecaSolver::new(input, config.clone())
        .with_cache(OptimizationData::with_memory_limit(memory_limit));
    for seed in seeds {
        solver = solver.with_seed(seed);
    }
    solver.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ClassSpec, RelationshipSpec};
    use crate::metrics::MetricType;
    use crate::solution::Microservice;

    fn input() -> EvaluationInput {
        EvaluationInput::builder()
            .class(ClassSpec::other("A", 1))
            .class(ClassSpec::other("B", 1))
            .class(ClassSpec::other("C", 1))
            .class(ClassSpec::other("D", 1))
            .relationship(RelationshipSpec::dependence("A", "B", 3))
            .relationship(RelationshipSpec::dependence("C", "D", 2))
            .build()
            .unwrap()
    }

    fn config() -> MoecaConfig {
        MoecaConfig {
            metrics: vec![MetricType::Carvalho],
            min_cluster_amount: 2,
            max_cluster_amount: 3,
            population_size: 10,
            max_evaluations: 400,
            seed: Some(11),
            algorithm: ARCHIVE_EVOLUTION.into(),
            ..MoecaConfig::default()
        }
    }

    #[test]
    fn test_front_contains_only_feasible_distinct_partitions() {
        let input = input();
        let outcome = MoecaSolver::new(&input, config()).run().unwrap();

        assert!(!outcome.solutions.is_empty());
        assert_eq!(outcome.evaluations, 400);
        let mut seen = BTreeSet::new();
        for solution in &outcome.solutions {
            assert!((2..=3).contains(&solution.cluster_count()));
            assert!(seen.insert(format!("{:?}", solution.microservices)));
            for value in &solution.normalized_values[&MetricType::Carvalho] {
                assert!((0.0..=1.0).contains(value));
            }
        }
        assert_eq!(outcome.indicators.front_size, outcome.solutions.len());
    }

    #[test]
    fn test_seeded_optimum_survives() {
        let input = input();
        let seed = Solution::new(vec![
            Microservice::new(0, vec!["A".into(), "B".into()]),
            Microservice::new(1, vec!["C".into(), "D".into()]),
        ]);
        let outcome = MoecaSolver::new(&input, config())
            .with_seed(seed.clone())
            .run()
            .unwrap();

        // {A,B} {C,D} has the lowest cohesion and zero coupling: nothing dominates it
        assert!(outcome
            .solutions
            .iter()
            .any(|s| s.microservices == seed.microservices));
    }

    #[test]
    fn test_nsga2_keeps_seeded_optimum() {
        let input = input();
        let seed = Solution::new(vec![
            Microservice::new(0, vec!["A".into(), "B".into()]),
            Microservice::new(1, vec!["C".into(), "D".into()]),
        ]);
        let config = MoecaConfig {
            algorithm: NSGA2.into(),
            ..config()
        };
        let outcome = MoecaSolver::new(&input, config)
            .with_seed(seed.clone())
            .run()
            .unwrap();

        assert!(outcome.evaluations > 0);
        for solution in &outcome.solutions {
            assert!((2..=3).contains(&solution.cluster_count()));
        }
        assert!(outcome
            .solutions
            .iter()
            .any(|s| s.microservices == seed.microservices));
    }

    #[test]
    fn test_unknown_optimizer_rejected() {
        let input = input();
        let config = MoecaConfig {
            algorithm: "spea2".into(),
            ..config()
        };
        assert!(matches!(
            MoecaSolver::new(&input, config).run(),
            Err(Error::Configuration(_))
        ));
    }
}
