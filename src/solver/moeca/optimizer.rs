//! Pluggable multi-objective optimizers.
//!
//! An optimizer takes a [`Problem`] and returns its final population after
//! its stopping criterion. Optimizers are looked up by name so the
//! configuration can select one.

use super::nsga2::{Nsga2, NSGA2};
use super::problem::{Evaluation, Problem};
use crate::errors::{Error, Result};
use crate::observability::{set_phase, set_progress, SolverPhase};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::time::{Duration, Instant};

/// Name of the in-crate (μ+λ) optimizer.
pub const ARCHIVE_EVOLUTION: &str = "archive-evolution";

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerSettings {
    pub population_size: usize,
    pub max_evaluations: usize,
    pub max_time: Option<Duration>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub genome: Vec<usize>,
    pub evaluation: Evaluation,
}

/// Final population and the effort spent on it.
#[derive(Debug, Clone)]
pub struct Population {
    pub individuals: Vec<Individual>,
    pub evaluations: usize,
    pub generations: usize,
    pub elapsed: Duration,
}

pub trait Optimizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Search `problem`, starting from `seeds` plus random genomes.
    fn run(
        &self,
        problem: &dyn Problem,
        seeds: Vec<Vec<usize>>,
        settings: &OptimizerSettings,
    ) -> Result<Population>;
}

pub fn available_optimizers() -> &'static [&'static str] {
    &[NSGA2, ARCHIVE_EVOLUTION]
}

/// Resolve an optimizer by (case-insensitive) name.
pub fn optimizer_by_name(name: &str) -> Option<Box<dyn Optimizer>> {
    match name.trim().to_ascii_lowercase().as_str() {
        NSGA2 => Some(Box::new(Nsga2)),
        ARCHIVE_EVOLUTION => Some(Box::new(ArchiveEvolution)),
        _ => None,
    }
}

/// Shared preconditions of every optimizer run.
pub(crate) fn check_run(
    problem: &dyn Problem,
    seeds: &[Vec<usize>],
    settings: &OptimizerSettings,
) -> Result<()> {
    let len = problem.genome_len();
    let upper = problem.gene_upper_bound();
    if len == 0 {
        return Err(Error::solver("problem has an empty genome"));
    }
    if settings.population_size < 2 {
        return Err(Error::solver("population size must be at least 2"));
    }
    for seed in seeds {
        if seed.len() != len || seed.iter().any(|gene| *gene > upper) {
            return Err(Error::validation(format!(
                "seed genome does not fit {} genes in 0..={}",
                len, upper
            )));
        }
    }
    Ok(())
}

/// Constrained dominance.
///
/// Feasible beats infeasible, lower violation beats higher, and feasible
/// pairs compare by Pareto dominance on the objectives.
pub fn dominates(a: &Evaluation, b: &Evaluation) -> bool {
    match (a.is_feasible(), b.is_feasible()) {
        (true, false) => true,
        (false, true) => false,
        (false, false) => a.violation < b.violation,
        (true, true) => {
            let mut strictly_better = false;
            for (x, y) in a.objectives.iter().zip(&b.objectives) {
                if x > y {
                    return false;
                }
                if x < y {
                    strictly_better = true;
                }
            }
            strictly_better
        }
    }
}

/// Non-dominated sorting; rank 0 is the first front.
pub fn constrained_ranks(evaluations: &[&Evaluation]) -> Vec<usize> {
    let n = evaluations.len();
    let mut ranks = vec![usize::MAX; n];
    let mut remaining: Vec<usize> = (0..n).collect();
    let mut rank = 0;

    while !remaining.is_empty() {
        let front: Vec<usize> = remaining
            .iter()
            .copied()
            .filter(|&i| {
                !remaining
                    .iter()
                    .any(|&j| j != i && dominates(evaluations[j], evaluations[i]))
            })
            .collect();
        if front.is_empty() {
            // only reachable with NaN objectives
            for &i in &remaining {
                ranks[i] = rank;
            }
            break;
        }
        for &i in &front {
            ranks[i] = rank;
        }
        remaining.retain(|&i| ranks[i] == usize::MAX);
        rank += 1;
    }
    ranks
}

/// Indices of the first front.
pub fn non_dominated(individuals: &[Individual]) -> Vec<usize> {
    let evaluations: Vec<&Evaluation> = individuals.iter().map(|i| &i.evaluation).collect();
    constrained_ranks(&evaluations)
        .into_iter()
        .enumerate()
        .filter(|(_, rank)| *rank == 0)
        .map(|(idx, _)| idx)
        .collect()
}

/// Compact (μ+λ) evolutionary loop.
///
/// Parents are picked by binary tournament on constrained rank, children
/// come from uniform crossover plus per-gene random-reset mutation, and
/// survivors are the best `population_size` of parents and children by
/// rank, then violation, then age.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveEvolution;

impl ArchiveEvolution {
    fn evaluate_all(problem: &dyn Problem, genomes: Vec<Vec<usize>>) -> Vec<Individual> {
        genomes
            .into_par_iter()
            .map(|genome| {
                let evaluation = problem.evaluate(&genome);
                Individual { genome, evaluation }
            })
            .collect()
    }

    fn random_genome(rng: &mut StdRng, len: usize, upper: usize) -> Vec<usize> {
        (0..len).map(|_| rng.random_range(0..=upper)).collect()
    }

    fn tournament<'p>(
        rng: &mut StdRng,
        population: &'p [Individual],
        ranks: &[usize],
    ) -> &'p Individual {
        let a = rng.random_range(0..population.len());
        let b = rng.random_range(0..population.len());
        let winner = match ranks[a].cmp(&ranks[b]) {
            Ordering::Less => a,
            Ordering::Greater => b,
            Ordering::Equal => {
                if population[b].evaluation.violation < population[a].evaluation.violation {
                    b
                } else {
                    a
                }
            }
        };
        &population[winner]
    }

    fn offspring(
        rng: &mut StdRng,
        first: &[usize],
        second: &[usize],
        upper: usize,
    ) -> Vec<usize> {
        let mutation_rate = 1.0 / first.len().max(1) as f64;
        first
            .iter()
            .zip(second)
            .map(|(&x, &y)| {
                let gene = if rng.random_bool(0.5) { x } else { y };
                if rng.random_bool(mutation_rate) {
                    rng.random_range(0..=upper)
                } else {
                    gene
                }
            })
            .collect()
    }

    fn select_survivors(mut combined: Vec<Individual>, size: usize) -> Vec<Individual> {
        let evaluations: Vec<&Evaluation> = combined.iter().map(|i| &i.evaluation).collect();
        let ranks = constrained_ranks(&evaluations);
        let mut order: Vec<usize> = (0..combined.len()).collect();
        order.sort_by(|&a, &b| {
            ranks[a]
                .cmp(&ranks[b])
                .then(
                    combined[a]
                        .evaluation
                        .violation
                        .total_cmp(&combined[b].evaluation.violation),
                )
                .then(a.cmp(&b))
        });
        order.truncate(size);
        order.sort_unstable();

        let mut keep = vec![false; combined.len()];
        for idx in order {
            keep[idx] = true;
        }
        let mut flags = keep.into_iter();
        combined.retain(|_| flags.next().unwrap_or(false));
        combined
    }
}

impl Optimizer for ArchiveEvolution {
    fn name(&self) -> &'static str {
        ARCHIVE_EVOLUTION
    }

    fn run(
        &self,
        problem: &dyn Problem,
        seeds: Vec<Vec<usize>>,
        settings: &OptimizerSettings,
    ) -> Result<Population> {
        check_run(problem, &seeds, settings)?;
        let len = problem.genome_len();
        let upper = problem.gene_upper_bound();

        let started = Instant::now();
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let _phase = set_phase(SolverPhase::PopulationEvaluation);

        let size = settings.population_size;
        let initial_count = size.min(settings.max_evaluations.max(1));
        let mut genomes: Vec<Vec<usize>> = seeds.into_iter().take(initial_count).collect();
        while genomes.len() < initial_count {
            genomes.push(Self::random_genome(&mut rng, len, upper));
        }

        set_progress(0, settings.max_evaluations);
        let mut population = Self::evaluate_all(problem, genomes);
        let mut evaluations = population.len();
        let mut generations = 0;

        let out_of_time = |started: &Instant| {
            settings
                .max_time
                .is_some_and(|limit| started.elapsed() >= limit)
        };

        while evaluations < settings.max_evaluations && !out_of_time(&started) {
            let evaluations_ref: Vec<&Evaluation> =
                population.iter().map(|i| &i.evaluation).collect();
            let ranks = constrained_ranks(&evaluations_ref);

            let batch = size.min(settings.max_evaluations - evaluations);
            let children: Vec<Vec<usize>> = (0..batch)
                .map(|_| {
                    let first = Self::tournament(&mut rng, &population, &ranks);
                    let second = Self::tournament(&mut rng, &population, &ranks);
                    Self::offspring(&mut rng, &first.genome, &second.genome, upper)
                })
                .collect();

            let offspring = Self::evaluate_all(problem, children);
            evaluations += offspring.len();
            generations += 1;

            population.extend(offspring);
            population = Self::select_survivors(population, size);

            if generations % 10 == 0 {
                log::debug!(
                    "{}: generation {}, {} evaluations",
                    ARCHIVE_EVOLUTION,
                    generations,
                    evaluations
                );
            }
        }

        Ok(Population {
            individuals: population,
            evaluations,
            generations,
            elapsed: started.elapsed(),
        })
    }
}
