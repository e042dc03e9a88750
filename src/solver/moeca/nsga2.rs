//! NSGA-II from `fugue-evo` behind the [`Optimizer`] seam.
//!
//! fugue-evo evolves real-valued genomes, so every gene is a coordinate in
//! `[-1, 1]` that falls into one of `upper + 1` equal slices. Constraint
//! violation is folded into the objectives: an infeasible genome scores
//! `INFEASIBLE_PENALTY + violation` on every objective, which keeps feasible
//! genomes ahead of infeasible ones and orders infeasible genomes by
//! violation.

use super::optimizer::{check_run, Individual, Optimizer, OptimizerSettings, Population};
use super::problem::{Evaluation, Problem};
use crate::errors::{Error, Result};
use crate::observability::{set_phase, set_progress, SolverPhase};
use fugue_evo::prelude::{
    MultiBounds, MultiObjectiveFitness, Nsga2Builder, PolynomialMutation, RealValuedGenome,
    RealVector, SbxCrossover,
};
use rand_08::rngs::StdRng;
use rand_08::SeedableRng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

pub const NSGA2: &str = "nsga2";

/// Base objective value of an infeasible genome; far above any metric value.
pub const INFEASIBLE_PENALTY: f64 = 1.0e9;

const GENE_RADIUS: f64 = 1.0;
const SBX_DISTRIBUTION_INDEX: f64 = 15.0;
const MUTATION_DISTRIBUTION_INDEX: f64 = 20.0;

/// Gene value of one real coordinate, clamped into `0..=upper`.
pub fn gene_from_coordinate(x: f64, upper: usize) -> usize {
    if !x.is_finite() {
        return 0;
    }
    let slots = (upper + 1) as f64;
    let slot = ((x + GENE_RADIUS) / (2.0 * GENE_RADIUS) * slots).floor();
    (slot.max(0.0) as usize).min(upper)
}

/// Objective vector handed to NSGA-II for one evaluation.
pub fn penalized_objectives(evaluation: &Evaluation, objective_count: usize) -> Vec<f64> {
    if evaluation.is_feasible() {
        evaluation.objectives.clone()
    } else {
        vec![INFEASIBLE_PENALTY + evaluation.violation; objective_count]
    }
}

struct PenalizedFitness<'p> {
    problem: &'p dyn Problem,
    evaluations: &'p AtomicUsize,
}

impl PenalizedFitness<'_> {
    fn genes(&self, genome: &RealVector) -> Vec<usize> {
        decode_genes(genome, self.problem.gene_upper_bound())
    }
}

impl MultiObjectiveFitness<RealVector> for PenalizedFitness<'_> {
    fn num_objectives(&self) -> usize {
        self.problem.objective_count()
    }

    fn evaluate(&self, genome: &RealVector) -> Vec<f64> {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        let evaluation = self.problem.evaluate(&self.genes(genome));
        penalized_objectives(&evaluation, self.problem.objective_count())
    }
}

fn decode_genes(genome: &RealVector, upper: usize) -> Vec<usize> {
    genome
        .genes()
        .iter()
        .map(|x| gene_from_coordinate(*x, upper))
        .collect()
}

/// Generations that fit the evaluation budget after the initial population.
fn generation_budget(settings: &OptimizerSettings) -> usize {
    (settings.max_evaluations / settings.population_size).saturating_sub(1)
}

/// Elitist non-dominated sorting GA with SBX crossover and polynomial
/// mutation.
///
/// Stops on the evaluation budget. Seeds cannot enter fugue-evo's initial
/// population, so they are evaluated alongside the returned front.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nsga2;

impl Optimizer for Nsga2 {
    fn name(&self) -> &'static str {
        NSGA2
    }

    fn run(
        &self,
        problem: &dyn Problem,
        seeds: Vec<Vec<usize>>,
        settings: &OptimizerSettings,
    ) -> Result<Population> {
        check_run(problem, &seeds, settings)?;
        if settings.max_time.is_some() {
            log::warn!("{} stops on its evaluation budget; max_time is ignored", NSGA2);
        }

        let started = Instant::now();
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let _phase = set_phase(SolverPhase::PopulationEvaluation);
        set_progress(0, settings.max_evaluations);

        let generations = generation_budget(settings);
        let evaluations = AtomicUsize::new(0);
        let fitness = PenalizedFitness {
            problem,
            evaluations: &evaluations,
        };

        let result = Nsga2Builder::new()
            .population_size(settings.population_size)
            .bounds(MultiBounds::symmetric(GENE_RADIUS, problem.genome_len()))
            .crossover(SbxCrossover::new(SBX_DISTRIBUTION_INDEX))
            .mutation(PolynomialMutation::new(MUTATION_DISTRIBUTION_INDEX))
            .fitness(fitness)
            .max_generations(generations)
            .build()
            .map_err(|e| Error::solver(format!("{} setup failed: {}", NSGA2, e)))?
            .run(&mut rng)
            .map_err(|e| Error::solver(format!("{} run failed: {}", NSGA2, e)))?;

        let upper = problem.gene_upper_bound();
        let seed_count = seeds.len();
        let genomes: Vec<Vec<usize>> = result
            .pareto_front
            .iter()
            .map(|member| decode_genes(&member.genome, upper))
            .chain(seeds)
            .collect();

        // front members hit the metric cache; only the seeds are new work
        let individuals: Vec<Individual> = genomes
            .into_par_iter()
            .map(|genome| {
                let evaluation = problem.evaluate(&genome);
                Individual { genome, evaluation }
            })
            .collect();

        let evaluations = evaluations.load(Ordering::Relaxed) + seed_count;
        log::debug!(
            "{}: {} front members after {} generations",
            NSGA2,
            individuals.len() - seed_count,
            generations
        );

        Ok(Population {
            individuals,
            evaluations,
            generations,
            elapsed: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::moeca::optimizer::dominates;

    /// Ones against zeros; the all-ones genome is infeasible.
    struct Bits {
        len: usize,
    }

    impl Problem for Bits {
        fn genome_len(&self) -> usize {
            self.len
        }

        fn gene_upper_bound(&self) -> usize {
            1
        }

        fn objective_count(&self) -> usize {
            2
        }

        fn evaluate(&self, genome: &[usize]) -> Evaluation {
            let ones = genome.iter().filter(|g| **g == 1).count() as f64;
            if ones == self.len as f64 {
                return Evaluation::infeasible(1.0);
            }
            Evaluation::feasible(vec![ones, self.len as f64 - ones])
        }
    }

    fn settings(seed: u64) -> OptimizerSettings {
        OptimizerSettings {
            population_size: 12,
            max_evaluations: 240,
            max_time: None,
            seed: Some(seed),
        }
    }

    #[test]
    fn test_coordinates_fall_into_even_slices() {
        assert_eq!(gene_from_coordinate(-1.0, 3), 0);
        assert_eq!(gene_from_coordinate(-0.49, 3), 1);
        assert_eq!(gene_from_coordinate(0.01, 3), 2);
        assert_eq!(gene_from_coordinate(0.99, 3), 3);
        assert_eq!(gene_from_coordinate(1.0, 3), 3);
        assert_eq!(gene_from_coordinate(0.3, 0), 0);
    }

    #[test]
    fn test_out_of_range_coordinates_clamp() {
        assert_eq!(gene_from_coordinate(-7.5, 4), 0);
        assert_eq!(gene_from_coordinate(7.5, 4), 4);
        assert_eq!(gene_from_coordinate(f64::NAN, 4), 0);
    }

    #[test]
    fn test_penalty_preserves_constrained_dominance() {
        let count = 2;
        let penalized = |e: &Evaluation| Evaluation::feasible(penalized_objectives(e, count));

        let poor = Evaluation::feasible(vec![1.0e6, 1.0e6]);
        let near = Evaluation::infeasible(1.0);
        let far = Evaluation::infeasible(3.0);

        assert!(dominates(&penalized(&poor), &penalized(&near)));
        assert!(dominates(&penalized(&near), &penalized(&far)));
        assert!(!dominates(&penalized(&far), &penalized(&poor)));
        assert_eq!(penalized_objectives(&poor, count), vec![1.0e6, 1.0e6]);
    }

    #[test]
    fn test_generation_budget_leaves_room_for_initial_population() {
        assert_eq!(generation_budget(&settings(0)), 19);
        let tight = OptimizerSettings {
            max_evaluations: 5,
            ..settings(0)
        };
        assert_eq!(generation_budget(&tight), 0);
    }

    #[test]
    fn test_rejects_malformed_seed() {
        let problem = Bits { len: 4 };
        let result = Nsga2.run(&problem, vec![vec![0, 2, 0, 0]], &settings(1));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_returns_front_within_gene_bounds() {
        let problem = Bits { len: 6 };
        let population = Nsga2.run(&problem, Vec::new(), &settings(2)).unwrap();

        assert!(!population.individuals.is_empty());
        assert!(population.evaluations > 0);
        for individual in &population.individuals {
            assert_eq!(individual.genome.len(), 6);
            assert!(individual.genome.iter().all(|gene| *gene <= 1));
        }
    }

    #[test]
    fn test_seeds_join_final_population() {
        let problem = Bits { len: 5 };
        let seed = vec![0, 0, 0, 0, 0];
        let population = Nsga2
            .run(&problem, vec![seed.clone()], &settings(3))
            .unwrap();

        let seeded = population
            .individuals
            .iter()
            .find(|individual| individual.genome == seed)
            .unwrap();
        assert_eq!(seeded.evaluation, Evaluation::feasible(vec![0.0, 5.0]));
    }
}
