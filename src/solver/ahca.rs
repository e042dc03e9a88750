//! Agglomerative hierarchical clustering search.
//!
//! Starting from singletons (or a seed solution), every step tries each
//! candidate merge of two clusters in parallel and keeps the one with the
//! lowest weighted quality. Steps continue until `min_cluster_amount`
//! clusters remain; every step at or below `max_cluster_amount` clusters is
//! persisted as a [`Solution`].
//!
//! With `optimize_on_shared_edges`, candidates are limited to clusters linked
//! by a dependence or a shared data class. A step whose best restricted
//! candidate is worse than the previous step, or that has no restricted
//! candidate at all, is redone over every pair of clusters.

use crate::clustering::{ClusterId, Clustering, ClusteringBuilder};
use crate::config::{validate_ahca, AhcaConfig};
use crate::errors::{Error, Result};
use crate::graph::EvaluationInput;
use crate::metrics::MetricValues;
use crate::observability::{
    increment_evaluated, set_cluster_count, set_phase, set_progress, set_solver, SolverPhase,
};
use crate::quality::{
    min_max, normalize, weighted_total_quality, CacheStats, OptimizationData, QualityCalculator,
};
use crate::solution::Solution;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info_span;

/// Result of one AHCA run.
#[derive(Debug, Clone, Serialize)]
pub struct AhcaOutcome {
    /// Persisted step solutions, most clusters first
    pub solutions: Vec<Solution>,
    /// Merges performed
    pub steps: usize,
    /// Steps redone over all cluster pairs
    pub retries: usize,
    /// True when no merge remained before reaching the minimum
    pub exhausted: bool,
    pub cache: CacheStats,
}

pub struct AhcaSolver<'a> {
    input: &'a EvaluationInput,
    config: AhcaConfig,
    cache: OptimizationData,
    seed: Option<Solution>,
}

struct Candidate {
    pair: (ClusterId, ClusterId),
    builder: ClusteringBuilder,
    clustering: Clustering,
    raw: MetricValues,
}

struct Scored {
    candidate: Candidate,
    normalized: MetricValues,
    quality: f64,
}

impl<'a> AhcaSolver<'a> {
    pub fn new(input: &'a EvaluationInput, config: AhcaConfig) -> Self {
        Self {
            input,
            config,
            cache: OptimizationData::new(),
            seed: None,
        }
    }

    pub fn with_cache(mut self, cache: OptimizationData) -> Self {
        self.cache = cache;
        self
    }

    /// Start from a persisted partition instead of singletons.
    pub fn with_seed(mut self, seed: Solution) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn run(&self) -> Result<AhcaOutcome> {
        validate_ahca(&self.config)?;
        if self.input.other_classes().is_empty() {
            return Err(Error::solver("input has no behavioral classes to cluster"));
        }

        let _solver = set_solver("ahca");
        let span = info_span!(
            "ahca",
            classes = self.input.other_classes().len(),
            min = self.config.min_cluster_amount,
            max = self.config.max_cluster_amount
        );
        let _enter = span.enter();

        let weights = self.config.resolved_weights();
        let calculator = QualityCalculator::new(self.input, &self.cache);

        let mut builder = match &self.seed {
            Some(seed) => ClusteringBuilder::from_solution(self.input, seed)?,
            None => ClusteringBuilder::singletons(self.input),
        };

        let mut outcome = AhcaOutcome {
            solutions: Vec::new(),
            steps: 0,
            retries: 0,
            exhausted: false,
            cache: CacheStats::default(),
        };

        let initial = {
            let _phase = set_phase(SolverPhase::InitialEvaluation);
            let clustering = builder.build();
            let raw = calculator.perform_metrics(&self.config.metrics, &clustering);
            self.score(
                vec![Candidate {
                    pair: (0, 0),
                    builder: builder.clone(),
                    clustering,
                    raw,
                }],
                &weights,
            )?
        };
        let Some(initial) = initial else {
            return Err(Error::solver("initial clustering could not be scored"));
        };
        let mut previous_quality = initial.quality;

        if builder.cluster_count() <= self.config.min_cluster_amount {
            log::info!(
                "Initial clustering already has {} clusters, nothing to merge",
                builder.cluster_count()
            );
            self.persist(&mut outcome, initial);
            outcome.cache = self.cache.stats();
            return Ok(outcome);
        }

        let _phase = set_phase(SolverPhase::CandidateEvaluation);
        while builder.cluster_count() > self.config.min_cluster_amount {
            let clusters = builder.cluster_count();
            set_cluster_count(clusters);
            let exempt = outcome.steps == 0 && self.config.normalize_metrics;

            let mut widened = !self.config.optimize_on_shared_edges;
            let best = loop {
                let pairs = if widened {
                    all_pairs(&builder)
                } else {
                    adjacent_pairs(self.input, &builder)
                };
                if pairs.is_empty() {
                    if widened {
                        break None;
                    }
                    log::debug!("No linked clusters left at {} clusters, widening", clusters);
                    widened = true;
                    outcome.retries += 1;
                    continue;
                }

                let candidates = self.evaluate_pairs(&calculator, &builder, &pairs);
                let Some(best) = self.score(candidates, &weights)? else {
                    break None;
                };
                if best.quality > previous_quality && !widened && !exempt {
                    log::debug!(
                        "Best linked merge at {} clusters regressed ({:.6} > {:.6}), widening",
                        clusters,
                        best.quality,
                        previous_quality
                    );
                    widened = true;
                    outcome.retries += 1;
                    continue;
                }
                break Some(best);
            };

            let Some(best) = best else {
                log::warn!(
                    "No mergers remain at {} clusters (minimum {})",
                    clusters,
                    self.config.min_cluster_amount
                );
                outcome.exhausted = true;
                break;
            };

            log::debug!(
                "Merged clusters {} and {} with quality {:.6}",
                best.candidate.pair.0,
                best.candidate.pair.1,
                best.quality
            );
            builder = best.candidate.builder.clone();
            previous_quality = best.quality;
            outcome.steps += 1;
            self.persist(&mut outcome, best);
        }

        outcome.cache = self.cache.stats();
        log::info!(
            "AHCA finished after {} steps ({} retries), {} solutions, cache hit ratio {:.2}",
            outcome.steps,
            outcome.retries,
            outcome.solutions.len(),
            outcome.cache.hit_ratio()
        );
        Ok(outcome)
    }

    fn evaluate_pairs(
        &self,
        calculator: &QualityCalculator<'_>,
        builder: &ClusteringBuilder,
        pairs: &[(ClusterId, ClusterId)],
    ) -> Vec<Candidate> {
        set_progress(0, pairs.len());
        pairs
            .par_iter()
            .map(|&(a, b)| {
                let mut next = builder.clone();
                next.merge_cluster(a, b);
                let clustering = next.build();
                let raw = calculator.perform_metrics(&self.config.metrics, &clustering);
                increment_evaluated();
                Candidate {
                    pair: (a, b),
                    builder: next,
                    clustering,
                    raw,
                }
            })
            .collect()
    }

    /// Normalize over the batch, weigh, and keep the first lowest quality.
    fn score(&self, candidates: Vec<Candidate>, weights: &[f64]) -> Result<Option<Scored>> {
        let bounds = min_max(candidates.iter().map(|c| &c.raw));
        let scored = candidates
            .into_par_iter()
            .map(|candidate| {
                let normalized = normalize(&candidate.raw, &bounds);
                let basis = if self.config.normalize_metrics {
                    &normalized
                } else {
                    &candidate.raw
                };
                let quality = weighted_total_quality(basis, weights)?;
                Ok(Scored {
                    candidate,
                    normalized,
                    quality,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(scored
            .into_iter()
            .min_by(|a, b| a.quality.total_cmp(&b.quality)))
    }

    fn persist(&self, outcome: &mut AhcaOutcome, scored: Scored) {
        if scored.candidate.builder.cluster_count() > self.config.max_cluster_amount {
            return;
        }
        let solution = Solution::from_clustering(self.input, &scored.candidate.clustering)
            .with_metrics(scored.candidate.raw, scored.normalized)
            .with_quality(scored.quality);
        outcome.solutions.push(solution);
    }
}

/// Every unordered pair of clusters, ascending.
pub fn all_pairs(builder: &ClusteringBuilder) -> Vec<(ClusterId, ClusterId)> {
    let ids: Vec<ClusterId> = builder.cluster_ids().collect();
    let mut pairs = Vec::with_capacity(ids.len() * ids.len().saturating_sub(1) / 2);
    for (idx, &a) in ids.iter().enumerate() {
        for &b in &ids[idx + 1..] {
            pairs.push((a, b));
        }
    }
    pairs
}

/// Pairs of clusters linked through the input's adjacency, ascending.
pub fn adjacent_pairs(
    input: &EvaluationInput,
    builder: &ClusteringBuilder,
) -> Vec<(ClusterId, ClusterId)> {
    let mut pairs = BTreeSet::new();
    for &class in input.other_classes() {
        let Some(own) = builder.cluster_of(class) else {
            continue;
        };
        for &neighbor in input.neighbors(class) {
            if let Some(other) = builder.cluster_of(neighbor) {
                if other != own {
                    pairs.insert((own.min(other), own.max(other)));
                }
            }
        }
    }
    pairs.into_iter().collect()
}

/// Run AHCA with a fresh cache sized by `memory_limit`.
pub fn run_ahca(
    input: &EvaluationInput,
    config: &AhcaConfig,
    seed: Option<Solution>,
    memory_limit: usize,
) -> Result<AhcaOutcome> {
    let mut solver = AhcaSolver::new(input, config.clone())
        .with_cache(OptimizationData::with_memory_limit(memory_limit));
    if let Some(seed) = seed {
        solver = solver.with_seed(seed);
    }
    solver.run()
}
