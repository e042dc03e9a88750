//! Feature modularization.
//!
//! Each cluster is summarized by its predominant feature tag and the share
//! of its tagged classes carrying that tag. The summed shares are divided by
//! the number of distinct predominant features across the solution, so a
//! solution spreading many features over its clusters is penalized.

use super::MetricContext;
use crate::clustering::Clustering;
use crate::graph::{ClassId, EvaluationInput};
use im::OrdSet;
use std::collections::{BTreeMap, BTreeSet};

/// Predominant feature of one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct PredominantFeature {
    pub feature: String,
    /// Count of the feature over the number of tagged classes
    pub share: f64,
}

/// `−Σ_M share(M) / |distinct predominant features|`, 0 when nothing is tagged.
pub fn feature_modularization(ctx: &MetricContext<'_>, clustering: &Clustering) -> f64 {
    let mut features = BTreeSet::new();
    let mut total_share = 0.0;

    for (_, members) in clustering.clusters() {
        if let Some(predominant) = predominant_feature(ctx.input, members) {
            total_share += predominant.share;
            features.insert(predominant.feature);
        }
    }

    if features.is_empty() {
        0.0
    } else {
        -total_share / features.len() as f64
    }
}

/// Most frequent tag among the cluster's tagged classes.
///
/// Ties go to the lexicographically smallest tag.
pub fn predominant_feature(
    input: &EvaluationInput,
    members: &OrdSet<ClassId>,
) -> Option<PredominantFeature> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut tagged = 0usize;

    for class in members.iter() {
        let features = &input.class(*class).features;
        if features.is_empty() {
            continue;
        }
        tagged += 1;
        for feature in features {
            *counts.entry(feature.as_str()).or_insert(0) += 1;
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (feature, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((feature, count));
        }
    }

    best.map(|(feature, count)| PredominantFeature {
        feature: feature.to_string(),
        share: count as f64 / tagged as f64,
    })
}
