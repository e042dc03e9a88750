//! Carvalho-style cohesion and coupling.

use super::MetricContext;
use crate::clustering::Clustering;
use crate::graph::{ClassId, EvaluationInput};
use crate::quality::SubMetric;
use im::OrdSet;

/// Cohesion credited to a one-class cluster.
pub const SINGLETON_COHESION: f64 = 0.25;

/// `−Σ_M cohesion(M)`
pub fn cohesion(ctx: &MetricContext<'_>, clustering: &Clustering) -> f64 {
    -clustering
        .clusters()
        .map(|(_, members)| {
            ctx.per_cluster(SubMetric::CarvalhoCohesion, members, || {
                cluster_cohesion(ctx.input, members)
            })
        })
        .sum::<f64>()
}

/// Σ static frequency of dependences whose ends lie in different clusters.
pub fn coupling(ctx: &MetricContext<'_>, clustering: &Clustering) -> f64 {
    clustering
        .clusters()
        .map(|(_, members)| {
            ctx.per_cluster(SubMetric::OutgoingCoupling, members, || {
                outgoing_static_frequency(ctx.input, members)
            })
        })
        .sum()
}

/// Intra-cluster static frequency over `n·(n−1)`, halved.
pub fn cluster_cohesion(input: &EvaluationInput, members: &OrdSet<ClassId>) -> f64 {
    let size = members.len();
    if size < 2 {
        return SINGLETON_COHESION;
    }
    let intra: u64 = members
        .iter()
        .flat_map(|class| input.dependences(*class))
        .filter(|pair| members.contains(&pair.target))
        .map(|pair| pair.static_frequency)
        .sum();
    intra as f64 / (size * (size - 1)) as f64 / 2.0
}

/// Static frequency leaving the cluster.
pub fn outgoing_static_frequency(input: &EvaluationInput, members: &OrdSet<ClassId>) -> f64 {
    members
        .iter()
        .flat_map(|class| input.dependences(*class))
        .filter(|pair| !members.contains(&pair.target))
        .map(|pair| pair.static_frequency as f64)
        .sum()
}
