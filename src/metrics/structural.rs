//! Structural behavior: FOne and FAutonomy.
//!
//! `coup(i, j)` is the share of all application calls exchanged between two
//! classes, or no value when they never call each other. Averaged coupling
//! over a set of pairs is `(Σ coup − σ(coup)) / pairs`, where pairs without a
//! relationship still count in the denominator.

use super::{outside, sigma, MetricContext};
use crate::clustering::Clustering;
use crate::graph::{ClassId, EvaluationInput};
use crate::quality::SubMetric;
use im::OrdSet;

/// `FOne = −Σ_M ½ (interCoup(M) + interCoh(M))`
pub fn f_one(ctx: &MetricContext<'_>, clustering: &Clustering) -> f64 {
    -clustering
        .clusters()
        .map(|(_, members)| {
            let coupling = ctx.per_cluster(SubMetric::InterCoupling, members, || {
                inter_coupling(ctx.input, members)
            });
            let cohesion = ctx.per_cluster(SubMetric::InterCohesion, members, || {
                inter_cohesion(ctx.input, members)
            });
            0.5 * (coupling + cohesion)
        })
        .sum::<f64>()
}

/// `FAutonomy = mean_M exterCoup(M)`
pub fn f_autonomy(ctx: &MetricContext<'_>, clustering: &Clustering) -> f64 {
    let count = clustering.cluster_count();
    if count == 0 {
        return 0.0;
    }
    let total: f64 = clustering
        .clusters()
        .map(|(_, members)| {
            ctx.per_cluster(SubMetric::ExterCoupling, members, || {
                exter_coupling(ctx.input, members)
            })
        })
        .sum();
    total / count as f64
}

/// Share of application calls between `i` and `j`, both directions.
pub fn coup(input: &EvaluationInput, i: ClassId, j: ClassId) -> Option<f64> {
    let total = input.total_calls();
    if total <= 0.0 {
        return None;
    }
    let calls = input.calls_between(i, j);
    if calls <= 0.0 {
        None
    } else {
        Some(calls / total)
    }
}

/// `(Σ coup − σ(coup)) / pairCount`, 0 without pairs.
pub fn averaged_coupling(values: &[Option<f64>]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().flatten().sum();
    (sum - sigma(values)) / values.len() as f64
}

/// Averaged coupling over unordered pairs inside the cluster.
pub fn inter_coupling(input: &EvaluationInput, members: &OrdSet<ClassId>) -> f64 {
    let classes: Vec<ClassId> = members.iter().copied().collect();
    let mut values = Vec::with_capacity(classes.len() * classes.len().saturating_sub(1) / 2);
    for (idx, &i) in classes.iter().enumerate() {
        for &j in &classes[idx + 1..] {
            values.push(coup(input, i, j));
        }
    }
    averaged_coupling(&values)
}

/// Averaged coupling over pairs crossing the cluster boundary.
pub fn exter_coupling(input: &EvaluationInput, members: &OrdSet<ClassId>) -> f64 {
    let external: Vec<ClassId> = outside(input, members).collect();
    let mut values = Vec::with_capacity(members.len() * external.len());
    for &i in members.iter() {
        for &j in &external {
            values.push(coup(input, i, j));
        }
    }
    averaged_coupling(&values)
}

/// Direct intra-cluster connections over all possible ones.
///
/// The possible count is `Σ method_count × (|M| − 1)`; clusters with fewer
/// than two classes, or without methods, score 0.
pub fn inter_cohesion(input: &EvaluationInput, members: &OrdSet<ClassId>) -> f64 {
    let size = members.len();
    if size < 2 {
        return 0.0;
    }
    let possible: f64 = members
        .iter()
        .map(|class| input.class(*class).method_count() as f64 * (size - 1) as f64)
        .sum();
    if possible <= 0.0 {
        return 0.0;
    }
    let actual: f64 = members
        .iter()
        .flat_map(|class| input.dependences(*class))
        .filter(|pair| members.contains(&pair.target))
        .map(|pair| pair.connections as f64)
        .sum();
    actual / possible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::ClusteringBuilder;
    use crate::graph::{ClassSpec, RelationshipSpec};
    use crate::quality::OptimizationData;

    /// A→B 3 calls, B→C 1 call; A and B have 2 methods, C has 1.
    fn input() -> EvaluationInput {
        EvaluationInput::builder()
            .class(ClassSpec::other("a.A", 2))
            .class(ClassSpec::other("a.B", 2))
            .class(ClassSpec::other("a.C", 1))
            .relationship(RelationshipSpec::dependence("a.A", "a.B", 3))
            .relationship(RelationshipSpec::dependence("a.B", "a.C", 1))
            .build()
            .unwrap()
    }

    fn set(ids: &[usize]) -> OrdSet<ClassId> {
        ids.iter().map(|i| ClassId(*i)).collect()
    }

    #[test]
    fn test_coup_share_of_total_calls() {
        let input = input();
        assert_eq!(coup(&input, ClassId(0), ClassId(1)), Some(0.75));
        assert_eq!(coup(&input, ClassId(1), ClassId(0)), Some(0.75));
        assert_eq!(coup(&input, ClassId(0), ClassId(2)), None);
    }

    #[test]
    fn test_averaged_coupling_counts_missing_pairs() {
        // Σ = 1.0, σ over the single present value = 0, 2 pairs
        assert_eq!(averaged_coupling(&[Some(1.0), None]), 0.5);
        assert_eq!(averaged_coupling(&[]), 0.0);
    }

    #[test]
    fn test_inter_cohesion() {
        let input = input();
        // 3 connections A→B over (2 + 2) × 1 possible
        assert_eq!(inter_cohesion(&input, &set(&[0, 1])), 0.75);
        assert_eq!(inter_cohesion(&input, &set(&[2])), 0.0);
    }

    #[test]
    fn test_exter_coupling_of_singleton() {
        let input = input();
        // C against A (none) and B (0.25): (0.25 − 0) / 2
        assert_eq!(exter_coupling(&input, &set(&[2])), 0.125);
    }

    #[test]
    fn test_f_one_and_f_autonomy() {
        let input = input();
        let cache = OptimizationData::new();
        let ctx = MetricContext::new(&input, &cache);

        let mut builder = ClusteringBuilder::singletons(&input);
        builder.merge_cluster(0, 1);
        let clustering = builder.build();

        // {A,B}: interCoup 0.75, interCoh 0.75; {C}: 0
        assert_eq!(f_one(&ctx, &clustering), -0.75);
        // {A,B}: pairs A–C none, B–C 0.25 → (0.25 − 0) / 2 = 0.125; {C}: 0.125
        assert_eq!(f_autonomy(&ctx, &clustering), 0.125);
    }
}
