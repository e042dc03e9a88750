//! Data autonomy: FIntra and FInter.
//!
//! Two behavioral classes depend on each other through the data classes
//! they both touch. The dependency strength of one shared data class is
//! `dataDepends · freq`, where `dataDepends` is 1.0 when both classes write
//! it, 0.5 when exactly one does and 0.25 when both only read, and
//! `freq = f_i + f_j − σ(f_i, f_j)` over the two classes' access
//! frequencies. A pair's value is summed over shared data classes and
//! divided by the number of distinct data classes the microservice touches.
//!
//! FIntra rewards strong data dependencies inside a microservice (negated),
//! FInter penalizes those crossing its boundary.

use super::{outside, sample_std_dev, MetricContext};
use crate::clustering::Clustering;
use crate::graph::{ClassId, EvaluationInput};
use crate::quality::SubMetric;
use im::OrdSet;
use std::collections::BTreeSet;

/// Strength of a shared data class given which side writes it.
pub fn data_depends(i_writes: bool, j_writes: bool) -> f64 {
    match (i_writes, j_writes) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.5,
        (false, false) => 0.25,
    }
}

/// `FIntra = −Σ_M intra(M)`
pub fn f_intra(ctx: &MetricContext<'_>, clustering: &Clustering) -> f64 {
    -clustering
        .clusters()
        .map(|(_, members)| {
            ctx.per_cluster(SubMetric::IntraData, members, || {
                intra_contribution(ctx.input, members)
            })
        })
        .sum::<f64>()
}

/// `FInter = Σ_M inter(M)`
pub fn f_inter(ctx: &MetricContext<'_>, clustering: &Clustering) -> f64 {
    clustering
        .clusters()
        .map(|(_, members)| {
            ctx.per_cluster(SubMetric::InterData, members, || {
                inter_contribution(ctx.input, members)
            })
        })
        .sum()
}

/// Data dependency summed over unordered pairs inside the microservice.
pub fn intra_contribution(input: &EvaluationInput, members: &OrdSet<ClassId>) -> f64 {
    let manipulated = manipulated_data_classes(input, members);
    if manipulated == 0 {
        return 0.0;
    }
    let classes: Vec<ClassId> = members.iter().copied().collect();

    let mut total = 0.0;
    for (idx, &i) in classes.iter().enumerate() {
        for &j in &classes[idx + 1..] {
            total += pair_data(input, i, j, manipulated);
        }
    }
    total
}

/// Data dependency between members and every class outside the microservice.
pub fn inter_contribution(input: &EvaluationInput, members: &OrdSet<ClassId>) -> f64 {
    let manipulated = manipulated_data_classes(input, members);
    if manipulated == 0 {
        return 0.0;
    }

    let external: Vec<ClassId> = outside(input, members)
        .filter(|class| !input.data_access(*class).is_empty())
        .collect();
    if external.is_empty() {
        return 0.0;
    }

    members
        .iter()
        .map(|&i| {
            external
                .iter()
                .map(|&j| pair_data(input, i, j, manipulated))
                .sum::<f64>()
        })
        .sum()
}

/// `data(i, j)` for a microservice touching `manipulated` data classes.
pub fn pair_data(input: &EvaluationInput, i: ClassId, j: ClassId, manipulated: usize) -> f64 {
    let access_j = input.data_access(j);
    let shared: f64 = input
        .data_access(i)
        .iter()
        .filter_map(|(data_class, a)| access_j.get(data_class).map(|b| (a, b)))
        .map(|(a, b)| {
            let freq =
                a.frequency + b.frequency - sample_std_dev(&[a.frequency, b.frequency]);
            data_depends(a.writes, b.writes) * freq
        })
        .sum();
    shared / manipulated as f64
}

fn manipulated_data_classes(input: &EvaluationInput, members: &OrdSet<ClassId>) -> usize {
    members
        .iter()
        .flat_map(|class| input.data_access(*class).keys())
        .collect::<BTreeSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::ClusteringBuilder;
    use crate::graph::{ClassSpec, DataAccess, RelationshipSpec};
    use crate::quality::OptimizationData;

    /// A and B write Row, C reads Row; D touches nothing.
    fn input() -> EvaluationInput {
        EvaluationInput::builder()
            .class(ClassSpec::other("a.A", 1))
            .class(ClassSpec::other("a.B", 1))
            .class(ClassSpec::other("a.C", 1))
            .class(ClassSpec::other("a.D", 1))
            .class(ClassSpec::data("a.Row"))
            .relationship(RelationshipSpec::data("a.A", "a.Row", DataAccess::Write, 2))
            .relationship(RelationshipSpec::data("a.B", "a.Row", DataAccess::Write, 2))
            .relationship(RelationshipSpec::data("a.C", "a.Row", DataAccess::Read, 2))
            .build()
            .unwrap()
    }

    #[test]
    fn test_data_depends_levels() {
        assert_eq!(data_depends(true, true), 1.0);
        assert_eq!(data_depends(true, false), 0.5);
        assert_eq!(data_depends(false, true), 0.5);
        assert_eq!(data_depends(false, false), 0.25);
    }

    #[test]
    fn test_pair_data_equal_frequencies() {
        let input = input();
        // Equal frequencies: σ = 0, freq = 4
        assert_eq!(pair_data(&input, ClassId(0), ClassId(1), 1), 4.0);
        assert_eq!(pair_data(&input, ClassId(0), ClassId(2), 1), 2.0);
        assert_eq!(pair_data(&input, ClassId(0), ClassId(3), 1), 0.0);
    }

    #[test]
    fn test_intra_and_inter_split() {
        let input = input();
        let cache = OptimizationData::new();
        let ctx = MetricContext::new(&input, &cache);

        // {A, B} | {C} | {D}
        let mut builder = ClusteringBuilder::singletons(&input);
        builder.merge_cluster(0, 1);
        let clustering = builder.build();

        assert_eq!(f_intra(&ctx, &clustering), -4.0);
        // {A,B}: A–C 2 + B–C 2 = 4; {C}: C–A 2 + C–B 2 = 4; {D}: no data
        assert_eq!(f_inter(&ctx, &clustering), 8.0);
    }

    #[test]
    fn test_no_data_classes_contribute_zero() {
        let input = input();
        let members: OrdSet<ClassId> = std::iter::once(ClassId(3)).collect();
        assert_eq!(intra_contribution(&input, &members), 0.0);
        assert_eq!(inter_contribution(&input, &members), 0.0);
    }

    #[test]
    fn test_no_external_classes_contribute_zero() {
        let input = input();
        let members: OrdSet<ClassId> = input.other_classes().iter().copied().collect();
        assert_eq!(inter_contribution(&input, &members), 0.0);
    }
}
