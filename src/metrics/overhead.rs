//! Communication overhead between microservices.
//!
//! Every dependence crossing a cluster boundary has to ship its argument
//! types over the wire. Its cost is `Σ size(type) × times shared`, with
//! type sizes resolved when the input is frozen (known class size, nominal
//! primitive size, or the application-wide average).

use super::MetricContext;
use crate::clustering::Clustering;
use crate::graph::{ClassId, EvaluationInput};
use crate::quality::SubMetric;
use im::OrdSet;

pub fn overhead(ctx: &MetricContext<'_>, clustering: &Clustering) -> f64 {
    clustering
        .clusters()
        .map(|(_, members)| {
            ctx.per_cluster(SubMetric::OutgoingOverhead, members, || {
                outgoing_overhead(ctx.input, members)
            })
        })
        .sum()
}

pub fn outgoing_overhead(input: &EvaluationInput, members: &OrdSet<ClassId>) -> f64 {
    members
        .iter()
        .flat_map(|class| input.dependences(*class))
        .filter(|pair| !members.contains(&pair.target))
        .map(|pair| pair.overhead)
        .sum()
}
