//! Weighted aggregation and min-max normalization of metric vectors.

use crate::clustering::Clustering;
use crate::errors::{Error, Result};
use crate::graph::EvaluationInput;
use crate::metrics::{compute_metric_type, flatten_values, MetricContext, MetricType, MetricValues};
use crate::quality::OptimizationData;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Observed `(min, max)` per metric, grouped like [`MetricValues`].
pub type MinMax = BTreeMap<MetricType, Vec<(f64, f64)>>;

/// Scores clusterings of one input through a shared cache.
#[derive(Debug, Clone, Copy)]
pub struct QualityCalculator<'a> {
    ctx: MetricContext<'a>,
}

impl<'a> QualityCalculator<'a> {
    pub fn new(input: &'a EvaluationInput, cache: &'a OptimizationData) -> Self {
        Self {
            ctx: MetricContext::new(input, cache),
        }
    }

    pub fn input(&self) -> &'a EvaluationInput {
        self.ctx.input
    }

    pub fn cache(&self) -> &'a OptimizationData {
        self.ctx.cache
    }

    /// Raw values of every requested metric type.
    pub fn perform_metrics(
        &self,
        metric_types: &[MetricType],
        clustering: &Clustering,
    ) -> MetricValues {
        metric_types
            .iter()
            .map(|metric_type| {
                (
                    *metric_type,
                    compute_metric_type(*metric_type, &self.ctx, clustering),
                )
            })
            .collect()
    }
}

/// `Σ(value·weight) / Σweight` over the flattened values.
///
/// Weights must match the flattened metric count. A zero weight sum yields 0.
pub fn weighted_total_quality(values: &MetricValues, weights: &[f64]) -> Result<f64> {
    let flat = flatten_values(values);
    if flat.len() != weights.len() {
        return Err(Error::validation(format!(
            "{} weights given for {} metric values",
            weights.len(),
            flat.len()
        )));
    }

    let weight_sum: f64 = weights.iter().sum();
    if weight_sum == 0.0 {
        return Ok(0.0);
    }
    let weighted: f64 = flat.iter().zip(weights).map(|(v, w)| v * w).sum();
    Ok(weighted / weight_sum)
}

/// Per-metric bounds over a set of candidates.
pub fn min_max<'v, I>(values_list: I) -> MinMax
where
    I: IntoIterator<Item = &'v MetricValues>,
{
    let mut bounds = MinMax::new();
    for values in values_list {
        extend_bounds(&mut bounds, values);
    }
    bounds
}

fn extend_bounds(bounds: &mut MinMax, values: &MetricValues) {
    for (metric_type, metric_values) in values {
        let entry = bounds.entry(*metric_type).or_default();
        for (idx, value) in metric_values.iter().enumerate() {
            match entry.get_mut(idx) {
                Some((lo, hi)) => {
                    *lo = lo.min(*value);
                    *hi = hi.max(*value);
                }
                None => entry.push((*value, *value)),
            }
        }
    }
}

/// Map one value into `[0, 1]` against `(min, max)`.
///
/// Negative ranges are shifted so the floor is 0. Equal bounds leave the
/// shifted value capped at 1.
pub fn normalize_value(value: f64, min: f64, max: f64) -> f64 {
    let (mut value, mut min, mut max) = (value, min, max);
    if min < 0.0 {
        let shift = min.abs();
        value += shift;
        min += shift;
        max += shift;
    }
    if max == min {
        value.min(1.0)
    } else {
        (value - min) / (max - min)
    }
}

/// Normalize every value against its bounds.
///
/// Metrics missing from `min_max` are treated as having equal bounds at
/// their own value.
pub fn normalize(values: &MetricValues, min_max: &MinMax) -> MetricValues {
    values
        .iter()
        .map(|(metric_type, metric_values)| {
            let bounds = min_max.get(metric_type);
            let normalized = metric_values
                .iter()
                .enumerate()
                .map(|(idx, value)| {
                    let (lo, hi) = bounds
                        .and_then(|b| b.get(idx))
                        .copied()
                        .unwrap_or((*value, *value));
                    normalize_value(*value, lo, hi)
                })
                .collect();
            (*metric_type, normalized)
        })
        .collect()
}

/// Running bounds shared by concurrent evaluations.
#[derive(Debug, Default)]
pub struct MinMaxAccumulator {
    bounds: Mutex<MinMax>,
}

impl MinMaxAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, values: &MetricValues) {
        extend_bounds(&mut self.bounds.lock(), values);
    }

    pub fn snapshot(&self) -> MinMax {
        self.bounds.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::ClusteringBuilder;
    use crate::graph::{ClassSpec, RelationshipSpec};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rayon::prelude::*;

    fn values(carvalho: [f64; 2], overhead: f64) -> MetricValues {
        MetricValues::from([
            (MetricType::Carvalho, carvalho.to_vec()),
            (MetricType::Overhead, vec![overhead]),
        ])
    }

    #[test]
    fn test_perform_metrics_keys_requested_types() {
        let input = EvaluationInput::builder()
            .class(ClassSpec::other("a.A", 1))
            .class(ClassSpec::other("a.B", 1))
            .relationship(RelationshipSpec::dependence("a.A", "a.B", 2))
            .build()
            .unwrap();
        let cache = OptimizationData::new();
        let calculator = QualityCalculator::new(&input, &cache);
        let clustering = ClusteringBuilder::singletons(&input).build();

        let result =
            calculator.perform_metrics(&[MetricType::Overhead, MetricType::Carvalho], &clustering);

        assert_eq!(
            result,
            MetricValues::from([
                (MetricType::Carvalho, vec![-0.5, 2.0]),
                (MetricType::Overhead, vec![0.0]),
            ])
        );
    }

    #[test]
    fn test_weighted_quality() {
        let v = values([-1.0, 4.0], 2.0);
        assert_eq!(weighted_total_quality(&v, &[1.0, 1.0, 2.0]).unwrap(), 7.0 / 4.0);
        assert_eq!(weighted_total_quality(&v, &[0.0, 0.0, 0.0]).unwrap(), 0.0);
        assert!(matches!(
            weighted_total_quality(&v, &[1.0]),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_min_max_over_candidates() {
        let list = [values([-1.0, 4.0], 2.0), values([-3.0, 5.0], 1.0)];
        let bounds = min_max(&list);
        assert_eq!(bounds[&MetricType::Carvalho], vec![(-3.0, -1.0), (4.0, 5.0)]);
        assert_eq!(bounds[&MetricType::Overhead], vec![(1.0, 2.0)]);
    }

    #[test]
    fn test_normalize_shifts_negative_ranges() {
        assert_eq!(normalize_value(-3.0, -3.0, -1.0), 0.0);
        assert_eq!(normalize_value(-1.0, -3.0, -1.0), 1.0);
        assert_eq!(normalize_value(-2.0, -3.0, -1.0), 0.5);
    }

    #[test]
    fn test_normalize_caps_equal_bounds() {
        assert_eq!(normalize_value(4.0, 4.0, 4.0), 1.0);
        assert_eq!(normalize_value(0.5, 0.5, 0.5), 0.5);
        // shifted to 0
        assert_eq!(normalize_value(-2.0, -2.0, -2.0), 0.0);
    }

    #[test]
    fn test_normalize_map() {
        let list = [values([-1.0, 4.0], 2.0), values([-3.0, 5.0], 1.0)];
        let bounds = min_max(&list);
        assert_eq!(
            normalize(&list[0], &bounds),
            values([1.0, 0.0], 1.0)
        );
    }

    #[test]
    fn test_accumulator_concurrent_updates() {
        let accumulator = MinMaxAccumulator::new();
        assert!(accumulator.is_empty());
        (0..100).into_par_iter().for_each(|i| {
            accumulator.update(&values([-(i as f64), i as f64], 1.0));
        });
        let bounds = accumulator.snapshot();
        assert_eq!(bounds[&MetricType::Carvalho], vec![(-99.0, 0.0), (0.0, 99.0)]);
        assert_eq!(bounds[&MetricType::Overhead], vec![(1.0, 1.0)]);
    }

    proptest! {
        #[test]
        fn prop_weighted_quality_scale_invariant(
            raw in prop::collection::vec(-100.0f64..100.0, 3),
            weights in prop::collection::vec(0.01f64..10.0, 3),
            scale in 0.01f64..1000.0,
        ) {
            let v = values([raw[0], raw[1]], raw[2]);
            let scaled: Vec<f64> = weights.iter().map(|w| w * scale).collect();
            let base = weighted_total_quality(&v, &weights).unwrap();
            let other = weighted_total_quality(&v, &scaled).unwrap();
            prop_assert!((base - other).abs() <= 1e-9 * base.abs().max(1.0));
        }

        #[test]
        fn prop_normalize_maps_bounds_to_unit_interval(
            a in -1000.0f64..1000.0,
            b in -1000.0f64..1000.0,
            t in 0.0f64..=1.0,
        ) {
            prop_assume!((a - b).abs() > 1e-6);
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            prop_assert!(normalize_value(lo, lo, hi).abs() < 1e-9);
            prop_assert!((normalize_value(hi, lo, hi) - 1.0).abs() < 1e-9);
            let mid = normalize_value(lo + t * (hi - lo), lo, hi);
            prop_assert!((-1e-9..=1.0 + 1e-9).contains(&mid));
        }
    }
}
