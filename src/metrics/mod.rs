//! Architecture-quality metrics of a clustering.
//!
//! Every metric is a pure function of a [`Clustering`] and the frozen
//! [`EvaluationInput`] it partitions. All metrics are oriented so that lower
//! is better: maximization metrics are negated.
//!
//! Metrics are grouped under a [`MetricType`], one logical objective. The
//! declaration order of `MetricType` and of the metrics inside each type is
//! the flattening order used for weights and optimizer objectives.
//!
//! | Type | Metrics |
//! |------|---------|
//! | `DataAutonomy` | `FIntra`, `FInter` |
//! | `StructuralBehavior` | `FOne`, `FAutonomy` |
//! | `Carvalho` | `CarvalhoCohesion`, `CarvalhoCoupling` |
//! | `Overhead` | `Overhead` |
//! | `FeatureModularization` | `FeatureModularization` |

pub mod carvalho;
pub mod data_autonomy;
pub mod feature;
pub mod overhead;
pub mod sigma;
pub mod structural;

pub use sigma::{sample_std_dev, sigma};

use crate::clustering::{cluster_key, Clustering};
use crate::graph::{ClassId, EvaluationInput};
use crate::quality::{OptimizationData, SubMetric};
use im::OrdSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Raw or normalized values per metric type, each in metric order.
pub type MetricValues = BTreeMap<MetricType, Vec<f64>>;

/// Logical objective grouping one or more metrics.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    DataAutonomy,
    StructuralBehavior,
    Carvalho,
    Overhead,
    FeatureModularization,
}

/// A single scalar metric.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Metric {
    FIntra,
    FInter,
    FOne,
    FAutonomy,
    CarvalhoCohesion,
    CarvalhoCoupling,
    Overhead,
    FeatureModularization,
}

impl MetricType {
    pub const ALL: [MetricType; 5] = [
        MetricType::DataAutonomy,
        MetricType::StructuralBehavior,
        MetricType::Carvalho,
        MetricType::Overhead,
        MetricType::FeatureModularization,
    ];

    pub fn metrics(self) -> &'static [Metric] {
        match self {
            Self::DataAutonomy => &[Metric::FIntra, Metric::FInter],
            Self::StructuralBehavior => &[Metric::FOne, Metric::FAutonomy],
            Self::Carvalho => &[Metric::CarvalhoCohesion, Metric::CarvalhoCoupling],
            Self::Overhead => &[Metric::Overhead],
            Self::FeatureModularization => &[Metric::FeatureModularization],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DataAutonomy => "data_autonomy",
            Self::StructuralBehavior => "structural_behavior",
            Self::Carvalho => "carvalho",
            Self::Overhead => "overhead",
            Self::FeatureModularization => "feature_modularization",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        MetricType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown metric type '{}' (expected one of: {})",
                    s,
                    MetricType::ALL.map(|t| t.as_str()).join(", ")
                )
            })
    }
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FIntra => "f_intra",
            Self::FInter => "f_inter",
            Self::FOne => "f_one",
            Self::FAutonomy => "f_autonomy",
            Self::CarvalhoCohesion => "carvalho_cohesion",
            Self::CarvalhoCoupling => "carvalho_coupling",
            Self::Overhead => "overhead",
            Self::FeatureModularization => "feature_modularization",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of scalar metrics once the types are flattened.
pub fn flattened_len(metric_types: &[MetricType]) -> usize {
    flatten_metrics(metric_types).len()
}

/// Metrics of the given types in flattening order, duplicates removed.
pub fn flatten_metrics(metric_types: &[MetricType]) -> Vec<Metric> {
    let mut types = metric_types.to_vec();
    types.sort();
    types.dedup();
    types
        .into_iter()
        .flat_map(|t| t.metrics().iter().copied())
        .collect()
}

/// Everything a metric needs besides the clustering itself.
#[derive(Debug, Clone, Copy)]
pub struct MetricContext<'a> {
    pub input: &'a EvaluationInput,
    pub cache: &'a OptimizationData,
}

impl<'a> MetricContext<'a> {
    pub fn new(input: &'a EvaluationInput, cache: &'a OptimizationData) -> Self {
        Self { input, cache }
    }

    /// Per-cluster value, memoized under the canonical member key.
    pub(crate) fn per_cluster<F>(
        &self,
        metric: SubMetric,
        members: &OrdSet<ClassId>,
        compute: F,
    ) -> f64
    where
        F: FnOnce() -> f64,
    {
        self.cache.get_or_compute(metric, cluster_key(members), compute)
    }
}

/// Evaluate one scalar metric.
pub fn compute_metric(metric: Metric, ctx: &MetricContext<'_>, clustering: &Clustering) -> f64 {
    match metric {
        Metric::FIntra => data_autonomy::f_intra(ctx, clustering),
        Metric::FInter => data_autonomy::f_inter(ctx, clustering),
        Metric::FOne => structural::f_one(ctx, clustering),
        Metric::FAutonomy => structural::f_autonomy(ctx, clustering),
        Metric::CarvalhoCohesion => carvalho::cohesion(ctx, clustering),
        Metric::CarvalhoCoupling => carvalho::coupling(ctx, clustering),
        Metric::Overhead => overhead::overhead(ctx, clustering),
        Metric::FeatureModularization => feature::feature_modularization(ctx, clustering),
    }
}

/// Evaluate every metric of one type, in metric order.
pub fn compute_metric_type(
    metric_type: MetricType,
    ctx: &MetricContext<'_>,
    clustering: &Clustering,
) -> Vec<f64> {
    metric_type
        .metrics()
        .iter()
        .map(|metric| compute_metric(*metric, ctx, clustering))
        .collect()
}

/// Flatten values in `MetricType` order.
pub fn flatten_values(values: &MetricValues) -> Vec<f64> {
    values.values().flat_map(|v| v.iter().copied()).collect()
}

/// Behavioral classes outside `members`.
pub(crate) fn outside<'a>(
    input: &'a EvaluationInput,
    members: &'a OrdSet<ClassId>,
) -> impl Iterator<Item = ClassId> + 'a {
    input
        .other_classes()
        .iter()
        .copied()
        .filter(move |class| !members.contains(class))
}
