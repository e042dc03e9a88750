//! Quality scoring shared by both solvers.

pub mod calculator;
pub mod optimization_data;

pub use calculator::{
    min_max, normalize, normalize_value, weighted_total_quality, MinMax, MinMaxAccumulator,
    QualityCalculator,
};
pub use optimization_data::{CacheStats, OptimizationData, SubMetric, DEFAULT_MEMORY_LIMIT};
