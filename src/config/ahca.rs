use serde::{Deserialize, Serialize};

use crate::metrics::{flattened_len, MetricType};

pub fn default_min_cluster_amount() -> usize {
    2
}

pub fn default_max_cluster_amount() -> usize {
    20
}

pub fn default_metrics() -> Vec<MetricType> {
    MetricType::ALL.to_vec()
}

fn default_optimize_on_shared_edges() -> bool {
    true
}

/// Settings of the agglomerative search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AhcaConfig {
    /// Metric types scored at each step (default: all)
    #[serde(default = "default_metrics")]
    pub metrics: Vec<MetricType>,

    /// One weight per flattened metric; empty means all 1.0
    #[serde(default)]
    pub weights: Vec<f64>,

    /// Stop once this many clusters remain (default: 2)
    #[serde(default = "default_min_cluster_amount")]
    pub min_cluster_amount: usize,

    /// Persist step solutions with at most this many clusters (default: 20)
    #[serde(default = "default_max_cluster_amount")]
    pub max_cluster_amount: usize,

    /// Only merge clusters linked by a dependence or a shared data class
    #[serde(default = "default_optimize_on_shared_edges")]
    pub optimize_on_shared_edges: bool,

    /// Score candidates on values normalized across the step
    #[serde(default)]
    pub normalize_metrics: bool,
}

impl Default for AhcaConfig {
    fn default() -> Self {
        Self {
            metrics: default_metrics(),
            weights: Vec::new(),
            min_cluster_amount: default_min_cluster_amount(),
            max_cluster_amount: default_max_cluster_amount(),
            optimize_on_shared_edges: default_optimize_on_shared_edges(),
            normalize_metrics: false,
        }
    }
}

impl AhcaConfig {
    /// Configured weights, or 1.0 per flattened metric when none are set.
    pub fn resolved_weights(&self) -> Vec<f64> {
        if self.weights.is_empty() {
            vec![1.0; flattened_len(&self.metrics)]
        } else {
            self.weights.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_weights_default_to_one_per_metric() {
        let config = AhcaConfig {
            metrics: vec![MetricType::Carvalho, MetricType::Overhead],
            ..AhcaConfig::default()
        };
        assert_eq!(config.resolved_weights(), vec![1.0, 1.0, 1.0]);

        let weighted = AhcaConfig {
            weights: vec![2.0, 1.0, 0.5],
            ..config
        };
        assert_eq!(weighted.resolved_weights(), vec![2.0, 1.0, 0.5]);
    }
}
