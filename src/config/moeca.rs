use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ahca::{default_max_cluster_amount, default_metrics, default_min_cluster_amount};
use crate::metrics::MetricType;
use crate::solver::moeca::{Encoding, NSGA2};

fn default_algorithm() -> String {
    NSGA2.to_string()
}

fn default_max_evaluations() -> usize {
    10_000
}

fn default_population_size() -> usize {
    100
}

/// Settings of the evolutionary search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoecaConfig {
    /// Registered optimizer name (default: nsga2)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    #[serde(default)]
    pub encoding: Encoding,

    /// Evaluation budget (default: 10000)
    #[serde(default = "default_max_evaluations")]
    pub max_evaluations: usize,

    /// Wall-clock budget in seconds; unbounded when absent
    #[serde(default)]
    pub max_time_secs: Option<u64>,

    #[serde(default = "default_population_size")]
    pub population_size: usize,

    /// Metric types, one objective per flattened metric
    #[serde(default = "default_metrics")]
    pub metrics: Vec<MetricType>,

    #[serde(default = "default_min_cluster_amount")]
    pub min_cluster_amount: usize,

    #[serde(default = "default_max_cluster_amount")]
    pub max_cluster_amount: usize,

    /// RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for MoecaConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            encoding: Encoding::default(),
            max_evaluations: default_max_evaluations(),
            max_time_secs: None,
            population_size: default_population_size(),
            metrics: default_metrics(),
            min_cluster_amount: default_min_cluster_amount(),
            max_cluster_amount: default_max_cluster_amount(),
            seed: None,
        }
    }
}

impl MoecaConfig {
    pub fn max_time(&self) -> Option<Duration> {
        self.max_time_secs.map(Duration::from_secs)
    }
}
