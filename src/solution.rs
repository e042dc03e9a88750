//! Persisted outcome of a solver step or front member.

use crate::clustering::Clustering;
use crate::graph::EvaluationInput;
use crate::metrics::MetricValues;
use serde::{Deserialize, Serialize};

/// One recommended microservice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Microservice {
    pub ordinal: usize,
    /// Fully-qualified identifiers of the member classes
    pub classes: Vec<String>,
}

impl Microservice {
    pub fn new(ordinal: usize, classes: Vec<String>) -> Self {
        Self { ordinal, classes }
    }
}

/// A partition together with the metric values it was selected on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub microservices: Vec<Microservice>,
    #[serde(default)]
    pub metric_values: MetricValues,
    #[serde(default)]
    pub normalized_values: MetricValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
}

impl Solution {
    pub fn new(microservices: Vec<Microservice>) -> Self {
        Self {
            microservices,
            ..Self::default()
        }
    }

    /// Materialize a clustering; ordinals are dense in cluster id order.
    pub fn from_clustering(input: &EvaluationInput, clustering: &Clustering) -> Self {
        let microservices = clustering
            .clusters()
            .enumerate()
            .map(|(ordinal, (_, members))| {
                let classes = members
                    .iter()
                    .map(|class| input.class(*class).identifier.clone())
                    .collect();
                Microservice::new(ordinal, classes)
            })
            .collect();
        Self::new(microservices)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_metrics(mut self, raw: MetricValues, normalized: MetricValues) -> Self {
        self.metric_values = raw;
        self.normalized_values = normalized;
        self
    }

    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn cluster_count(&self) -> usize {
        self.microservices.len()
    }

    pub fn class_count(&self) -> usize {
        self.microservices.iter().map(|m| m.classes.len()).sum()
    }
}
