//! Microservice decomposition recommender.
//!
//! Given a class-dependency graph of a monolith ([`graph`]), servicemap
//! scores candidate partitions with a library of cohesion and coupling
//! metrics ([`metrics`], [`quality`]) and searches for good ones with two
//! solvers ([`solver`]): greedy agglomerative merging (AHCA) and
//! multi-objective evolutionary search (MOECA).

// Export modules for library usage
pub mod cli;
pub mod clustering;
pub mod commands;
pub mod config;
pub mod errors;
pub mod graph;
pub mod metrics;
pub mod observability;
pub mod quality;
pub mod solution;
pub mod solver;
pub mod store;

// Re-export commonly used types
pub use crate::clustering::{ClusterId, Clustering, ClusteringBuilder};
pub use crate::config::{AhcaConfig, MoecaConfig, ServicemapConfig};
pub use crate::errors::{Error, Result};
pub use crate::graph::{ClassId, ClassSpec, EvaluationInput, GraphDocument, RelationshipSpec};
pub use crate::metrics::{Metric, MetricType, MetricValues};
pub use crate::quality::{OptimizationData, QualityCalculator};
pub use crate::solution::{Microservice, Solution};
pub use crate::solver::{run_ahca, run_moeca, AhcaOutcome, AhcaSolver, MoecaOutcome, MoecaSolver};
pub use crate::store::{JsonSolutionStore, MemorySolutionStore, RunId, RunRecord, SolutionStore};
