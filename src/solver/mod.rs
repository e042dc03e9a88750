//! Clustering solvers.
//!
//! - [`ahca`]: greedy agglomerative merging, one solution per cluster count
//! - [`moeca`]: multi-objective evolutionary search over partitions

pub mod ahca;
pub mod moeca;

pub use ahca::{run_ahca, AhcaOutcome, AhcaSolver};
pub use moeca::{run_moeca, MoecaOutcome, MoecaSolver};
