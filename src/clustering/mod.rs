//! Partitions of behavioral classes into clusters.
//!
//! A [`ClusteringBuilder`] is mutated by the solvers (singleton start,
//! merges, genome decoding) and frozen into a [`Clustering`], the
//! two-index view every metric reads.

mod builder;

pub use builder::ClusteringBuilder;

use crate::errors::{Error, Result};
use crate::graph::{ClassId, EvaluationInput};
use im::{HashMap, OrdMap, OrdSet};

/// Cluster label; ids are not required to be dense.
pub type ClusterId = usize;

/// Frozen partition with a class → cluster and a cluster → members index.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    by_class: HashMap<ClassId, ClusterId>,
    by_cluster: OrdMap<ClusterId, OrdSet<ClassId>>,
}

impl Clustering {
    pub fn cluster_of(&self, class: ClassId) -> Option<ClusterId> {
        self.by_class.get(&class).copied()
    }

    pub fn members(&self, cluster: ClusterId) -> Option<&OrdSet<ClassId>> {
        self.by_cluster.get(&cluster)
    }

    /// Clusters in ascending id order.
    pub fn clusters(&self) -> impl Iterator<Item = (ClusterId, &OrdSet<ClassId>)> + '_ {
        self.by_cluster.iter().map(|(id, members)| (*id, members))
    }

    pub fn cluster_count(&self) -> usize {
        self.by_cluster.len()
    }

    pub fn class_count(&self) -> usize {
        self.by_class.len()
    }

    pub fn same_cluster(&self, a: ClassId, b: ClassId) -> bool {
        match (self.cluster_of(a), self.cluster_of(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Check the partition invariants against the input it was built for.
    pub fn validate(&self, input: &EvaluationInput) -> Result<()> {
        for (cluster, members) in self.clusters() {
            if members.is_empty() {
                return Err(Error::validation(format!("cluster {} is empty", cluster)));
            }
            for class in members.iter() {
                if self.cluster_of(*class) != Some(cluster) {
                    return Err(Error::validation(format!(
                        "class {} listed in cluster {} but indexed elsewhere",
                        input.class(*class).identifier,
                        cluster
                    )));
                }
            }
        }
        for (class, _) in self.by_class.iter() {
            if class.0 >= input.len() || !input.class(*class).is_other() {
                return Err(Error::validation(format!(
                    "class id {} is not a behavioral class of the input",
                    class
                )));
            }
        }
        if self.class_count() != input.other_classes().len() {
            return Err(Error::validation(format!(
                "clustering covers {} of {} behavioral classes",
                self.class_count(),
                input.other_classes().len()
            )));
        }
        Ok(())
    }
}

/// Canonical cache key of a member set: sorted ids joined by `,`.
///
/// Class ids follow identifier order, so this is also the sorted
/// concatenation of member identifiers' positions.
pub fn cluster_key(members: &OrdSet<ClassId>) -> String {
    let mut key = String::with_capacity(members.len() * 4);
    for (idx, class) in members.iter().enumerate() {
        if idx > 0 {
            key.push(',');
        }
        key.push_str(&class.0.to_string());
    }
    key
}
