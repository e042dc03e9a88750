//! Mutable partition under construction.
//!
//! Both indices are persistent maps, so cloning a builder to try one
//! candidate merge shares structure with the original and costs O(1).

use super::{ClusterId, Clustering};
use crate::errors::{Error, Result};
use crate::graph::{ClassId, EvaluationInput};
use crate::solution::Solution;
use im::{HashMap, OrdMap, OrdSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusteringBuilder {
    by_class: HashMap<ClassId, ClusterId>,
    by_cluster: OrdMap<ClusterId, OrdSet<ClassId>>,
}

impl ClusteringBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// One behavioral class per cluster, numbered in identifier order.
    pub fn singletons(input: &EvaluationInput) -> Self {
        let mut builder = Self::new();
        for (cluster, &class) in input.other_classes().iter().enumerate() {
            builder.add_to_cluster(class, cluster);
        }
        builder
    }

    /// Rebuild the partition stored in a persisted solution.
    ///
    /// The microservice ordinal becomes the cluster id. Every behavioral
    /// class of the input must be covered exactly once.
    pub fn from_solution(input: &EvaluationInput, solution: &Solution) -> Result<Self> {
        let mut builder = Self::new();

        for microservice in &solution.microservices {
            for identifier in &microservice.classes {
                let class = input.lookup(identifier).ok_or_else(|| {
                    Error::validation(format!(
                        "solution references unknown class '{}'",
                        identifier
                    ))
                })?;
                if !input.class(class).is_other() {
                    return Err(Error::validation(format!(
                        "solution places data class '{}' into a microservice",
                        identifier
                    )));
                }
                if builder.by_class.contains_key(&class) {
                    return Err(Error::validation(format!(
                        "class '{}' appears in more than one microservice",
                        identifier
                    )));
                }
                builder.add_to_cluster(class, microservice.ordinal);
            }
        }

        if let Some(missing) = input
            .other_classes()
            .iter()
            .find(|class| !builder.by_class.contains_key(*class))
        {
            return Err(Error::validation(format!(
                "solution does not place class '{}'",
                input.class(*missing).identifier
            )));
        }

        Ok(builder)
    }

    /// Assign `class` to `cluster`, moving it out of its previous cluster.
    pub fn add_to_cluster(&mut self, class: ClassId, cluster: ClusterId) {
        if let Some(previous) = self.by_class.insert(class, cluster) {
            if previous == cluster {
                return;
            }
            self.remove_member(previous, class);
        }
        let mut members = self.by_cluster.get(&cluster).cloned().unwrap_or_default();
        members.insert(class);
        self.by_cluster.insert(cluster, members);
    }

    /// Move every member of the higher-numbered cluster into the lower one.
    ///
    /// Returns `false` (and changes nothing) when the ids are equal or one of
    /// them does not exist.
    pub fn merge_cluster(&mut self, a: ClusterId, b: ClusterId) -> bool {
        if a == b || !self.by_cluster.contains_key(&a) || !self.by_cluster.contains_key(&b) {
            return false;
        }
        let (keep, gone) = if a < b { (a, b) } else { (b, a) };

        let Some(moved) = self.by_cluster.remove(&gone) else {
            return false;
        };
        for class in moved.iter() {
            self.by_class.insert(*class, keep);
        }
        let kept = self.by_cluster.get(&keep).cloned().unwrap_or_default();
        self.by_cluster.insert(keep, kept.union(moved));
        true
    }

    pub fn cluster_count(&self) -> usize {
        self.by_cluster.len()
    }

    pub fn cluster_ids(&self) -> impl Iterator<Item = ClusterId> + '_ {
        self.by_cluster.keys().copied()
    }

    pub fn cluster_of(&self, class: ClassId) -> Option<ClusterId> {
        self.by_class.get(&class).copied()
    }

    /// Freeze into a [`Clustering`].
    pub fn build(&self) -> Clustering {
        Clustering {
            by_class: self.by_class.clone(),
            by_cluster: self.by_cluster.clone(),
        }
    }

    fn remove_member(&mut self, cluster: ClusterId, class: ClassId) {
        let now_empty = match self.by_cluster.get_mut(&cluster) {
            Some(members) => {
                members.remove(&class);
                members.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.by_cluster.remove(&cluster);
        }
    }
}
