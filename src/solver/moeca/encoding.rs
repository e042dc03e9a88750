//! Genome encodings of a partition.
//!
//! A genome holds one gene per behavioral class, in the input's
//! behavioral-class order.
//!
//! * Cluster label: the gene is the cluster the class belongs to.
//! * Graph adjacency: the gene names another class the class is linked to;
//!   connected classes form one cluster.
//!
//! Both decoders return dense labels `0..k` numbered in first-seen order, so
//! equal partitions decode to equal label vectors.

use crate::clustering::ClusterId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    #[default]
    ClusterLabel,
    GraphAdjacency,
}

impl Encoding {
    pub const ALL: [Encoding; 2] = [Encoding::ClusterLabel, Encoding::GraphAdjacency];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClusterLabel => "cluster-label",
            Self::GraphAdjacency => "graph-adjacency",
        }
    }

    /// Largest gene value for `class_count` genes.
    pub fn gene_upper_bound(self, class_count: usize, max_cluster_amount: usize) -> usize {
        match self {
            Self::ClusterLabel => max_cluster_amount.min(class_count).saturating_sub(1),
            Self::GraphAdjacency => class_count.saturating_sub(1),
        }
    }

    pub fn decode(self, genome: &[usize]) -> Vec<ClusterId> {
        match self {
            Self::ClusterLabel => decode_cluster_labels(genome),
            Self::GraphAdjacency => decode_graph_adjacency(genome),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Encoding::ALL
            .into_iter()
            .find(|e| e.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown encoding '{}' (expected cluster-label or graph-adjacency)",
                    s
                )
            })
    }
}

/// Renumber arbitrary labels to `0..k` in first-seen order.
pub fn dense_labels(labels: impl IntoIterator<Item = usize>) -> Vec<ClusterId> {
    let mut seen: HashMap<usize, ClusterId> = HashMap::new();
    labels
        .into_iter()
        .map(|label| {
            let next = seen.len();
            *seen.entry(label).or_insert(next)
        })
        .collect()
}

pub fn decode_cluster_labels(genome: &[usize]) -> Vec<ClusterId> {
    dense_labels(genome.iter().copied())
}

/// Decode link genes in one pass.
///
/// Linking two unlabeled classes opens a cluster, linking an unlabeled class
/// to a labeled one adopts its label, and links between two different
/// clusters are queued. Queued merges run after the pass, higher label
/// first (then lower label ascending), through a union-find that keeps the
/// lower root. Genes outside the genome are treated as self links.
pub fn decode_graph_adjacency(genome: &[usize]) -> Vec<ClusterId> {
    const UNSET: usize = usize::MAX;

    let n = genome.len();
    let mut labels = vec![UNSET; n];
    let mut next_label = 0;
    let mut queued: Vec<(usize, usize)> = Vec::new();

    for (i, &gene) in genome.iter().enumerate() {
        let j = if gene < n { gene } else { i };
        match (labels[i], labels[j]) {
            (UNSET, UNSET) => {
                labels[i] = next_label;
                labels[j] = next_label;
                next_label += 1;
            }
            (UNSET, label) => labels[i] = label,
            (label, UNSET) => labels[j] = label,
            (a, b) if a != b => queued.push((a.max(b), a.min(b))),
            _ => {}
        }
    }

    queued.sort_by(|x, y| y.0.cmp(&x.0).then(x.1.cmp(&y.1)));
    let mut roots = UnionFind::new(next_label);
    for (high, low) in queued {
        roots.union(high, low);
    }

    let resolved: Vec<usize> = labels.iter().map(|&label| roots.find(label)).collect();
    dense_labels(resolved)
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (keep, gone) = (ra.min(rb), ra.max(rb));
            self.parent[gone] = keep;
        }
    }
}
