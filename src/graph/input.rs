//! Immutable evaluation input.
//!
//! The input is assembled in one owning context through
//! [`EvaluationInputBuilder`] and frozen by [`EvaluationInputBuilder::build`].
//! Freezing sorts classes by identifier, assigns arena ids, validates every
//! relationship, and precomputes the lookups that metric evaluation hits on
//! every candidate clustering.

use super::class::{ClassKind, ClassNode, ClassSpec};
use super::relationship::{
    DataAccess, Relationship, RelationshipKind, RelationshipSpec, PRIMITIVE_TYPE_MARKER,
};
use super::ClassId;
use crate::errors::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Nominal size of a primitive argument type.
pub const PRIMITIVE_TYPE_SIZE: f64 = 8.0;

/// Aggregated dependence edges from one behavioral class to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DependencePair {
    pub target: ClassId,
    pub static_frequency: u64,
    /// Static plus dynamic calls
    pub calls: f64,
    pub connections: u32,
    /// Σ size(shared type) × times shared
    pub overhead: f64,
}

/// How one behavioral class uses one data class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataAccessSummary {
    /// True when any relationship to the data class writes it
    pub writes: bool,
    /// Static plus dynamic frequency summed over the relationships
    pub frequency: f64,
}

/// Read-only snapshot consumed by one solving run.
#[derive(Debug, Clone)]
pub struct EvaluationInput {
    classes: Vec<ClassNode>,
    index: HashMap<String, ClassId>,
    other_classes: Vec<ClassId>,
    relationships: Vec<Relationship>,
    dependences: Vec<Vec<DependencePair>>,
    pair_calls: HashMap<(ClassId, ClassId), f64>,
    data_access: Vec<BTreeMap<ClassId, DataAccessSummary>>,
    total_calls: f64,
    average_class_size: f64,
    adjacency: Vec<BTreeSet<ClassId>>,
}

impl EvaluationInput {
    pub fn builder() -> EvaluationInputBuilder {
        EvaluationInputBuilder::default()
    }

    /// All classes, sorted by identifier; `classes()[id.0]` is the class `id`.
    pub fn classes(&self) -> &[ClassNode] {
        &self.classes
    }

    pub fn class(&self, id: ClassId) -> &ClassNode {
        &self.classes[id.0]
    }

    pub fn lookup(&self, identifier: &str) -> Option<ClassId> {
        self.index.get(identifier).copied()
    }

    /// Behavioral classes in identifier order.
    pub fn other_classes(&self) -> &[ClassId] {
        &self.other_classes
    }

    pub fn data_classes(&self) -> impl Iterator<Item = &ClassNode> {
        self.classes.iter().filter(|class| class.is_data())
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Outgoing dependences of a behavioral class towards other behavioral
    /// classes, sorted by target.
    pub fn dependences(&self, id: ClassId) -> &[DependencePair] {
        &self.dependences[id.0]
    }

    /// Calls in both directions between two behavioral classes.
    pub fn calls_between(&self, a: ClassId, b: ClassId) -> f64 {
        self.pair_calls
            .get(&ordered_pair(a, b))
            .copied()
            .unwrap_or(0.0)
    }

    /// Data classes used by a behavioral class.
    pub fn data_access(&self, id: ClassId) -> &BTreeMap<ClassId, DataAccessSummary> {
        &self.data_access[id.0]
    }

    /// Calls summed over every dependence between behavioral classes.
    pub fn total_calls(&self) -> f64 {
        self.total_calls
    }

    pub fn average_class_size(&self) -> f64 {
        self.average_class_size
    }

    /// Behavioral classes linked to `id` by a direct dependence or through a
    /// shared data class.
    pub fn neighbors(&self, id: ClassId) -> &BTreeSet<ClassId> {
        &self.adjacency[id.0]
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Two-phase builder for [`EvaluationInput`].
#[derive(Debug, Clone, Default)]
pub struct EvaluationInputBuilder {
    classes: Vec<ClassSpec>,
    relationships: Vec<RelationshipSpec>,
}

impl EvaluationInputBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, class: ClassSpec) -> &mut Self {
        self.classes.push(class);
        self
    }

    pub fn add_relationship(&mut self, relationship: RelationshipSpec) -> &mut Self {
        self.relationships.push(relationship);
        self
    }

    pub fn class(mut self, class: ClassSpec) -> Self {
        self.classes.push(class);
        self
    }

    pub fn relationship(mut self, relationship: RelationshipSpec) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Validate and freeze the collected graph.
    pub fn build(self) -> Result<EvaluationInput> {
        let mut specs = self.classes;
        specs.sort_by(|a, b| a.identifier.cmp(&b.identifier));

        if let Some(pair) = specs
            .windows(2)
            .find(|pair| pair[0].identifier == pair[1].identifier)
        {
            return Err(Error::graph(format!(
                "duplicate class identifier '{}'",
                pair[0].identifier
            )));
        }

        let classes: Vec<ClassNode> = specs
            .into_iter()
            .enumerate()
            .map(|(idx, spec)| spec.into_node(ClassId(idx)))
            .collect();
        let index: HashMap<String, ClassId> = classes
            .iter()
            .map(|class| (class.identifier.clone(), class.id))
            .collect();
        let other_classes: Vec<ClassId> = classes
            .iter()
            .filter(|class| class.is_other())
            .map(|class| class.id)
            .collect();

        let relationships = self
            .relationships
            .into_iter()
            .map(|spec| resolve_relationship(spec, &index, &classes))
            .collect::<Result<Vec<_>>>()?;

        let average_class_size = if classes.is_empty() {
            0.0
        } else {
            classes.iter().map(|class| class.size as f64).sum::<f64>() / classes.len() as f64
        };

        let type_size = |type_identifier: &str| -> f64 {
            if type_identifier == PRIMITIVE_TYPE_MARKER {
                return PRIMITIVE_TYPE_SIZE;
            }
            index
                .get(type_identifier)
                .map(|id| classes[id.0].size as f64)
                .unwrap_or(average_class_size)
        };

        let mut aggregated: BTreeMap<(ClassId, ClassId), DependencePair> = BTreeMap::new();
        let mut data_access = vec![BTreeMap::new(); classes.len()];
        let mut data_users: BTreeMap<ClassId, BTreeSet<ClassId>> = BTreeMap::new();
        let mut total_calls = 0.0;

        for rel in &relationships {
            let callee_is_data = classes[rel.callee.0].is_data();
            if callee_is_data {
                data_users.entry(rel.callee).or_default().insert(rel.caller);
            }

            match rel.kind {
                RelationshipKind::Data(access) => {
                    let summary = data_access[rel.caller.0]
                        .entry(rel.callee)
                        .or_insert(DataAccessSummary {
                            writes: false,
                            frequency: 0.0,
                        });
                    summary.writes |= access == DataAccess::Write;
                    summary.frequency += rel.total_frequency();
                }
                RelationshipKind::Dependence => {
                    if callee_is_data || rel.caller == rel.callee {
                        continue;
                    }
                    let overhead: f64 = rel
                        .shared_classes
                        .iter()
                        .map(|(type_identifier, times)| type_size(type_identifier) * *times as f64)
                        .sum();
                    let pair = aggregated
                        .entry((rel.caller, rel.callee))
                        .or_insert(DependencePair {
                            target: rel.callee,
                            static_frequency: 0,
                            calls: 0.0,
                            connections: 0,
                            overhead: 0.0,
                        });
                    pair.static_frequency =
                        pair.static_frequency.saturating_add(rel.static_frequency);
                    pair.calls += rel.total_frequency();
                    pair.connections = pair.connections.saturating_add(rel.connection_count);
                    pair.overhead += overhead;
                    total_calls += rel.total_frequency();
                }
            }
        }

        let mut dependences = vec![Vec::new(); classes.len()];
        let mut pair_calls: HashMap<(ClassId, ClassId), f64> = HashMap::new();
        let mut adjacency = vec![BTreeSet::new(); classes.len()];

        for (&(caller, callee), pair) in &aggregated {
            dependences[caller.0].push(*pair);
            *pair_calls.entry(ordered_pair(caller, callee)).or_insert(0.0) += pair.calls;
            adjacency[caller.0].insert(callee);
            adjacency[callee.0].insert(caller);
        }

        for users in data_users.values() {
            for &a in users {
                for &b in users {
                    if a != b {
                        adjacency[a.0].insert(b);
                    }
                }
            }
        }

        log::debug!(
            "Frozen evaluation input: {} classes ({} behavioral), {} relationships",
            classes.len(),
            other_classes.len(),
            relationships.len()
        );

        Ok(EvaluationInput {
            classes,
            index,
            other_classes,
            relationships,
            dependences,
            pair_calls,
            data_access,
            total_calls,
            average_class_size,
            adjacency,
        })
    }
}

fn resolve_relationship(
    spec: RelationshipSpec,
    index: &HashMap<String, ClassId>,
    classes: &[ClassNode],
) -> Result<Relationship> {
    let resolve = |identifier: &str, role: &str| {
        index.get(identifier).copied().ok_or_else(|| {
            Error::graph(format!(
                "relationship {} '{}' does not name a known class",
                role, identifier
            ))
        })
    };
    let caller = resolve(&spec.caller, "caller")?;
    let callee = resolve(&spec.callee, "callee")?;

    if !classes[caller.0].is_other() {
        return Err(Error::graph(format!(
            "relationship caller '{}' is a data class",
            spec.caller
        )));
    }
    if matches!(spec.kind, RelationshipKind::Data(_))
        && !matches!(classes[callee.0].kind, ClassKind::Data)
    {
        return Err(Error::graph(format!(
            "data relationship '{}' -> '{}' does not target a data class",
            spec.caller, spec.callee
        )));
    }

    Ok(Relationship {
        caller,
        callee,
        static_frequency: spec.static_frequency,
        dynamic_frequency: spec.dynamic_frequency,
        shared_classes: spec.shared_classes,
        connection_count: spec.connection_count,
        kind: spec.kind,
    })
}

fn ordered_pair(a: ClassId, b: ClassId) -> (ClassId, ClassId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DataAccess;

    fn shop_input() -> EvaluationInput {
        EvaluationInput::builder()
            .class(ClassSpec::other("shop.Orders", 4).with_size(100))
            .class(ClassSpec::other("shop.Billing", 2).with_size(300))
            .class(ClassSpec::other("shop.Audit", 1).with_size(200))
            .class(ClassSpec::data("shop.OrderRow").with_size(400))
            .relationship(
                RelationshipSpec::dependence("shop.Orders", "shop.Billing", 3)
                    .with_dynamic_frequency(2)
                    .with_shared_class("shop.OrderRow", 2)
                    .with_shared_class(PRIMITIVE_TYPE_MARKER, 1)
                    .with_shared_class("java.util.List", 1),
            )
            .relationship(RelationshipSpec::dependence("shop.Billing", "shop.Orders", 1))
            .relationship(RelationshipSpec::data(
                "shop.Orders",
                "shop.OrderRow",
                DataAccess::Write,
                2,
            ))
            .relationship(RelationshipSpec::data(
                "shop.Audit",
                "shop.OrderRow",
                DataAccess::Read,
                5,
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn test_classes_sorted_by_identifier() {
        let input = shop_input();
        let identifiers: Vec<_> = input
            .classes()
            .iter()
            .map(|c| c.identifier.as_str())
            .collect();
        assert_eq!(
            identifiers,
            vec!["shop.Audit", "shop.Billing", "shop.OrderRow", "shop.Orders"]
        );
        assert_eq!(input.other_classes().len(), 3);
    }

    #[test]
    fn test_pair_calls_are_undirected() {
        let input = shop_input();
        let orders = input.lookup("shop.Orders").unwrap();
        let billing = input.lookup("shop.Billing").unwrap();
        assert_eq!(input.calls_between(orders, billing), 6.0);
        assert_eq!(input.calls_between(billing, orders), 6.0);
        assert_eq!(input.total_calls(), 6.0);
    }

    #[test]
    fn test_overhead_uses_sizes_marker_and_average() {
        let input = shop_input();
        let orders = input.lookup("shop.Orders").unwrap();
        let pair = input.dependences(orders)[0];
        // 2 × 400 (known type) + 1 × 8 (primitive) + 1 × 250 (average size)
        assert_eq!(pair.overhead, 800.0 + PRIMITIVE_TYPE_SIZE + 250.0);
    }

    #[test]
    fn test_shared_data_class_links_users() {
        let input = shop_input();
        let orders = input.lookup("shop.Orders").unwrap();
        let audit = input.lookup("shop.Audit").unwrap();
        let billing = input.lookup("shop.Billing").unwrap();
        assert!(input.neighbors(audit).contains(&orders));
        assert!(input.neighbors(orders).contains(&billing));
        assert!(!input.neighbors(audit).contains(&billing));
    }

    #[test]
    fn test_data_access_summary() {
        let input = shop_input();
        let orders = input.lookup("shop.Orders").unwrap();
        let row = input.lookup("shop.OrderRow").unwrap();
        let summary = input.data_access(orders)[&row];
        assert!(summary.writes);
        assert_eq!(summary.frequency, 2.0);
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let result = EvaluationInput::builder()
            .class(ClassSpec::other("a.A", 1))
            .class(ClassSpec::data("a.A"))
            .build();
        assert!(matches!(result, Err(Error::Graph(_))));
    }

    #[test]
    fn test_data_relationship_must_target_data_class() {
        let result = EvaluationInput::builder()
            .class(ClassSpec::other("a.A", 1))
            .class(ClassSpec::other("a.B", 1))
            .relationship(RelationshipSpec::data("a.A", "a.B", DataAccess::Read, 1))
            .build();
        assert!(matches!(result, Err(Error::Graph(_))));
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        let result = EvaluationInput::builder()
            .class(ClassSpec::other("a.A", 1))
            .relationship(RelationshipSpec::dependence("a.A", "a.Missing", 1))
            .build();
        assert!(matches!(result, Err(Error::Graph(_))));
    }
}
