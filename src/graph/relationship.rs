//! Weighted edges between classes.

use super::ClassId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Marker used in shared-class maps for primitive argument types.
pub const PRIMITIVE_TYPE_MARKER: &str = "$primitive";

/// How a data relationship touches its data class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataAccess {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// Caller invokes, references or constructs the callee
    Dependence,
    /// Behavioral class reads or writes a data class
    Data(DataAccess),
}

/// A directed caller → callee edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub caller: ClassId,
    pub callee: ClassId,
    /// Call sites found statically
    pub static_frequency: u64,
    /// Calls observed at runtime, when a trace is available
    pub dynamic_frequency: Option<u64>,
    /// Argument type identifier → times passed across this edge
    pub shared_classes: BTreeMap<String, u32>,
    /// Direct connections (method calls, references, constructions)
    pub connection_count: u32,
    pub kind: RelationshipKind,
}

impl Relationship {
    /// Static plus dynamic call count.
    pub fn total_frequency(&self) -> f64 {
        self.static_frequency
            .saturating_add(self.dynamic_frequency.unwrap_or(0)) as f64
    }

    pub fn is_data(&self) -> bool {
        matches!(self.kind, RelationshipKind::Data(_))
    }

    pub fn access(&self) -> Option<DataAccess> {
        match self.kind {
            RelationshipKind::Data(access) => Some(access),
            RelationshipKind::Dependence => None,
        }
    }
}

/// Relationship description keyed by class identifiers, resolved to ids when
/// the input is frozen.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipSpec {
    pub caller: String,
    pub callee: String,
    pub static_frequency: u64,
    pub dynamic_frequency: Option<u64>,
    pub shared_classes: BTreeMap<String, u32>,
    pub connection_count: u32,
    pub kind: RelationshipKind,
}

impl RelationshipSpec {
    /// Dependence edge with one connection per static call site.
    pub fn dependence(
        caller: impl Into<String>,
        callee: impl Into<String>,
        static_frequency: u64,
    ) -> Self {
        Self {
            caller: caller.into(),
            callee: callee.into(),
            static_frequency,
            dynamic_frequency: None,
            shared_classes: BTreeMap::new(),
            connection_count: static_frequency.min(u32::MAX as u64) as u32,
            kind: RelationshipKind::Dependence,
        }
    }

    pub fn data(
        caller: impl Into<String>,
        callee: impl Into<String>,
        access: DataAccess,
        static_frequency: u64,
    ) -> Self {
        Self {
            kind: RelationshipKind::Data(access),
            ..Self::dependence(caller, callee, static_frequency)
        }
    }

    pub fn with_dynamic_frequency(mut self, frequency: u64) -> Self {
        self.dynamic_frequency = Some(frequency);
        self
    }

    pub fn with_shared_class(mut self, type_identifier: impl Into<String>, times: u32) -> Self {
        *self
            .shared_classes
            .entry(type_identifier.into())
            .or_insert(0) += times;
        self
    }

    pub fn with_connection_count(mut self, count: u32) -> Self {
        self.connection_count = count;
        self
    }
}
