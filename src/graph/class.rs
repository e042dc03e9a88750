//! Class nodes of the dependency graph.
//!
//! A class is either a behavioral class (the only kind that is ever placed
//! into a cluster) or a pure data holder that behavioral classes read from
//! and write to.

use super::ClassId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Kind-specific attributes of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassKind {
    /// Behavioral class, subject to clustering
    Other {
        method_count: u32,
        /// Whether the class was observed as an executed API entry point
        api_entry_point: bool,
    },
    /// Data holder, only ever the target of a data relationship
    Data,
}

/// A class of the analyzed application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassNode {
    pub id: ClassId,
    /// Fully-qualified name, unique within one input
    pub identifier: String,
    pub name: String,
    pub location: String,
    pub features: BTreeSet<String>,
    /// Size proxy (bytes or lines of code)
    pub size: u64,
    /// Opaque id assigned by the source-analysis collaborator
    pub external_id: Option<String>,
    #[serde(flatten)]
    pub kind: ClassKind,
}

impl ClassNode {
    pub fn is_other(&self) -> bool {
        matches!(self.kind, ClassKind::Other { .. })
    }

    pub fn is_data(&self) -> bool {
        matches!(self.kind, ClassKind::Data)
    }

    /// Method count of a behavioral class, zero for data classes.
    pub fn method_count(&self) -> u32 {
        match self.kind {
            ClassKind::Other { method_count, .. } => method_count,
            ClassKind::Data => 0,
        }
    }

    pub fn is_api_entry_point(&self) -> bool {
        matches!(
            self.kind,
            ClassKind::Other {
                api_entry_point: true,
                ..
            }
        )
    }
}

/// Class description used while an input is still being assembled.
///
/// Ids are only assigned once the input is frozen, so specs carry
/// everything except the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSpec {
    pub identifier: String,
    pub name: String,
    pub location: String,
    pub features: BTreeSet<String>,
    pub size: u64,
    pub external_id: Option<String>,
    pub kind: ClassKind,
}

impl ClassSpec {
    /// Behavioral class with a derived short name and no tags.
    pub fn other(identifier: impl Into<String>, method_count: u32) -> Self {
        Self::new(
            identifier,
            ClassKind::Other {
                method_count,
                api_entry_point: false,
            },
        )
    }

    /// Data class with a derived short name and no tags.
    pub fn data(identifier: impl Into<String>) -> Self {
        Self::new(identifier, ClassKind::Data)
    }

    fn new(identifier: impl Into<String>, kind: ClassKind) -> Self {
        let identifier = identifier.into();
        let name = short_name(&identifier).to_string();
        Self {
            identifier,
            name,
            location: String::new(),
            features: BTreeSet::new(),
            size: 0,
            external_id: None,
            kind,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.insert(feature.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }

    pub fn api_entry_point(mut self) -> Self {
        if let ClassKind::Other {
            ref mut api_entry_point,
            ..
        } = self.kind
        {
            *api_entry_point = true;
        }
        self
    }

    pub(crate) fn into_node(self, id: ClassId) -> ClassNode {
        ClassNode {
            id,
            identifier: self.identifier,
            name: self.name,
            location: self.location,
            features: self.features,
            size: self.size,
            external_id: self.external_id,
            kind: self.kind,
        }
    }
}

/// Last segment of a dotted or `::`-separated identifier.
fn short_name(identifier: &str) -> &str {
    identifier
        .rsplit(['.', ':'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name_from_qualified_identifier() {
        assert_eq!(short_name("com.shop.billing.Invoice"), "Invoice");
        assert_eq!(short_name("shop::billing::Invoice"), "Invoice");
        assert_eq!(short_name("Invoice"), "Invoice");
    }

    #[test]
    fn test_method_count_only_for_behavioral_classes() {
        let other = ClassSpec::other("a.Service", 7).into_node(ClassId(0));
        let data = ClassSpec::data("a.Entity").into_node(ClassId(1));

        assert!(other.is_other());
        assert_eq!(other.method_count(), 7);
        assert!(data.is_data());
        assert_eq!(data.method_count(), 0);
    }

    #[test]
    fn test_api_entry_point_flag() {
        let node = ClassSpec::other("a.Controller", 3)
            .api_entry_point()
            .into_node(ClassId(0));
        assert!(node.is_api_entry_point());

        let data = ClassSpec::data("a.Entity").api_entry_point();
        assert_eq!(data.kind, ClassKind::Data);
    }
}
