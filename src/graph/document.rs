//! JSON graph documents exchanged with the source-analysis collaborator.

use super::class::{ClassKind, ClassSpec};
use super::input::{EvaluationInput, EvaluationInputBuilder};
use super::relationship::{DataAccess, RelationshipKind, RelationshipSpec};
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassDocumentKind {
    Other,
    Data,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDocument {
    pub identifier: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub features: BTreeSet<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub id: Option<String>,
    pub kind: ClassDocumentKind,
    #[serde(default)]
    pub method_count: u32,
    #[serde(default)]
    pub api_entry_point: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipDocument {
    pub caller: String,
    pub callee: String,
    #[serde(default)]
    pub static_frequency: u64,
    #[serde(default)]
    pub dynamic_frequency: Option<u64>,
    #[serde(default)]
    pub shared_classes: BTreeMap<String, u32>,
    #[serde(default)]
    pub connection_count: Option<u32>,
    /// Present only on data relationships
    #[serde(default)]
    pub access: Option<DataAccess>,
}

/// Serialized form of a dependency graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub classes: Vec<ClassDocument>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDocument>,
}

impl GraphDocument {
    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
            .map_err(|e| e.with_context(format!("parsing graph document {}", path.display())))
    }

    /// Freeze the document into an evaluation input.
    pub fn into_input(self) -> Result<EvaluationInput> {
        let mut builder = EvaluationInputBuilder::new();

        for class in self.classes {
            if class.identifier.is_empty() {
                return Err(Error::graph("class with an empty identifier"));
            }
            let kind = match class.kind {
                ClassDocumentKind::Other => ClassKind::Other {
                    method_count: class.method_count,
                    api_entry_point: class.api_entry_point,
                },
                ClassDocumentKind::Data => ClassKind::Data,
            };
            let mut spec = ClassSpec::data(&class.identifier);
            spec.kind = kind;
            if let Some(name) = class.name {
                spec.name = name;
            }
            spec.location = class.location;
            spec.features = class.features;
            spec.size = class.size;
            spec.external_id = class.id;
            builder.add_class(spec);
        }

        for rel in self.relationships {
            let kind = match rel.access {
                Some(access) => RelationshipKind::Data(access),
                None => RelationshipKind::Dependence,
            };
            let connection_count = rel
                .connection_count
                .unwrap_or(rel.static_frequency.min(u32::MAX as u64) as u32);
            builder.add_relationship(RelationshipSpec {
                caller: rel.caller,
                callee: rel.callee,
                static_frequency: rel.static_frequency,
                dynamic_frequency: rel.dynamic_frequency,
                shared_classes: rel.shared_classes,
                connection_count,
                kind,
            });
        }

        builder.build()
    }
}

/// Read a JSON graph document and freeze it.
pub fn load_input(path: &Path) -> Result<EvaluationInput> {
    GraphDocument::load(path)?.into_input()
}
