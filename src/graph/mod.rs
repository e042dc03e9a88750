//! Dependency graph model.
//!
//! Classes and relationships live in an arena owned by
//! [`EvaluationInput`]; everything downstream refers to them by
//! [`ClassId`], the index of the class in identifier order.

pub mod class;
pub mod document;
pub mod input;
pub mod relationship;

pub use class::{ClassKind, ClassNode, ClassSpec};
pub use document::{load_input, GraphDocument};
pub use input::{
    DataAccessSummary, DependencePair, EvaluationInput, EvaluationInputBuilder,
    PRIMITIVE_TYPE_SIZE,
};
pub use relationship::{
    DataAccess, Relationship, RelationshipKind, RelationshipSpec, PRIMITIVE_TYPE_MARKER,
};

use serde::{Deserialize, Serialize};

/// Arena index of a class inside one [`EvaluationInput`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ClassId(pub usize);

impl std::fmt::Display for ClassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
