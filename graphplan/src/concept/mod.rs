// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Schema concept identifiers and the collaborators the planner reads from
//!
//! The planner never talks to storage directly. Labels are resolved to
//! numeric ids through a [`ConceptManager`], and cardinality estimates come
//! from a [`KeyspaceStatistics`] provider. Both are read-only and shared
//! between concurrent compilations.

pub mod memory;
pub mod schema;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PlannerResult;

pub use memory::{InMemoryConceptManager, InMemoryStatistics};

/// Human readable name of a schema concept
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label(String);

impl Label {
    pub fn of(value: impl Into<String>) -> Self {
        Label(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    /// Label of the implicit relation type recording ownership of `attribute`
    pub fn implicit_has(attribute: &Label) -> Self {
        Label(format!("@has-{}", attribute.0))
    }

    /// Label of the implicit relation type recording key ownership of `attribute`
    pub fn implicit_key(attribute: &Label) -> Self {
        Label(format!("@key-{}", attribute.0))
    }

    /// Owner role of the implicit `@has-<attribute>` relation
    pub fn implicit_has_owner(attribute: &Label) -> Self {
        Label(format!("@has-{}-owner", attribute.0))
    }

    /// Value role of the implicit `@has-<attribute>` relation
    pub fn implicit_has_value(attribute: &Label) -> Self {
        Label(format!("@has-{}-value", attribute.0))
    }

    pub fn is_implicit(&self) -> bool {
        self.0.starts_with('@')
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::of(value)
    }
}

/// Numeric identifier storage uses for a schema concept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelId(i64);

impl LabelId {
    pub fn of(value: i64) -> Self {
        LabelId(value)
    }

    /// Sentinel meaning "no matching id"
    pub fn invalid() -> Self {
        LabelId(-1)
    }

    pub fn is_valid(&self) -> bool {
        self.0 != -1
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

const PREFIX_VERTEX: char = 'V';
const PREFIX_EDGE: char = 'E';

/// Identifier of a concrete data instance
///
/// Ids prefixed with `E` name a storage edge (a relation stored without its
/// own vertex); ids prefixed with `V` name a vertex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConceptId(String);

impl ConceptId {
    pub fn of(value: impl Into<String>) -> Self {
        ConceptId(value.into())
    }

    pub fn vertex(raw: impl fmt::Display) -> Self {
        ConceptId(format!("{}{}", PREFIX_VERTEX, raw))
    }

    pub fn edge(raw: impl fmt::Display) -> Self {
        ConceptId(format!("{}{}", PREFIX_EDGE, raw))
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn is_edge_id(&self) -> bool {
        self.0.starts_with(PREFIX_EDGE)
    }

    /// The storage edge id without its prefix
    pub fn edge_suffix(&self) -> &str {
        self.0.strip_prefix(PREFIX_EDGE).unwrap_or(&self.0)
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declared value type of an attribute type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValueType {
    String,
    Long,
    Double,
    Boolean,
}

impl ValueType {
    pub const ALL: [ValueType; 4] = [
        ValueType::String,
        ValueType::Long,
        ValueType::Double,
        ValueType::Boolean,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Long => "long",
            ValueType::Double => "double",
            ValueType::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaConceptKind {
    EntityType,
    RelationType,
    AttributeType(ValueType),
    Role,
    Rule,
    Meta,
}

/// Read-only view of a schema concept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaConcept {
    pub label: Label,
    pub id: LabelId,
    pub kind: SchemaConceptKind,
    pub is_implicit: bool,
    pub is_abstract: bool,
}

impl SchemaConcept {
    pub fn is_type(&self) -> bool {
        !matches!(self.kind, SchemaConceptKind::Role | SchemaConceptKind::Rule)
    }

    pub fn is_role(&self) -> bool {
        matches!(self.kind, SchemaConceptKind::Role)
    }

    pub fn is_rule(&self) -> bool {
        matches!(self.kind, SchemaConceptKind::Rule)
    }

    pub fn is_relation_type(&self) -> bool {
        matches!(self.kind, SchemaConceptKind::RelationType)
    }

    pub fn is_attribute_type(&self) -> bool {
        matches!(self.kind, SchemaConceptKind::AttributeType(_))
    }

    pub fn value_type(&self) -> Option<ValueType> {
        match self.kind {
            SchemaConceptKind::AttributeType(value_type) => Some(value_type),
            _ => None,
        }
    }
}

/// Resolves labels and navigates the schema
///
/// Implementations must be safe for concurrent reads: several compilations
/// may consult the same manager at once.
pub trait ConceptManager: Send + Sync {
    /// Resolve a label to its storage id, failing when the label is unknown
    fn convert_to_id(&self, label: &Label) -> PlannerResult<LabelId>;

    fn get_schema_concept(&self, label: &Label) -> Option<SchemaConcept>;

    /// Like [`ConceptManager::get_schema_concept`] but only for types
    fn get_type(&self, label: &Label) -> Option<SchemaConcept> {
        self.get_schema_concept(label).filter(|concept| concept.is_type())
    }

    /// The concept and all of its transitive subtypes
    fn subs(&self, label: &Label) -> Vec<Label>;

    /// The concept and all of its transitive supertypes
    fn sups(&self, label: &Label) -> Vec<Label>;

    /// Roles related by a relation type
    fn roles_related_by(&self, relation_type: &Label) -> Vec<Label>;

    /// Types declared to play a role
    fn players_of_role(&self, role: &Label) -> Vec<Label>;

    /// Roles a type plays, including those inherited from its supertypes
    fn roles_played_by(&self, thing_type: &Label) -> Vec<Label>;

    /// Relation types relating a role
    fn relation_types_relating(&self, role: &Label) -> Vec<Label>;

    /// Every attribute type in the schema
    fn attribute_types(&self) -> Vec<SchemaConcept>;
}

/// Approximate instance counts per schema concept
///
/// Counts are advisory and may be stale. Unknown or empty labels count 0.
pub trait KeyspaceStatistics: Send + Sync {
    fn count(&self, concept_manager: &dyn ConceptManager, label: &Label) -> u64;
}
