// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage vocabulary: edge labels, property keys and vertex base types

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Label, ValueType};

/// Labels of graph-native edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeLabel {
    Isa,
    Sub,
    Plays,
    Relates,
    Has,
    Key,
    Shard,
    RolePlayer,
    /// Relation stored as a single edge between owner and attribute
    Attribute,
}

impl EdgeLabel {
    pub fn label(&self) -> &'static str {
        match self {
            EdgeLabel::Isa => "ISA",
            EdgeLabel::Sub => "SUB",
            EdgeLabel::Plays => "PLAYS",
            EdgeLabel::Relates => "RELATES",
            EdgeLabel::Has => "HAS",
            EdgeLabel::Key => "KEY",
            EdgeLabel::Shard => "SHARD",
            EdgeLabel::RolePlayer => "ROLE_PLAYER",
            EdgeLabel::Attribute => "ATTRIBUTE",
        }
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Vertex and edge property keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PropertyKey {
    Id,
    EdgeId,
    LabelId,
    Index,
    IsAbstract,
    IsImplicit,
    Regex,
    ValueType,
    Required,
    IsShard,
    ThingTypeLabelId,
    RoleLabelId,
    RelationTypeLabelId,
    RelationRoleOwnerLabelId,
    RelationRoleValueLabelId,
    Value(ValueType),
}

impl PropertyKey {
    pub fn name(&self) -> String {
        match self {
            PropertyKey::Id => "ID".to_string(),
            PropertyKey::EdgeId => "EDGE_ID".to_string(),
            PropertyKey::LabelId => "LABEL_ID".to_string(),
            PropertyKey::Index => "INDEX".to_string(),
            PropertyKey::IsAbstract => "IS_ABSTRACT".to_string(),
            PropertyKey::IsImplicit => "IS_IMPLICIT".to_string(),
            PropertyKey::Regex => "REGEX".to_string(),
            PropertyKey::ValueType => "VALUE_TYPE".to_string(),
            PropertyKey::Required => "REQUIRED".to_string(),
            PropertyKey::IsShard => "IS_SHARD".to_string(),
            PropertyKey::ThingTypeLabelId => "THING_TYPE_LABEL_ID".to_string(),
            PropertyKey::RoleLabelId => "ROLE_LABEL_ID".to_string(),
            PropertyKey::RelationTypeLabelId => "RELATION_TYPE_LABEL_ID".to_string(),
            PropertyKey::RelationRoleOwnerLabelId => "RELATION_ROLE_OWNER_LABEL_ID".to_string(),
            PropertyKey::RelationRoleValueLabelId => "RELATION_ROLE_VALUE_LABEL_ID".to_string(),
            PropertyKey::Value(value_type) => {
                format!("VALUE_{}", value_type.name().to_uppercase())
            }
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Vertex base types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BaseType {
    EntityType,
    RelationType,
    AttributeType,
    Role,
    Rule,
    /// Internal bookkeeping vertex splitting a type's instances
    Shard,
    Entity,
    Relation,
    Attribute,
}

impl BaseType {
    pub fn label(&self) -> &'static str {
        match self {
            BaseType::EntityType => "ENTITY_TYPE",
            BaseType::RelationType => "RELATION_TYPE",
            BaseType::AttributeType => "ATTRIBUTE_TYPE",
            BaseType::Role => "ROLE",
            BaseType::Rule => "RULE",
            BaseType::Shard => "SHARD",
            BaseType::Entity => "ENTITY",
            BaseType::Relation => "RELATION",
            BaseType::Attribute => "ATTRIBUTE",
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Index entry storage keeps for an attribute of type `label` holding `value`
pub fn generate_attribute_index(label: &Label, value: &str) -> String {
    format!("ATTRIBUTE-{}-{}", label.value(), value)
}
