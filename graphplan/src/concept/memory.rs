// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory schema and statistics providers
//!
//! Reference implementations of [`ConceptManager`] and [`KeyspaceStatistics`]
//! used by embedders without a storage-backed schema and by the test suite.

use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use super::{
    ConceptManager, KeyspaceStatistics, Label, LabelId, SchemaConcept, SchemaConceptKind,
    ValueType,
};
use crate::error::{PlannerError, PlannerResult};

/// Schema held in memory, built with the `with_*` methods
#[derive(Debug, Clone, Default)]
pub struct InMemoryConceptManager {
    concepts: BTreeMap<Label, SchemaConcept>,
    supertype: BTreeMap<Label, Label>,
    relates: BTreeMap<Label, BTreeSet<Label>>,
    plays: BTreeMap<Label, BTreeSet<Label>>,
    next_id: i64,
}

impl InMemoryConceptManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn define(&mut self, label: &str, kind: SchemaConceptKind) -> Label {
        let label = Label::of(label);
        if !self.concepts.contains_key(&label) {
            let concept = SchemaConcept {
                label: label.clone(),
                id: LabelId::of(self.next_id),
                kind,
                is_implicit: label.is_implicit(),
                is_abstract: false,
            };
            self.next_id += 1;
            self.concepts.insert(label.clone(), concept);
        }
        label
    }

    pub fn with_entity_type(mut self, label: &str) -> Self {
        self.define(label, SchemaConceptKind::EntityType);
        self
    }

    pub fn with_attribute_type(mut self, label: &str, value_type: ValueType) -> Self {
        self.define(label, SchemaConceptKind::AttributeType(value_type));
        self
    }

    pub fn with_rule(mut self, label: &str) -> Self {
        self.define(label, SchemaConceptKind::Rule);
        self
    }

    /// Define a relation type together with the roles it relates
    pub fn with_relation_type(mut self, label: &str, roles: &[&str]) -> Self {
        let relation = self.define(label, SchemaConceptKind::RelationType);
        for role in roles {
            let role = self.define(role, SchemaConceptKind::Role);
            self.relates.entry(relation.clone()).or_default().insert(role);
        }
        self
    }

    pub fn with_supertype(mut self, label: &str, supertype: &str) -> Self {
        self.supertype.insert(Label::of(label), Label::of(supertype));
        self
    }

    pub fn with_plays(mut self, thing_type: &str, role: &str) -> Self {
        let role = self.define(role, SchemaConceptKind::Role);
        self.plays
            .entry(Label::of(thing_type))
            .or_default()
            .insert(role);
        self
    }

    pub fn with_abstract(mut self, label: &str) -> Self {
        if let Some(concept) = self.concepts.get_mut(&Label::of(label)) {
            concept.is_abstract = true;
        }
        self
    }

    /// Let `owner` own `attribute` through the implicit `@has-<attribute>` relation
    pub fn with_has(self, owner: &str, attribute: &str) -> Self {
        let attribute = Label::of(attribute);
        let relation = Label::implicit_has(&attribute);
        let owner_role = Label::implicit_has_owner(&attribute);
        let value_role = Label::implicit_has_value(&attribute);
        self.with_relation_type(
            relation.value(),
            &[owner_role.value(), value_role.value()],
        )
        .with_plays(owner, owner_role.value())
        .with_plays(attribute.value(), value_role.value())
    }

    fn children(&self, label: &Label) -> Vec<Label> {
        self.supertype
            .iter()
            .filter(|(_, parent)| *parent == label)
            .map(|(child, _)| child.clone())
            .collect()
    }
}

impl ConceptManager for InMemoryConceptManager {
    fn convert_to_id(&self, label: &Label) -> PlannerResult<LabelId> {
        self.concepts
            .get(label)
            .map(|concept| concept.id)
            .ok_or_else(|| PlannerError::UnknownLabel(label.to_string()))
    }

    fn get_schema_concept(&self, label: &Label) -> Option<SchemaConcept> {
        self.concepts.get(label).cloned()
    }

    fn subs(&self, label: &Label) -> Vec<Label> {
        if !self.concepts.contains_key(label) {
            return Vec::new();
        }
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([label.clone()]);
        while let Some(current) = queue.pop_front() {
            if seen.insert(current.clone()) {
                queue.extend(self.children(&current));
            }
        }
        seen.into_iter().collect()
    }

    fn sups(&self, label: &Label) -> Vec<Label> {
        let mut result = Vec::new();
        if !self.concepts.contains_key(label) {
            return result;
        }
        let mut current = Some(label.clone());
        while let Some(concept) = current {
            if result.contains(&concept) {
                break;
            }
            current = self.supertype.get(&concept).cloned();
            result.push(concept);
        }
        result
    }

    fn roles_related_by(&self, relation_type: &Label) -> Vec<Label> {
        let roles: BTreeSet<Label> = self
            .sups(relation_type)
            .iter()
            .filter_map(|sup| self.relates.get(sup))
            .flatten()
            .cloned()
            .collect();
        roles.into_iter().collect()
    }

    fn players_of_role(&self, role: &Label) -> Vec<Label> {
        self.plays
            .iter()
            .filter(|(_, roles)| roles.contains(role))
            .map(|(player, _)| player.clone())
            .collect()
    }

    fn roles_played_by(&self, thing_type: &Label) -> Vec<Label> {
        let roles: BTreeSet<Label> = self
            .sups(thing_type)
            .iter()
            .filter_map(|sup| self.plays.get(sup))
            .flatten()
            .cloned()
            .collect();
        roles.into_iter().collect()
    }

    fn relation_types_relating(&self, role: &Label) -> Vec<Label> {
        self.relates
            .iter()
            .filter(|(_, roles)| roles.contains(role))
            .map(|(relation, _)| relation.clone())
            .collect()
    }

    fn attribute_types(&self) -> Vec<SchemaConcept> {
        self.concepts
            .values()
            .filter(|concept| concept.is_attribute_type())
            .cloned()
            .collect()
    }
}

/// Instance counts held in memory
#[derive(Debug, Default)]
pub struct InMemoryStatistics {
    counts: RwLock<HashMap<Label, u64>>,
}

impl InMemoryStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count(self, label: &str, count: u64) -> Self {
        self.set_count(&Label::of(label), count);
        self
    }

    pub fn set_count(&self, label: &Label, count: u64) {
        self.counts.write().insert(label.clone(), count);
    }

    /// Apply a commit delta, saturating at zero
    pub fn apply_delta(&self, label: &Label, delta: i64) {
        let mut counts = self.counts.write();
        let entry = counts.entry(label.clone()).or_insert(0);
        *entry = if delta >= 0 {
            entry.saturating_add(delta as u64)
        } else {
            entry.saturating_sub(delta.unsigned_abs())
        };
    }
}

impl KeyspaceStatistics for InMemoryStatistics {
    fn count(&self, _concept_manager: &dyn ConceptManager, label: &Label) -> u64 {
        self.counts.read().get(label).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> InMemoryConceptManager {
        InMemoryConceptManager::new()
            .with_entity_type("person")
            .with_entity_type("employee")
            .with_supertype("employee", "person")
            .with_entity_type("manager")
            .with_supertype("manager", "employee")
            .with_relation_type("employment", &["employer", "staff"])
            .with_plays("person", "staff")
            .with_attribute_type("name", ValueType::String)
            .with_has("person", "name")
    }

    #[test]
    fn test_subs_and_sups_are_reflexive_and_transitive() {
        let schema = schema();
        let subs = schema.subs(&Label::of("person"));
        assert_eq!(
            subs,
            vec![Label::of("employee"), Label::of("manager"), Label::of("person")]
        );
        let sups = schema.sups(&Label::of("manager"));
        assert_eq!(
            sups,
            vec![Label::of("manager"), Label::of("employee"), Label::of("person")]
        );
    }

    #[test]
    fn test_roles_played_are_inherited() {
        let schema = schema();
        let roles = schema.roles_played_by(&Label::of("manager"));
        assert!(roles.contains(&Label::of("staff")));
        assert!(roles.contains(&Label::of("@has-name-owner")));
    }

    #[test]
    fn test_unknown_label_fails_to_convert() {
        let schema = schema();
        let err = schema.convert_to_id(&Label::of("dog")).unwrap_err();
        assert_eq!(err, PlannerError::UnknownLabel("dog".to_string()));
    }

    #[test]
    fn test_implicit_relation_is_marked_implicit() {
        let schema = schema();
        let concept = schema.get_type(&Label::of("@has-name")).unwrap();
        assert!(concept.is_implicit);
        assert!(concept.is_relation_type());
    }

    #[test]
    fn test_statistics_unknown_label_counts_zero() {
        let schema = schema();
        let stats = InMemoryStatistics::new().with_count("person", 10);
        assert_eq!(stats.count(&schema, &Label::of("person")), 10);
        assert_eq!(stats.count(&schema, &Label::of("dog")), 0);

        stats.apply_delta(&Label::of("person"), -20);
        assert_eq!(stats.count(&schema, &Label::of("person")), 0);
    }
}
