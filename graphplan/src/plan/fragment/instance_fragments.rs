// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Traversal steps and starting-point estimates for fragments over data
//!
//! Small relations may be stored without a relation vertex, as a single
//! `ATTRIBUTE` edge between owner and value. Every fragment that can meet a
//! relation instance therefore has to consider both shapes.

use std::collections::BTreeSet;

use super::schema_fragments::label_ids;
use super::{AttributeEdge, RolePlayerEdge};
use crate::concept::schema::{generate_attribute_index, EdgeLabel, PropertyKey};
use crate::concept::{ConceptId, ConceptManager, KeyspaceStatistics, Label, ValueType};
use crate::error::PlannerResult;
use crate::pattern::{Operand, Value, ValuePredicate, Variable};
use crate::traversal::{GraphTraversal, P};

fn anonymous() -> GraphTraversal {
    GraphTraversal::anonymous()
}

/// `Eq` for one value, `Within` for several, nothing for none
fn one_of(mut values: Vec<Value>) -> Option<P> {
    match values.len() {
        0 => None,
        1 => values.pop().map(P::Eq),
        _ => Some(P::Within(values)),
    }
}

/// The labels and all of their subtypes
fn with_subs(concept_manager: &dyn ConceptManager, labels: &BTreeSet<Label>) -> BTreeSet<Label> {
    let mut expanded = labels.clone();
    for label in labels {
        expanded.extend(concept_manager.subs(label));
    }
    expanded
}

pub(super) fn id(traversal: GraphTraversal, id: &ConceptId) -> GraphTraversal {
    if id.is_edge_id() {
        traversal.union(vec![
            anonymous()
                .e()
                .has(PropertyKey::EdgeId, P::Eq(Value::String(id.edge_suffix().to_string()))),
            anonymous().has_id(id.value()),
        ])
    } else {
        traversal.has_id(id.value())
    }
}

pub(super) fn attribute_index(
    traversal: GraphTraversal,
    attribute_label: &Label,
    value: &str,
) -> GraphTraversal {
    let index = generate_attribute_index(attribute_label, value);
    traversal.has(PropertyKey::Index, P::Eq(Value::String(index)))
}

pub(super) fn value(traversal: GraphTraversal, predicate: &ValuePredicate) -> GraphTraversal {
    match &predicate.operand {
        Operand::Variable(other) => traversal.where_value(predicate.comparator, other.symbol()),
        Operand::Literal(literal) => match literal.value_type() {
            // a number may be stored as either numeric type
            ValueType::Long | ValueType::Double => traversal.union(
                [ValueType::Long, ValueType::Double]
                    .into_iter()
                    .map(|value_type| {
                        anonymous().has(
                            PropertyKey::Value(value_type),
                            P::compare(predicate.comparator, literal.clone()),
                        )
                    })
                    .collect(),
            ),
            value_type => traversal.has(
                PropertyKey::Value(value_type),
                P::compare(predicate.comparator, literal.clone()),
            ),
        },
    }
}

/// From a type to its instances
///
/// Instances of implicit relation types may be edges. Edges cannot be found
/// from the type, so when that is possible the schema is walked instead:
/// relation type, its roles, the types playing them and their subtypes, their
/// instances, and finally the ownership edges of this relation type leaving
/// those instances. Only edges leaving an owner are found.
pub(super) fn in_isa(
    traversal: GraphTraversal,
    start: &Variable,
    may_have_edge_instances: bool,
) -> GraphTraversal {
    let vertices = anonymous().in_(EdgeLabel::Shard).in_(EdgeLabel::Isa);
    if !may_have_edge_instances {
        return traversal.append(vertices);
    }

    let label_id = format!("{}~label-id", start.symbol());
    let edges = anonymous()
        .values(PropertyKey::LabelId)
        .as_(&label_id)
        .select(start.symbol())
        .out(EdgeLabel::Relates)
        .in_(EdgeLabel::Plays)
        .repeat(anonymous().in_(EdgeLabel::Sub), None, true)
        .in_(EdgeLabel::Shard)
        .in_(EdgeLabel::Isa)
        .out_e(EdgeLabel::Attribute)
        .has_where_eq(PropertyKey::RelationTypeLabelId, &label_id);

    traversal.choose(
        anonymous().has(PropertyKey::IsImplicit, P::Eq(Value::Boolean(true))),
        anonymous().union(vec![vertices.clone(), edges]),
        vertices,
    )
}

/// From an instance, vertex or edge, to its type
pub(super) fn out_isa(traversal: GraphTraversal, start: &Variable) -> GraphTraversal {
    let label_id = format!("{}~type-label-id", start.symbol());
    traversal.union(vec![
        anonymous().out(EdgeLabel::Isa).out(EdgeLabel::Shard),
        anonymous()
            .values(PropertyKey::RelationTypeLabelId)
            .as_(&label_id)
            .v()
            .has_where_eq(PropertyKey::LabelId, &label_id),
    ])
}

/// Role and relation type filters resolved to storage ids
struct CastingFilter<'a> {
    edge: &'a RolePlayerEdge,
    role_ids: Option<P>,
    relation_type_ids: Option<P>,
}

impl<'a> CastingFilter<'a> {
    fn resolve(
        concept_manager: &dyn ConceptManager,
        edge: &'a RolePlayerEdge,
    ) -> PlannerResult<Self> {
        let resolve = |labels: &Option<BTreeSet<Label>>| -> PlannerResult<Option<P>> {
            match labels {
                Some(labels) => {
                    let ids = label_ids(concept_manager, &with_subs(concept_manager, labels))?;
                    Ok(one_of(ids))
                }
                None => Ok(None),
            }
        };
        Ok(Self {
            edge,
            role_ids: resolve(&edge.role_labels)?,
            relation_type_ids: resolve(&edge.relation_type_labels)?,
        })
    }

    /// Filter the casting edge under `traversal`, name it, and bind or check the role
    fn apply(
        &self,
        mut traversal: GraphTraversal,
        role_key: PropertyKey,
        vars: &BTreeSet<Variable>,
    ) -> GraphTraversal {
        if let Some(ids) = &self.role_ids {
            traversal = traversal.has(role_key, ids.clone());
        }
        if let Some(ids) = &self.relation_type_ids {
            traversal = traversal.has(PropertyKey::RelationTypeLabelId, ids.clone());
        }
        let edge = self.edge.edge.symbol();
        traversal = traversal.as_(edge);

        if let Some(role) = &self.edge.role {
            let role_label_id = format!("{}~role-label-id", edge);
            traversal = traversal.values(role_key).as_(&role_label_id);
            traversal = if vars.contains(role) {
                traversal
                    .select(role.symbol())
                    .has_where_eq(PropertyKey::LabelId, &role_label_id)
            } else {
                traversal
                    .v()
                    .has_where_eq(PropertyKey::LabelId, &role_label_id)
                    .as_(role.symbol())
            };
            traversal = traversal.select(edge);
        }
        traversal
    }
}

/// From a relation to its role players
pub(super) fn out_role_player(
    traversal: GraphTraversal,
    concept_manager: &dyn ConceptManager,
    edge: &RolePlayerEdge,
    vars: &BTreeSet<Variable>,
) -> PlannerResult<GraphTraversal> {
    let filter = CastingFilter::resolve(concept_manager, edge)?;
    let reified = filter
        .apply(anonymous().out_e(EdgeLabel::RolePlayer), PropertyKey::RoleLabelId, vars)
        .in_v();
    let owner = filter
        .apply(
            anonymous().has_key(PropertyKey::RelationRoleOwnerLabelId),
            PropertyKey::RelationRoleOwnerLabelId,
            vars,
        )
        .out_v();
    let value = filter
        .apply(
            anonymous().has_key(PropertyKey::RelationRoleValueLabelId),
            PropertyKey::RelationRoleValueLabelId,
            vars,
        )
        .in_v();
    Ok(traversal.union(vec![reified, owner, value]))
}

/// From a role player to the relations it takes part in
///
/// When the relation is stored as an edge, the edge itself is the relation.
pub(super) fn in_role_player(
    traversal: GraphTraversal,
    concept_manager: &dyn ConceptManager,
    edge: &RolePlayerEdge,
    vars: &BTreeSet<Variable>,
) -> PlannerResult<GraphTraversal> {
    let filter = CastingFilter::resolve(concept_manager, edge)?;
    let reified = filter
        .apply(anonymous().in_e(EdgeLabel::RolePlayer), PropertyKey::RoleLabelId, vars)
        .out_v();
    let owner = filter.apply(
        anonymous().out_e(EdgeLabel::Attribute),
        PropertyKey::RelationRoleOwnerLabelId,
        vars,
    );
    let value = filter.apply(
        anonymous().in_e(EdgeLabel::Attribute),
        PropertyKey::RelationRoleValueLabelId,
        vars,
    );
    Ok(traversal.union(vec![reified, owner, value]))
}

/// From an owner to its attributes
pub(super) fn out_attribute(
    traversal: GraphTraversal,
    concept_manager: &dyn ConceptManager,
    edge: &AttributeEdge,
) -> PlannerResult<GraphTraversal> {
    let labels = with_subs(concept_manager, &edge.attribute_labels);
    let traversal = traversal
        .out_e(EdgeLabel::Attribute)
        .as_(edge.edge.symbol())
        .in_v();
    Ok(match one_of(label_ids(concept_manager, &labels)?) {
        Some(ids) => traversal.has(PropertyKey::ThingTypeLabelId, ids),
        None => traversal,
    })
}

/// From an attribute to its owners
pub(super) fn in_attribute(
    traversal: GraphTraversal,
    concept_manager: &dyn ConceptManager,
    edge: &AttributeEdge,
) -> PlannerResult<GraphTraversal> {
    let traversal = match one_of(label_ids(concept_manager, &edge.attribute_labels)?) {
        Some(ids) => traversal.has(PropertyKey::ThingTypeLabelId, ids),
        None => traversal,
    };
    Ok(traversal
        .in_e(EdgeLabel::Attribute)
        .as_(edge.edge.symbol())
        .out_v())
}

/// Compare against `other` without moving off `start`
pub(super) fn not_equal(
    traversal: GraphTraversal,
    start: &Variable,
    other: &Variable,
) -> GraphTraversal {
    traversal
        .select(other.symbol())
        .where_neq(start.symbol())
        .select(start.symbol())
}

/// Owners per attribute of this type
pub(super) fn attribute_index_estimate(
    concept_manager: &dyn ConceptManager,
    statistics: &dyn KeyspaceStatistics,
    attribute_label: &Label,
) -> f64 {
    let attributes = statistics.count(concept_manager, attribute_label);
    if attributes == 0 {
        return 0.0;
    }
    let ownerships = statistics.count(concept_manager, &Label::implicit_has(attribute_label));
    ownerships as f64 / attributes as f64
}

/// Owners per attribute across every attribute type
///
/// The value may match attributes of any type, so the ratio is taken over the
/// whole schema.
pub(super) fn value_estimate(
    concept_manager: &dyn ConceptManager,
    statistics: &dyn KeyspaceStatistics,
) -> f64 {
    let (attributes, ownerships) = concept_manager.attribute_types().iter().fold(
        (0u64, 0u64),
        |(attributes, ownerships), attribute_type| {
            let implicit = Label::implicit_has(&attribute_type.label);
            (
                attributes + statistics.count(concept_manager, &attribute_type.label),
                ownerships + statistics.count(concept_manager, &implicit),
            )
        },
    );
    if attributes == 0 {
        return 0.0;
    }
    ownerships as f64 / attributes as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::{InMemoryConceptManager, InMemoryStatistics};
    use crate::traversal::Step;

    #[test]
    fn test_edge_id_unions_edge_and_vertex_lookups() {
        let edge = id(GraphTraversal::anonymous(), &ConceptId::edge(12));
        assert!(edge.contains_step(&|step| *step == Step::E));
        assert!(edge.contains_step(&|step| matches!(step, Step::Has(PropertyKey::EdgeId, P::Eq(Value::String(s))) if s == "12")));
        assert!(edge.contains_step(&|step| matches!(step, Step::HasId(_))));

        let vertex = id(GraphTraversal::anonymous(), &ConceptId::vertex(12));
        assert_eq!(vertex.to_string(), "hasId(V12)");
    }

    #[test]
    fn test_attribute_index_estimate() {
        let cm = InMemoryConceptManager::new()
            .with_entity_type("person")
            .with_attribute_type("name", ValueType::String)
            .with_has("person", "name");
        let stats = InMemoryStatistics::new()
            .with_count("name", 10)
            .with_count("@has-name", 4);
        assert_eq!(attribute_index_estimate(&cm, &stats, &Label::of("name")), 0.4);

        let empty = InMemoryStatistics::new().with_count("@has-name", 4);
        assert_eq!(attribute_index_estimate(&cm, &empty, &Label::of("name")), 0.0);
    }

    #[test]
    fn test_not_equal_restores_position() {
        let traversal = not_equal(
            GraphTraversal::anonymous(),
            &Variable::named("a"),
            &Variable::named("b"),
        );
        assert_eq!(traversal.to_string(), "select(b).where(neq(a)).select(a)");
    }

    #[test]
    fn test_in_isa_walks_schema_for_edge_instances() {
        let x = Variable::named("t");
        let plain = in_isa(GraphTraversal::anonymous(), &x, false);
        assert_eq!(plain.to_string(), "in(SHARD).in(ISA)");

        let with_edges = in_isa(GraphTraversal::anonymous(), &x, true);
        assert!(with_edges.contains_step(&|step| matches!(step, Step::Choose { .. })));
        assert!(with_edges.contains_step(&|step| *step == Step::OutE(EdgeLabel::Attribute)));
    }

    #[test]
    fn test_role_player_unions_three_shapes() {
        let cm = InMemoryConceptManager::new()
            .with_entity_type("person")
            .with_relation_type("employment", &["employee", "employer"]);
        let edge = RolePlayerEdge::new(Variable::reserved("r-casting-0"), None)
            .with_role_labels(BTreeSet::from([Label::of("employee")]));
        let traversal =
            out_role_player(GraphTraversal::anonymous(), &cm, &edge, &BTreeSet::new()).unwrap();
        let Some(Step::Union(branches)) = traversal.steps().first() else {
            panic!("expected a union, got {}", traversal);
        };
        assert_eq!(branches.len(), 3);
        assert!(branches[0].contains_step(&|step| matches!(step, Step::Has(PropertyKey::RoleLabelId, _))));
        assert!(branches[1].contains_step(&|step| matches!(step, Step::Has(PropertyKey::RelationRoleOwnerLabelId, _))));
        assert!(branches[2].contains_step(&|step| matches!(step, Step::Has(PropertyKey::RelationRoleValueLabelId, _))));
    }

    #[test]
    fn test_bound_role_is_compared_not_rebound() {
        let cm = InMemoryConceptManager::new()
            .with_relation_type("employment", &["employee", "employer"]);
        let role = Variable::named("role");
        let edge = RolePlayerEdge::new(Variable::reserved("r-casting-0"), Some(role.clone()));
        let unbound =
            in_role_player(GraphTraversal::anonymous(), &cm, &edge, &BTreeSet::new()).unwrap();
        assert!(unbound.contains_step(&|step| *step == Step::As("role".to_string())));

        let bound = in_role_player(
            GraphTraversal::anonymous(),
            &cm,
            &edge,
            &BTreeSet::from([role]),
        )
        .unwrap();
        assert!(!bound.contains_step(&|step| *step == Step::As("role".to_string())));
        assert!(bound.contains_step(&|step| *step == Step::Select("role".to_string())));
    }

    #[test]
    fn test_out_attribute_expands_subtypes() {
        let cm = InMemoryConceptManager::new()
            .with_attribute_type("name", ValueType::String)
            .with_attribute_type("nickname", ValueType::String)
            .with_supertype("nickname", "name");
        let edge = AttributeEdge::new(
            Variable::reserved("x-has-n"),
            BTreeSet::from([Label::of("name")]),
        );
        let out = out_attribute(GraphTraversal::anonymous(), &cm, &edge).unwrap();
        assert!(out.contains_step(&|step| matches!(step, Step::Has(PropertyKey::ThingTypeLabelId, P::Within(ids)) if ids.len() == 2)));

        let inward = in_attribute(GraphTraversal::anonymous(), &cm, &edge).unwrap();
        assert!(inward.contains_step(&|step| matches!(step, Step::Has(PropertyKey::ThingTypeLabelId, P::Eq(_)))));
    }

    #[test]
    fn test_numeric_value_checks_both_numeric_types() {
        let traversal = value(GraphTraversal::anonymous(), &ValuePredicate::eq(3i64));
        assert!(traversal.contains_step(&|step| matches!(step, Step::Has(PropertyKey::Value(ValueType::Double), _))));
        let traversal = value(GraphTraversal::anonymous(), &ValuePredicate::eq("Alice"));
        assert_eq!(traversal.steps().len(), 1);
    }
}
