// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! From declarative properties to interchangeable fragments
//!
//! Each property of a statement becomes an [`EquivalentFragmentSet`]: fragments
//! that each enforce the whole property on their own, typically the two
//! directions of one edge. The planner picks one fragment per set.

use std::collections::{BTreeMap, BTreeSet};

use crate::concept::{ConceptManager, Label};
use crate::error::{PlannerError, PlannerResult};
use crate::pattern::{Conjunction, Property, RolePlayer, SubDepth, ValuePredicate, Variable};
use crate::plan::fragment::{AttributeEdge, Fragment, RolePlayerEdge};
use crate::plan::inference;

/// Fragments any one of which satisfies a property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalentFragmentSet {
    fragments: Vec<Fragment>,
}

impl EquivalentFragmentSet {
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Self { fragments }
    }

    pub fn single(fragment: Fragment) -> Self {
        Self::new(vec![fragment])
    }

    /// An edge fragment together with its inverse
    pub fn edge(fragment: Fragment) -> Self {
        let inverse = fragment.get_inverse();
        Self::new(vec![fragment, inverse])
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }
}

/// What a conjunction says about the labels of its variables
#[derive(Debug, Default)]
pub(crate) struct KnownTypes {
    labels: BTreeMap<Variable, BTreeSet<Label>>,
    types: BTreeMap<Variable, BTreeSet<Variable>>,
    attribute_types: BTreeMap<Variable, BTreeSet<Label>>,
}

impl KnownTypes {
    pub(crate) fn from_conjunction(conjunction: &Conjunction) -> Self {
        let mut known = Self::default();
        for statement in &conjunction.statements {
            for property in &statement.properties {
                match property {
                    Property::Label(labels) => {
                        known
                            .labels
                            .entry(statement.var.clone())
                            .or_default()
                            .extend(labels.iter().cloned());
                    }
                    Property::Isa { type_var, .. } => {
                        known
                            .types
                            .entry(statement.var.clone())
                            .or_default()
                            .insert(type_var.clone());
                    }
                    Property::HasAttribute {
                        attribute_type,
                        attribute_var,
                    } => {
                        known
                            .attribute_types
                            .entry(attribute_var.clone())
                            .or_default()
                            .insert(attribute_type.clone());
                    }
                    _ => {}
                }
            }
        }
        known
    }

    /// Labels a schema variable is pinned to
    pub(crate) fn labels_of(&self, var: &Variable) -> Option<&BTreeSet<Label>> {
        self.labels.get(var)
    }

    /// Labels of the types an instance variable is declared to be an instance of
    pub(crate) fn type_labels_of(&self, instance: &Variable) -> BTreeSet<Label> {
        let mut labels: BTreeSet<Label> = self
            .types
            .get(instance)
            .into_iter()
            .flatten()
            .filter_map(|type_var| self.labels.get(type_var))
            .flatten()
            .cloned()
            .collect();
        if let Some(attribute_types) = self.attribute_types.get(instance) {
            labels.extend(attribute_types.iter().cloned());
        }
        labels
    }

    pub(crate) fn has_type(&self, instance: &Variable) -> bool {
        !self.type_labels_of(instance).is_empty()
    }
}

/// The fragments of one conjunction, grouped by the property they came from
#[derive(Debug, Clone)]
pub struct ConjunctionQuery {
    vars: BTreeSet<Variable>,
    sets: Vec<EquivalentFragmentSet>,
}

impl ConjunctionQuery {
    pub fn new(
        conjunction: &Conjunction,
        concept_manager: &dyn ConceptManager,
        infer_relation_types: bool,
    ) -> PlannerResult<Self> {
        let known = KnownTypes::from_conjunction(conjunction);
        let mut builder = SetBuilder {
            concept_manager,
            known: &known,
            sets: Vec::new(),
        };
        for statement in &conjunction.statements {
            for property in &statement.properties {
                builder.add_property(&statement.var, property)?;
            }
        }
        let mut sets = builder.sets;
        if infer_relation_types {
            sets.extend(inference::infer_relation_types(
                conjunction,
                &known,
                concept_manager,
            ));
        }
        Ok(Self {
            vars: conjunction.variables(),
            sets,
        })
    }

    pub fn equivalent_fragment_sets(&self) -> &[EquivalentFragmentSet] {
        &self.sets
    }

    /// Every candidate fragment
    pub fn fragments(&self) -> Vec<Fragment> {
        self.sets
            .iter()
            .flat_map(|set| set.fragments().iter().cloned())
            .collect()
    }

    /// Variables of the pattern, excluding system-generated ones
    pub fn vars(&self) -> &BTreeSet<Variable> {
        &self.vars
    }
}

struct SetBuilder<'a> {
    concept_manager: &'a dyn ConceptManager,
    known: &'a KnownTypes,
    sets: Vec<EquivalentFragmentSet>,
}

impl SetBuilder<'_> {
    fn push(&mut self, set: EquivalentFragmentSet) {
        self.sets.push(set);
    }

    fn add_property(&mut self, var: &Variable, property: &Property) -> PlannerResult<()> {
        match property {
            Property::Label(labels) => {
                if labels.is_empty() {
                    return Err(PlannerError::UnsupportedPattern(format!(
                        "{} has an empty label set",
                        var
                    )));
                }
                self.push(EquivalentFragmentSet::single(Fragment::label(
                    var.clone(),
                    labels.clone(),
                )));
            }
            Property::Id(id) => {
                self.push(EquivalentFragmentSet::single(Fragment::id(var.clone(), id.clone())));
            }
            Property::Isa { type_var, explicit } => self.add_isa(var, type_var, *explicit),
            Property::Sub { super_var, depth } => {
                self.push(EquivalentFragmentSet::edge(Fragment::out_sub(
                    var.clone(),
                    super_var.clone(),
                    *depth,
                )));
                if self.known.labels_of(var).is_none() {
                    self.push(EquivalentFragmentSet::single(Fragment::not_internal(var.clone())));
                }
            }
            Property::Plays { role_var, required } => {
                self.push(EquivalentFragmentSet::edge(Fragment::out_plays(
                    var.clone(),
                    role_var.clone(),
                    *required,
                )));
            }
            Property::Relates { role_var } => {
                self.push(EquivalentFragmentSet::edge(Fragment::out_relates(
                    var.clone(),
                    role_var.clone(),
                )));
            }
            Property::Has { attribute_type_var } => {
                self.push(EquivalentFragmentSet::edge(Fragment::out_has(
                    var.clone(),
                    attribute_type_var.clone(),
                )));
            }
            Property::Key { attribute_type_var } => {
                self.push(EquivalentFragmentSet::edge(Fragment::out_key(
                    var.clone(),
                    attribute_type_var.clone(),
                )));
            }
            Property::HasAttribute {
                attribute_type,
                attribute_var,
            } => self.add_has_attribute(var, attribute_type, attribute_var)?,
            Property::Relation { role_players } => self.add_relation(var, role_players)?,
            Property::Value(predicate) => self.add_value(var, predicate),
            Property::Neq(other) => {
                self.push(EquivalentFragmentSet::new(vec![
                    Fragment::not_equal(var.clone(), other.clone()),
                    Fragment::not_equal(other.clone(), var.clone()),
                ]));
            }
            Property::Regex(regex) => {
                regex::Regex::new(regex)?;
                self.push(EquivalentFragmentSet::single(Fragment::regex(
                    var.clone(),
                    regex.clone(),
                )));
            }
            Property::Abstract => {
                self.push(EquivalentFragmentSet::single(Fragment::is_abstract(var.clone())));
            }
            Property::ValueType(value_type) => {
                self.push(EquivalentFragmentSet::single(Fragment::value_type(
                    var.clone(),
                    *value_type,
                )));
            }
        }
        Ok(())
    }

    /// `isa!` is a single hop; `isa` reaches the direct type and then any supertype
    fn add_isa(&mut self, instance: &Variable, type_var: &Variable, explicit: bool) {
        let may_have_edge_instances = self.may_have_edge_instances(type_var);
        if explicit {
            self.push(EquivalentFragmentSet::edge(Fragment::out_isa(
                instance.clone(),
                type_var.clone(),
                may_have_edge_instances,
            )));
            return;
        }
        let direct_type = Variable::reserved(format!("{}-isa-{}", instance.symbol(), type_var.symbol()));
        self.push(EquivalentFragmentSet::edge(Fragment::out_isa(
            instance.clone(),
            direct_type.clone(),
            may_have_edge_instances,
        )));
        self.push(EquivalentFragmentSet::edge(Fragment::out_sub(
            direct_type,
            type_var.clone(),
            SubDepth::Unlimited,
        )));
    }

    /// Instances may be edges unless every type they can have is known to be
    /// something other than an implicit relation type
    fn may_have_edge_instances(&self, type_var: &Variable) -> bool {
        let Some(labels) = self.known.labels_of(type_var) else {
            return true;
        };
        labels.iter().any(|label| {
            self.concept_manager
                .subs(label)
                .iter()
                .filter_map(|sub| self.concept_manager.get_type(sub))
                .any(|concept| concept.is_relation_type() && concept.is_implicit)
        })
    }

    fn add_has_attribute(
        &mut self,
        owner: &Variable,
        attribute_type: &Label,
        attribute: &Variable,
    ) -> PlannerResult<()> {
        match self.concept_manager.get_schema_concept(attribute_type) {
            None => return Err(PlannerError::UnknownLabel(attribute_type.to_string())),
            Some(concept) if !concept.is_attribute_type() => {
                return Err(PlannerError::UnsupportedPattern(format!(
                    "{} is not an attribute type",
                    attribute_type
                )))
            }
            Some(_) => {}
        }
        let edge = Variable::reserved(format!("{}-has-{}", owner.symbol(), attribute.symbol()));
        self.push(EquivalentFragmentSet::edge(Fragment::out_attribute(
            owner.clone(),
            attribute.clone(),
            AttributeEdge::new(edge, BTreeSet::from([attribute_type.clone()])),
        )));
        Ok(())
    }

    fn add_relation(&mut self, relation: &Variable, role_players: &[RolePlayer]) -> PlannerResult<()> {
        if role_players.is_empty() {
            return Err(PlannerError::UnsupportedPattern(format!(
                "relation {} has no role players",
                relation
            )));
        }
        let relation_types = self.known.type_labels_of(relation);

        let mut edges = Vec::with_capacity(role_players.len());
        for (i, casting) in role_players.iter().enumerate() {
            let edge_var = Variable::reserved(format!("{}-casting-{}", relation.symbol(), i));
            let mut edge = RolePlayerEdge::new(edge_var.clone(), casting.role.clone());
            if let Some(role_labels) = casting.role.as_ref().and_then(|role| self.known.labels_of(role)) {
                edge = edge.with_role_labels(role_labels.clone());
            }
            if !relation_types.is_empty() {
                edge = edge.with_relation_type_labels(relation_types.clone());
            }
            self.push(EquivalentFragmentSet::edge(Fragment::out_role_player(
                relation.clone(),
                casting.player.clone(),
                edge,
            )));
            edges.push(edge_var);
        }

        // distinct castings must use distinct edges
        for (i, first) in edges.iter().enumerate() {
            for second in &edges[i + 1..] {
                self.push(EquivalentFragmentSet::new(vec![
                    Fragment::not_equal(first.clone(), second.clone()),
                    Fragment::not_equal(second.clone(), first.clone()),
                ]));
            }
        }
        Ok(())
    }

    fn add_value(&mut self, var: &Variable, predicate: &ValuePredicate) {
        self.push(EquivalentFragmentSet::single(Fragment::value(
            var.clone(),
            predicate.clone(),
        )));

        let text = predicate
            .literal()
            .filter(|_| predicate.is_value_equality())
            .and_then(|literal| literal.as_str());
        let attribute_types = self.known.type_labels_of(var);
        if let (Some(text), Some(attribute_type), 1) = (
            text,
            attribute_types.iter().next(),
            attribute_types.len(),
        ) {
            self.push(EquivalentFragmentSet::single(Fragment::attribute_index(
                var.clone(),
                attribute_type.clone(),
                text,
            )));
        }
    }
}
