// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Relation-type inference from typed role players
//!
//! An untyped relation whose role players have known types can only be of a
//! relation type every one of those players can take part in. When that
//! leaves a single candidate, the relation gets an explicit type, which gives
//! the planner a fixed-cost starting point it would not have otherwise.

use std::collections::BTreeSet;

use log::debug;

use crate::concept::{ConceptManager, Label};
use crate::pattern::{Conjunction, Property, RolePlayer, Variable};
use crate::plan::equivalent::{EquivalentFragmentSet, KnownTypes};
use crate::plan::fragment::Fragment;

pub(crate) fn infer_relation_types(
    conjunction: &Conjunction,
    known: &KnownTypes,
    concept_manager: &dyn ConceptManager,
) -> Vec<EquivalentFragmentSet> {
    let mut sets = Vec::new();
    for statement in &conjunction.statements {
        if known.has_type(&statement.var) {
            continue;
        }
        for property in &statement.properties {
            let Property::Relation { role_players } = property else {
                continue;
            };
            let Some(relation_type) = infer(role_players, known, concept_manager) else {
                continue;
            };
            debug!(
                "Inferred relation type {} for {}",
                relation_type, statement.var
            );
            let is_implicit = concept_manager
                .get_type(&relation_type)
                .map(|concept| concept.is_implicit)
                .unwrap_or(false);
            let type_var = inferred_type_var(&statement.var);
            sets.push(EquivalentFragmentSet::single(Fragment::label(
                type_var.clone(),
                BTreeSet::from([relation_type]),
            )));
            sets.push(EquivalentFragmentSet::edge(Fragment::out_isa(
                statement.var.clone(),
                type_var,
                is_implicit,
            )));
        }
    }
    sets
}

/// Deterministic name of the type variable added for an inferred relation
pub fn inferred_type_var(relation: &Variable) -> Variable {
    Variable::reserved(format!("{}-inferred-type", relation.symbol()))
}

/// The single relation type all typed role players agree on
fn infer(
    role_players: &[RolePlayer],
    known: &KnownTypes,
    concept_manager: &dyn ConceptManager,
) -> Option<Label> {
    let mut candidates: Option<BTreeSet<Label>> = None;
    let mut typed_players = 0;
    for casting in role_players {
        let player_types = known.type_labels_of(&casting.player);
        if player_types.is_empty() {
            continue;
        }
        typed_players += 1;

        let role_labels = casting.role.as_ref().and_then(|role| known.labels_of(role));
        let playable: BTreeSet<Label> = player_types
            .iter()
            .flat_map(|player_type| {
                relation_types_playable_by(concept_manager, player_type, role_labels)
            })
            .collect();
        candidates = Some(match candidates {
            None => playable,
            Some(current) => current.intersection(&playable).cloned().collect(),
        });
    }

    let candidates = candidates?;
    if typed_players < 2 || candidates.len() != 1 {
        return None;
    }
    candidates.into_iter().next()
}

/// Explicit relation types instances of `thing_type` can take part in,
/// optionally only through the given roles
fn relation_types_playable_by(
    concept_manager: &dyn ConceptManager,
    thing_type: &Label,
    role_labels: Option<&BTreeSet<Label>>,
) -> BTreeSet<Label> {
    concept_manager
        .roles_played_by(thing_type)
        .into_iter()
        .filter(|role| role_labels.map_or(true, |allowed| allowed.contains(role)))
        .flat_map(|role| concept_manager.relation_types_relating(&role))
        .flat_map(|relation_type| concept_manager.subs(&relation_type))
        .filter(|relation_type| {
            concept_manager
                .get_type(relation_type)
                .map(|concept| concept.is_relation_type() && !concept.is_implicit)
                .unwrap_or(false)
        })
        .collect()
}
