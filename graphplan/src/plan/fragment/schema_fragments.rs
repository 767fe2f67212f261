// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Traversal steps for fragments over schema concepts

use std::collections::BTreeSet;

use crate::concept::schema::{BaseType, EdgeLabel, PropertyKey};
use crate::concept::{ConceptManager, Label, ValueType};
use crate::error::{PlannerError, PlannerResult};
use crate::pattern::{SubDepth, Value};
use crate::traversal::{GraphTraversal, P};

pub(super) fn label(
    traversal: GraphTraversal,
    concept_manager: &dyn ConceptManager,
    labels: &BTreeSet<Label>,
) -> PlannerResult<GraphTraversal> {
    let ids = label_ids(concept_manager, labels)?;
    let predicate = match ids.as_slice() {
        [] => {
            return Err(PlannerError::UnsupportedPattern(
                "label fragment without labels".to_string(),
            ))
        }
        [single] => P::Eq(single.clone()),
        _ => P::Within(ids),
    };
    Ok(traversal.has(PropertyKey::LabelId, predicate))
}

/// Resolve labels to their storage ids as traversal values
pub(super) fn label_ids(
    concept_manager: &dyn ConceptManager,
    labels: &BTreeSet<Label>,
) -> PlannerResult<Vec<Value>> {
    labels
        .iter()
        .map(|label| {
            concept_manager
                .convert_to_id(label)
                .map(|id| Value::Long(id.value()))
        })
        .collect()
}

/// From a type down to itself and its subtypes
pub(super) fn in_subs(traversal: GraphTraversal, depth: SubDepth) -> GraphTraversal {
    subs(traversal, GraphTraversal::anonymous().in_(EdgeLabel::Sub), depth)
}

/// From a type up to itself and its supertypes
pub(super) fn out_subs(traversal: GraphTraversal, depth: SubDepth) -> GraphTraversal {
    subs(traversal, GraphTraversal::anonymous().out(EdgeLabel::Sub), depth)
}

fn subs(traversal: GraphTraversal, hop: GraphTraversal, depth: SubDepth) -> GraphTraversal {
    let traversal = match depth {
        SubDepth::Unlimited => traversal.repeat(hop, None, true),
        SubDepth::Exactly(0) => traversal,
        SubDepth::Exactly(hops) => traversal.repeat(hop, Some(hops), false),
    };
    traversal.not_has_label(BaseType::Shard)
}

pub(super) fn in_plays(traversal: GraphTraversal, required: bool) -> GraphTraversal {
    let traversal = if required {
        traversal
            .in_e(EdgeLabel::Plays)
            .has(PropertyKey::Required, P::Eq(Value::Boolean(true)))
            .out_v()
    } else {
        traversal.in_(EdgeLabel::Plays)
    };
    in_subs(traversal, SubDepth::Unlimited)
}

pub(super) fn out_plays(traversal: GraphTraversal, required: bool) -> GraphTraversal {
    let traversal = out_subs(traversal, SubDepth::Unlimited);
    if required {
        traversal
            .out_e(EdgeLabel::Plays)
            .has(PropertyKey::Required, P::Eq(Value::Boolean(true)))
            .in_v()
    } else {
        traversal.out(EdgeLabel::Plays)
    }
}

pub(super) fn in_relates(traversal: GraphTraversal) -> GraphTraversal {
    traversal.in_(EdgeLabel::Relates)
}

pub(super) fn out_relates(traversal: GraphTraversal) -> GraphTraversal {
    traversal.out(EdgeLabel::Relates)
}

/// From an attribute type to its owners, including owners by inheritance
pub(super) fn in_has(traversal: GraphTraversal, key: bool) -> GraphTraversal {
    in_subs(traversal.in_(ownership_edge(key)), SubDepth::Unlimited)
}

/// From a type to the attribute types it or its supertypes own
pub(super) fn out_has(traversal: GraphTraversal, key: bool) -> GraphTraversal {
    out_subs(traversal, SubDepth::Unlimited).out(ownership_edge(key))
}

fn ownership_edge(key: bool) -> EdgeLabel {
    if key {
        EdgeLabel::Key
    } else {
        EdgeLabel::Has
    }
}

pub(super) fn is_abstract(traversal: GraphTraversal) -> GraphTraversal {
    traversal.has(PropertyKey::IsAbstract, P::Eq(Value::Boolean(true)))
}

pub(super) fn regex(traversal: GraphTraversal, regex: &str) -> GraphTraversal {
    traversal.has(PropertyKey::Regex, P::Eq(Value::String(regex.to_string())))
}

pub(super) fn not_internal(traversal: GraphTraversal) -> GraphTraversal {
    traversal.not_has_label(BaseType::Shard)
}

pub(super) fn value_type(traversal: GraphTraversal, value_type: ValueType) -> GraphTraversal {
    traversal.has(
        PropertyKey::ValueType,
        P::Eq(Value::String(value_type.name().to_string())),
    )
}
