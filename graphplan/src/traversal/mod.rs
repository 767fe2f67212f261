// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Traversal programs
//!
//! A [`GraphTraversal`] is the cursor fragments extend. Rather than driving a
//! live storage iterator, planning produces an owned, inspectable list of
//! [`Step`]s which the query executor interprets against the graph. Labels
//! set with [`Step::As`] name the element the cursor was positioned at, so
//! later steps can jump back to it or compare against it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::concept::schema::{BaseType, EdgeLabel, PropertyKey};
use crate::pattern::{Comparator, Value};

/// Predicate over a property value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum P {
    Eq(Value),
    Neq(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    Within(Vec<Value>),
    Containing(String),
    Regex(String),
}

impl P {
    /// Build the predicate matching `comparator` against a literal
    pub fn compare(comparator: Comparator, value: Value) -> Self {
        match comparator {
            Comparator::Eq => P::Eq(value),
            Comparator::Neq => P::Neq(value),
            Comparator::Gt => P::Gt(value),
            Comparator::Gte => P::Gte(value),
            Comparator::Lt => P::Lt(value),
            Comparator::Lte => P::Lte(value),
            Comparator::Contains => P::Containing(text_of(value)),
            Comparator::Like => P::Regex(text_of(value)),
        }
    }
}

fn text_of(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

impl fmt::Display for P {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            P::Eq(value) => write!(f, "eq({})", value),
            P::Neq(value) => write!(f, "neq({})", value),
            P::Gt(value) => write!(f, "gt({})", value),
            P::Gte(value) => write!(f, "gte({})", value),
            P::Lt(value) => write!(f, "lt({})", value),
            P::Lte(value) => write!(f, "lte({})", value),
            P::Within(values) => {
                let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "within({})", values.join(","))
            }
            P::Containing(value) => write!(f, "containing(\"{}\")", value),
            P::Regex(value) => write!(f, "regex(\"{}\")", value),
        }
    }
}

/// One instruction of a traversal program
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    /// Restart from every vertex
    V,
    /// Restart from every edge
    E,
    /// Name the current element
    As(String),
    /// Jump back to a named element
    Select(String),
    /// Keep the current element only if it is the named element
    WhereEq(String),
    /// Keep the current element only if it is not the named element
    WhereNeq(String),
    /// Compare the current element's value with the named element's value
    WhereValue {
        comparator: Comparator,
        other: String,
    },
    HasId(String),
    Has(PropertyKey, P),
    HasKey(PropertyKey),
    HasNot(PropertyKey),
    HasLabel(BaseType),
    NotHasLabel(BaseType),
    /// Keep elements whose property equals the value saved under a name
    HasWhereEq {
        key: PropertyKey,
        label: String,
    },
    Out(EdgeLabel),
    In(EdgeLabel),
    OutE(EdgeLabel),
    InE(EdgeLabel),
    OutV,
    InV,
    /// Move to the value of a property
    Values(PropertyKey),
    Union(Vec<GraphTraversal>),
    Choose {
        condition: GraphTraversal,
        then: GraphTraversal,
        otherwise: GraphTraversal,
    },
    /// Repeat the body; `times` bounds the loop, `emit` yields every round
    /// including the starting element
    Repeat {
        body: GraphTraversal,
        times: Option<u32>,
        emit: bool,
    },
    Not(GraphTraversal),
}

/// An ordered traversal program
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphTraversal {
    steps: Vec<Step>,
}

impl GraphTraversal {
    /// A fresh traversal positioned over every vertex
    pub fn new() -> Self {
        Self {
            steps: vec![Step::V],
        }
    }

    /// An anonymous traversal continuing from wherever it is spliced in
    pub fn anonymous() -> Self {
        Self { steps: Vec::new() }
    }

    /// True until a fragment has extended the traversal
    pub fn is_fresh(&self) -> bool {
        self.steps.len() <= 1 && self.steps.iter().all(|step| *step == Step::V)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn push(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn v(self) -> Self {
        self.push(Step::V)
    }

    pub fn e(self) -> Self {
        self.push(Step::E)
    }

    pub fn as_(self, label: &str) -> Self {
        self.push(Step::As(label.to_string()))
    }

    pub fn select(self, label: &str) -> Self {
        self.push(Step::Select(label.to_string()))
    }

    pub fn where_eq(self, label: &str) -> Self {
        self.push(Step::WhereEq(label.to_string()))
    }

    pub fn where_neq(self, label: &str) -> Self {
        self.push(Step::WhereNeq(label.to_string()))
    }

    pub fn where_value(self, comparator: Comparator, other: &str) -> Self {
        self.push(Step::WhereValue {
            comparator,
            other: other.to_string(),
        })
    }

    pub fn has_id(self, id: &str) -> Self {
        self.push(Step::HasId(id.to_string()))
    }

    pub fn has(self, key: PropertyKey, predicate: P) -> Self {
        self.push(Step::Has(key, predicate))
    }

    pub fn has_key(self, key: PropertyKey) -> Self {
        self.push(Step::HasKey(key))
    }

    pub fn has_not(self, key: PropertyKey) -> Self {
        self.push(Step::HasNot(key))
    }

    pub fn has_label(self, base_type: BaseType) -> Self {
        self.push(Step::HasLabel(base_type))
    }

    pub fn not_has_label(self, base_type: BaseType) -> Self {
        self.push(Step::NotHasLabel(base_type))
    }

    pub fn has_where_eq(self, key: PropertyKey, label: &str) -> Self {
        self.push(Step::HasWhereEq {
            key,
            label: label.to_string(),
        })
    }

    pub fn out(self, edge: EdgeLabel) -> Self {
        self.push(Step::Out(edge))
    }

    pub fn in_(self, edge: EdgeLabel) -> Self {
        self.push(Step::In(edge))
    }

    pub fn out_e(self, edge: EdgeLabel) -> Self {
        self.push(Step::OutE(edge))
    }

    pub fn in_e(self, edge: EdgeLabel) -> Self {
        self.push(Step::InE(edge))
    }

    pub fn out_v(self) -> Self {
        self.push(Step::OutV)
    }

    pub fn in_v(self) -> Self {
        self.push(Step::InV)
    }

    pub fn values(self, key: PropertyKey) -> Self {
        self.push(Step::Values(key))
    }

    pub fn union(self, branches: Vec<GraphTraversal>) -> Self {
        self.push(Step::Union(branches))
    }

    pub fn choose(
        self,
        condition: GraphTraversal,
        then: GraphTraversal,
        otherwise: GraphTraversal,
    ) -> Self {
        self.push(Step::Choose {
            condition,
            then,
            otherwise,
        })
    }

    pub fn repeat(self, body: GraphTraversal, times: Option<u32>, emit: bool) -> Self {
        self.push(Step::Repeat { body, times, emit })
    }

    pub fn not(self, inner: GraphTraversal) -> Self {
        self.push(Step::Not(inner))
    }

    /// Splice another traversal's steps onto this one
    pub fn append(mut self, other: GraphTraversal) -> Self {
        self.steps.extend(other.steps);
        self
    }

    /// Whether any step, including those nested in branches, satisfies `pred`
    pub fn contains_step(&self, pred: &dyn Fn(&Step) -> bool) -> bool {
        self.steps.iter().any(|step| {
            pred(step)
                || match step {
                    Step::Union(branches) => branches.iter().any(|b| b.contains_step(pred)),
                    Step::Choose {
                        condition,
                        then,
                        otherwise,
                    } => {
                        condition.contains_step(pred)
                            || then.contains_step(pred)
                            || otherwise.contains_step(pred)
                    }
                    Step::Repeat { body, .. } => body.contains_step(pred),
                    Step::Not(inner) => inner.contains_step(pred),
                    _ => false,
                }
        })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::V => write!(f, "V()"),
            Step::E => write!(f, "E()"),
            Step::As(label) => write!(f, "as({})", label),
            Step::Select(label) => write!(f, "select({})", label),
            Step::WhereEq(label) => write!(f, "where(eq({}))", label),
            Step::WhereNeq(label) => write!(f, "where(neq({}))", label),
            Step::WhereValue { comparator, other } => {
                write!(f, "where({} {}).by(value)", comparator.symbol(), other)
            }
            Step::HasId(id) => write!(f, "hasId({})", id),
            Step::Has(key, predicate) => write!(f, "has({}, {})", key, predicate),
            Step::HasKey(key) => write!(f, "has({})", key),
            Step::HasNot(key) => write!(f, "hasNot({})", key),
            Step::HasLabel(base_type) => write!(f, "hasLabel({})", base_type),
            Step::NotHasLabel(base_type) => write!(f, "not(hasLabel({}))", base_type),
            Step::HasWhereEq { key, label } => write!(f, "has({}, where(eq({})))", key, label),
            Step::Out(edge) => write!(f, "out({})", edge),
            Step::In(edge) => write!(f, "in({})", edge),
            Step::OutE(edge) => write!(f, "outE({})", edge),
            Step::InE(edge) => write!(f, "inE({})", edge),
            Step::OutV => write!(f, "outV()"),
            Step::InV => write!(f, "inV()"),
            Step::Values(key) => write!(f, "values({})", key),
            Step::Union(branches) => {
                let branches: Vec<String> = branches.iter().map(|b| b.to_string()).collect();
                write!(f, "union({})", branches.join(", "))
            }
            Step::Choose {
                condition,
                then,
                otherwise,
            } => write!(f, "choose({}, {}, {})", condition, then, otherwise),
            Step::Repeat { body, times, emit } => {
                write!(f, "repeat({})", body)?;
                if let Some(times) = times {
                    write!(f, ".times({})", times)?;
                }
                if *emit {
                    write!(f, ".emit()")?;
                }
                Ok(())
            }
            Step::Not(inner) => write!(f, "not({})", inner),
        }
    }
}

impl fmt::Display for GraphTraversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "__");
        }
        let steps: Vec<String> = self.steps.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", steps.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_traversal() {
        let traversal = GraphTraversal::new();
        assert!(traversal.is_fresh());
        assert!(!traversal.as_("x").is_fresh());
    }

    #[test]
    fn test_display_renders_nested_steps() {
        let traversal = GraphTraversal::new()
            .has(PropertyKey::LabelId, P::Eq(Value::Long(3)))
            .as_("x")
            .union(vec![
                GraphTraversal::anonymous().out(EdgeLabel::Isa),
                GraphTraversal::anonymous().values(PropertyKey::RelationTypeLabelId),
            ]);
        assert_eq!(
            traversal.to_string(),
            "V().has(LABEL_ID, eq(3)).as(x).union(out(ISA), values(RELATION_TYPE_LABEL_ID))"
        );
    }

    #[test]
    fn test_contains_step_looks_into_branches() {
        let traversal = GraphTraversal::new().union(vec![
            GraphTraversal::anonymous().has_id("V1"),
            GraphTraversal::anonymous().e().has(PropertyKey::EdgeId, P::Eq("1".into())),
        ]);
        assert!(traversal.contains_step(&|step| *step == Step::E));
        assert!(!traversal.contains_step(&|step| matches!(step, Step::Out(_))));
    }
}
