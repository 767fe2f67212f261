// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Planned pattern, one fragment list per conjunction

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::concept::{ConceptId, ConceptManager};
use crate::error::PlannerResult;
use crate::pattern::Variable;
use crate::plan::fragment::Fragment;
use crate::plan::trace::PlanTrace;
use crate::traversal::GraphTraversal;

/// The output of planning: ordered fragments for each conjunction of a
/// disjunctive pattern
#[derive(Debug, Clone)]
pub struct TraversalPlan {
    plans: Vec<Vec<Fragment>>,
    trace: Option<PlanTrace>,
}

impl TraversalPlan {
    pub fn new(plans: Vec<Vec<Fragment>>, trace: Option<PlanTrace>) -> Self {
        Self { plans, trace }
    }

    pub fn fragments(&self) -> &[Vec<Fragment>] {
        &self.plans
    }

    pub fn trace(&self) -> Option<&PlanTrace> {
        self.trace.as_ref()
    }

    /// Build the executable traversal
    ///
    /// A single conjunction yields its traversal directly; several are
    /// combined with a union, each branch starting from every vertex.
    pub fn graph_traversal(
        &self,
        concept_manager: &dyn ConceptManager,
    ) -> PlannerResult<GraphTraversal> {
        match self.plans.as_slice() {
            [] => Ok(GraphTraversal::new()),
            [plan] => conjunction_traversal(plan, concept_manager),
            plans => {
                let branches = plans
                    .iter()
                    .map(|plan| conjunction_traversal(plan, concept_manager))
                    .collect::<PlannerResult<Vec<_>>>()?;
                Ok(GraphTraversal::anonymous().union(branches))
            }
        }
    }

    /// A copy with concept ids substituted for bound variables. The trace
    /// describes the original plan and is dropped.
    pub fn transform(&self, ids: &HashMap<Variable, ConceptId>) -> TraversalPlan {
        let plans = self
            .plans
            .iter()
            .map(|plan| plan.iter().map(|fragment| fragment.transform(ids)).collect())
            .collect();
        TraversalPlan::new(plans, None)
    }
}

fn conjunction_traversal(
    plan: &[Fragment],
    concept_manager: &dyn ConceptManager,
) -> PlannerResult<GraphTraversal> {
    let mut traversal = GraphTraversal::new();
    let mut vars = BTreeSet::new();
    let mut current: Option<Variable> = None;
    for fragment in plan {
        traversal = fragment.apply_traversal(traversal, concept_manager, &mut vars, current.as_ref())?;
        current = Some(fragment.end().unwrap_or(fragment.start()).clone());
    }
    Ok(traversal)
}

impl fmt::Display for TraversalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conjunctions: Vec<String> = self
            .plans
            .iter()
            .map(|plan| {
                plan.iter()
                    .map(|fragment| fragment.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect();
        write!(f, "{{ {} }}", conjunctions.join(" } or { "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::{InMemoryConceptManager, Label};

    fn label(var: &str, label: &str) -> Fragment {
        Fragment::label(Variable::named(var), BTreeSet::from([Label::of(label)]))
    }

    #[test]
    fn test_display_lists_conjunctions() {
        let plan = TraversalPlan::new(
            vec![vec![label("x", "person")], vec![label("y", "company")]],
            None,
        );
        assert_eq!(
            plan.to_string(),
            "{ $x[label:person] } or { $y[label:company] }"
        );
    }

    #[test]
    fn test_disjunction_becomes_union() {
        let cm = InMemoryConceptManager::new()
            .with_entity_type("person")
            .with_entity_type("company");
        let plan = TraversalPlan::new(
            vec![vec![label("x", "person")], vec![label("y", "company")]],
            None,
        );
        let traversal = plan.graph_traversal(&cm).unwrap();
        assert!(traversal.to_string().starts_with("union(V()"));
    }

    #[test]
    fn test_empty_plan_is_fresh_traversal() {
        let cm = InMemoryConceptManager::new();
        let plan = TraversalPlan::new(Vec::new(), None);
        assert!(plan.graph_traversal(&cm).unwrap().is_fresh());
    }

    #[test]
    fn test_transform_drops_trace() {
        let plan = TraversalPlan::new(vec![vec![label("x", "person")]], None);
        let transformed = plan.transform(&HashMap::new());
        assert_eq!(transformed.fragments(), plan.fragments());
        assert!(transformed.trace().is_none());
    }
}
