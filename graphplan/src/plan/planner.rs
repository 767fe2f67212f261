// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cost-based ordering of fragments
//!
//! Fragments are split into connected sets. For each set the planner builds a
//! planning graph (see [`Fragment::directed_edges`]), roots a maximum-weight
//! arborescence at one of the most selective index-backed fragments, and walks
//! it greedily, cheapest branch first. Walking onto a middle node places the
//! edge fragment that led there; reaching a variable places its filters.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, trace, warn};
use petgraph::unionfind::UnionFind;

use crate::cache::{PlanCache, PlanCacheKey};
use crate::concept::{ConceptManager, KeyspaceStatistics, Label};
use crate::config::PlannerConfig;
use crate::error::{PlannerError, PlannerResult};
use crate::pattern::{Pattern, Variable};
use crate::plan::equivalent::ConjunctionQuery;
use crate::plan::fragment::{Fragment, FragmentKind};
use crate::plan::spanning_tree::{
    Arborescence, ChuLiuEdmonds, NodeArena, NodeId, SparseWeightedGraph, Weighted,
};
use crate::plan::trace::{PlanTracer, PlanningPhase, TraceMetadata};
use crate::plan::traversal_plan::TraversalPlan;

/// Compiles patterns into traversal plans
pub struct TraversalPlanner<'a> {
    concept_manager: &'a dyn ConceptManager,
    statistics: &'a dyn KeyspaceStatistics,
    config: PlannerConfig,
}

impl<'a> TraversalPlanner<'a> {
    pub fn new(
        concept_manager: &'a dyn ConceptManager,
        statistics: &'a dyn KeyspaceStatistics,
        config: PlannerConfig,
    ) -> Self {
        Self {
            concept_manager,
            statistics,
            config,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan every conjunction of `pattern`
    pub fn create_traversal(&self, pattern: &Pattern) -> PlannerResult<TraversalPlan> {
        let mut tracer = PlanTracer::new();
        let mut plans = Vec::with_capacity(pattern.conjunctions.len());
        for (i, conjunction) in pattern.conjunctions.iter().enumerate() {
            tracer.start_step();
            let query = ConjunctionQuery::new(
                conjunction,
                self.concept_manager,
                self.config.infer_relation_types,
            )?;
            let fragments = query.fragments();
            tracer.end_step(
                PlanningPhase::FragmentGeneration,
                format!("conjunction {}", i + 1),
                TraceMetadata {
                    fragment_count: Some(fragments.len()),
                    variables_in_scope: query.vars().iter().map(|v| v.to_string()).collect(),
                    ..Default::default()
                },
            );
            plans.push(self.plan_traced(fragments, &mut tracer)?);
        }
        debug!(
            "Planned {} conjunction(s) in {:?}",
            plans.len(),
            tracer.elapsed()
        );
        let trace = tracer.finalize(&plans);
        Ok(TraversalPlan::new(plans, Some(trace)))
    }

    /// Like [`TraversalPlanner::create_traversal`], reusing plans compiled
    /// for the same pattern against the same schema version
    pub fn create_traversal_cached(
        &self,
        pattern: &Pattern,
        cache: &PlanCache,
        schema_version: u64,
    ) -> PlannerResult<Arc<TraversalPlan>> {
        if !self.config.plan_cache.enabled {
            return self.create_traversal(pattern).map(Arc::new);
        }
        let key = PlanCacheKey::new(pattern, schema_version, &self.config);
        if let Some(plan) = cache.get(&key) {
            debug!("Plan cache hit for pattern {:x}", key.pattern_hash);
            return Ok(plan);
        }
        let start = Instant::now();
        let plan = Arc::new(self.create_traversal(pattern)?);
        cache.insert(key, plan.clone(), start.elapsed());
        Ok(plan)
    }

    /// Order the fragments of one conjunction
    ///
    /// The result holds one fragment per equivalent set, every fragment after
    /// the variables it depends on, and is the same for the same input.
    pub fn plan_for_conjunction(&self, fragments: Vec<Fragment>) -> PlannerResult<Vec<Fragment>> {
        self.plan_traced(fragments, &mut PlanTracer::new())
    }

    fn plan_traced(
        &self,
        mut fragments: Vec<Fragment>,
        tracer: &mut PlanTracer,
    ) -> PlannerResult<Vec<Fragment>> {
        fragments.sort_by_cached_key(|fragment| fragment.sort_key());
        fragments.dedup();

        tracer.start_step();
        let components = connected_components(fragments);
        tracer.end_step(
            PlanningPhase::ComponentSplitting,
            format!("{} connected fragment set(s)", components.len()),
            TraceMetadata::default(),
        );

        let mut plan = Vec::new();
        for component in components {
            plan.extend(ComponentPlanner::new(self, component)?.plan(tracer)?);
        }

        trace!(
            "Plan: {}",
            plan.iter()
                .map(|fragment| fragment.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(plan)
    }

    /// Log of the expected number of instances of the labelled types,
    /// counting subtypes, kept away from ln(0) by the shard load factor
    fn log_instance_count(&self, labels: &BTreeSet<Label>) -> f64 {
        let count: u64 = labels
            .iter()
            .flat_map(|label| self.concept_manager.subs(label))
            .map(|label| self.statistics.count(self.concept_manager, &label))
            .sum();
        let threshold = self.config.sharding_threshold.max(1) as f64;
        let estimate = (count as f64 / threshold + self.config.shard_load_factor) * threshold;
        if estimate > 0.0 {
            estimate.ln()
        } else {
            -1.0
        }
    }
}

/// Group fragments that share variables, in order of first appearance
fn connected_components(fragments: Vec<Fragment>) -> Vec<Vec<Fragment>> {
    let mut indices: BTreeMap<Variable, usize> = BTreeMap::new();
    for fragment in &fragments {
        for var in fragment.vars() {
            let next = indices.len();
            indices.entry(var).or_insert(next);
        }
    }

    let mut union_find = UnionFind::<usize>::new(indices.len());
    for fragment in &fragments {
        let vars: Vec<usize> = fragment
            .vars()
            .iter()
            .filter_map(|var| indices.get(var).copied())
            .collect();
        for pair in vars.windows(2) {
            union_find.union(pair[0], pair[1]);
        }
    }

    let mut groups: Vec<Vec<Fragment>> = Vec::new();
    let mut group_of: BTreeMap<usize, usize> = BTreeMap::new();
    for fragment in fragments {
        let Some(&var) = indices.get(fragment.start()) else {
            continue;
        };
        let representative = union_find.find(var);
        let group = *group_of.entry(representative).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[group].push(fragment);
    }
    groups
}

/// Planning state for one connected fragment set
struct ComponentPlanner<'p, 'a> {
    planner: &'p TraversalPlanner<'a>,
    fragments: Vec<Fragment>,
    inverses: Vec<Option<usize>>,
    arena: NodeArena,
    /// Filters without dependencies, by the node they apply to
    node_fragments: BTreeMap<usize, Vec<usize>>,
    /// Edge fragments by (middle node, node they leave from). Fragments that
    /// differ only in payload, such as sub depth, share a key.
    edge_fragments: BTreeMap<(usize, usize), Vec<usize>>,
    dependent_fragments: Vec<usize>,
    done: Vec<bool>,
    plan: Vec<usize>,
    bound: BTreeSet<Variable>,
}

impl<'p, 'a> ComponentPlanner<'p, 'a> {
    fn new(planner: &'p TraversalPlanner<'a>, fragments: Vec<Fragment>) -> PlannerResult<Self> {
        let mut arena = NodeArena::new();
        for fragment in &fragments {
            for node in fragment.get_nodes() {
                arena.add(node);
            }
        }

        let mut node_fragments: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        let mut edge_fragments: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();
        let mut dependent_fragments = Vec::new();
        for (i, fragment) in fragments.iter().enumerate() {
            let start = node_index(&arena, fragment.start())?;
            if let Some(middle) = fragment.middle_node_id() {
                let middle = arena
                    .get(&middle)
                    .ok_or_else(|| missing_node(&middle))?;
                edge_fragments.entry((middle, start)).or_default().push(i);
            } else if !fragment.dependencies().is_empty() {
                dependent_fragments.push(i);
            } else {
                node_fragments.entry(start).or_default().push(i);
            }
        }

        let inverses = fragments
            .iter()
            .map(|fragment| {
                let inverse = fragment.get_inverse();
                if inverse == *fragment {
                    None
                } else {
                    fragments.iter().position(|other| *other == inverse)
                }
            })
            .collect();

        let count = fragments.len();
        Ok(Self {
            planner,
            fragments,
            inverses,
            arena,
            node_fragments,
            edge_fragments,
            dependent_fragments,
            done: vec![false; count],
            plan: Vec::with_capacity(count),
            bound: BTreeSet::new(),
        })
    }

    fn plan(mut self, tracer: &mut PlanTracer) -> PlannerResult<Vec<Fragment>> {
        debug!(
            "Planning {} fragments over {} nodes",
            self.fragments.len(),
            self.arena.len()
        );

        tracer.start_step();
        self.apply_accurate_costs()?;
        tracer.end_step(
            PlanningPhase::CostEstimation,
            "instance counts of indexed types".to_string(),
            TraceMetadata {
                fragment_count: Some(self.fragments.len()),
                ..Default::default()
            },
        );

        tracer.start_step();
        let graph = self.build_graph()?;
        let roots = self.starting_nodes(&graph)?;
        let tree = self.best_arborescence(&graph, &roots);
        tracer.end_step(
            PlanningPhase::ArborescenceSelection,
            format!("{} candidate root(s)", roots.len()),
            TraceMetadata {
                starting_points: roots.iter().map(|root| self.node_name(*root)).collect(),
                tree_weight: tree.as_ref().map(|tree| tree.weight),
                ..Default::default()
            },
        );

        tracer.start_step();
        if let Some(tree) = tree {
            self.greedy_traversal(&tree.val);
        }
        while self.plan_remaining_edges()? || self.plan_isolated_node() {}
        let unplaced_fragments = self.append_leftovers();
        tracer.end_step(
            PlanningPhase::Ordering,
            format!("{} fragment(s) ordered", self.plan.len()),
            TraceMetadata {
                variables_in_scope: self
                    .bound
                    .iter()
                    .filter(|var| var.is_user_defined())
                    .map(|var| var.to_string())
                    .collect(),
                unplaced_fragments,
                ..Default::default()
            },
        );

        let Self {
            fragments, plan, ..
        } = self;
        Ok(plan.into_iter().map(|i| fragments[i].clone()).collect())
    }

    /// Record statistics-derived costs on isa fragments leaving indexed types
    fn apply_accurate_costs(&mut self) -> PlannerResult<()> {
        let mut fixed_costs: BTreeMap<usize, f64> = BTreeMap::new();
        for fragment in &self.fragments {
            if fragment.end().is_some() || !fragment.has_fixed_fragment_cost() {
                continue;
            }
            let node = node_index(&self.arena, fragment.start())?;
            let estimate = match fragment.kind() {
                FragmentKind::Label { labels } => self.planner.log_instance_count(labels),
                _ => -1.0,
            };
            let entry = fixed_costs.entry(node).or_insert(estimate);
            *entry = entry.max(estimate);
        }

        // subtypes reached from an indexed type are as good as indexed
        loop {
            let mut changed = false;
            for fragment in &self.fragments {
                let (FragmentKind::InSub { .. }, Some(end)) = (fragment.kind(), fragment.end())
                else {
                    continue;
                };
                let supertype = node_index(&self.arena, fragment.start())?;
                let subtype = node_index(&self.arena, end)?;
                if let Some(&cost) = fixed_costs.get(&supertype) {
                    if cost > 0.0 && !fixed_costs.contains_key(&subtype) {
                        fixed_costs.insert(subtype, cost);
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }

        for i in 0..self.fragments.len() {
            if !matches!(self.fragments[i].kind(), FragmentKind::InIsa { .. }) {
                continue;
            }
            let node = node_index(&self.arena, self.fragments[i].start())?;
            if let Some(&cost) = fixed_costs.get(&node) {
                if cost > 0.0 {
                    self.fragments[i].set_accurate_fragment_cost(cost);
                }
            }
        }
        Ok(())
    }

    /// The planning graph of every edge fragment not yet placed
    fn build_graph(&self) -> PlannerResult<SparseWeightedGraph> {
        let mut graph = SparseWeightedGraph::new();
        for &i in self.edge_fragments.values().flatten() {
            if self.done[i] {
                continue;
            }
            for edge in self.fragments[i].directed_edges(&self.arena)? {
                graph.add_edge(edge);
            }
        }
        Ok(graph)
    }

    /// Roots to try, most promising first
    ///
    /// Index-backed fragments ranked by their estimate, preferring those that
    /// do not label implicit types; every valid node when there are none.
    fn starting_nodes(&self, graph: &SparseWeightedGraph) -> PlannerResult<Vec<usize>> {
        let mut high_priority = Vec::new();
        let mut low_priority = Vec::new();
        for (i, fragment) in self.fragments.iter().enumerate() {
            if self.done[i] || fragment.end().is_some() || !fragment.has_fixed_fragment_cost() {
                continue;
            }
            let node = node_index(&self.arena, fragment.start())?;
            if !graph.contains_node(node) {
                continue;
            }
            let estimate = fragment.estimated_cost_as_starting_point(
                self.planner.concept_manager,
                self.planner.statistics,
            )?;
            if self.labels_implicit_type(fragment) {
                low_priority.push((estimate, i, node));
            } else {
                high_priority.push((estimate, i, node));
            }
        }

        let mut candidates = if high_priority.is_empty() {
            low_priority
        } else {
            high_priority
        };
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut roots: Vec<usize> = Vec::new();
        for (_, _, node) in candidates {
            if !roots.contains(&node) {
                roots.push(node);
            }
        }
        roots.truncate(self.planner.config.max_starting_points.max(1));

        if roots.is_empty() {
            roots = graph
                .nodes()
                .into_iter()
                .filter(|node| {
                    self.arena
                        .node(*node)
                        .map(|node| node.is_valid_starting_point())
                        .unwrap_or(false)
                })
                .collect();
        }
        Ok(roots)
    }

    fn labels_implicit_type(&self, fragment: &Fragment) -> bool {
        let FragmentKind::Label { labels } = fragment.kind() else {
            return false;
        };
        labels.iter().all(|label| {
            self.planner
                .concept_manager
                .get_type(label)
                .map(|concept| concept.is_implicit)
                .unwrap_or(false)
        })
    }

    /// Widest, then heaviest, arborescence over the candidate roots; the
    /// earlier root wins ties
    fn best_arborescence(
        &self,
        graph: &SparseWeightedGraph,
        roots: &[usize],
    ) -> Option<Weighted<Arborescence>> {
        let mut best: Option<Weighted<Arborescence>> = None;
        for &root in roots {
            let Some(tree) = ChuLiuEdmonds::max_arborescence(graph, root) else {
                continue;
            };
            debug!(
                "Arborescence rooted at {} spans {} nodes with weight {:.3}",
                self.node_name(root),
                tree.val.node_count(),
                tree.weight
            );
            let better = best.as_ref().map_or(true, |current| {
                let (size, best_size) = (tree.val.node_count(), current.val.node_count());
                size > best_size || (size == best_size && tree.weight > current.weight)
            });
            if better {
                best = Some(tree);
            }
        }
        best
    }

    /// Visit the tree from its root, always expanding the cheapest branch next
    fn greedy_traversal(&mut self, tree: &Arborescence) {
        let mut branch_weights = BTreeMap::new();
        self.branch_weight(tree.root(), tree, &mut branch_weights);

        let weight = |node: &usize| branch_weights.get(node).copied().unwrap_or(0.0);
        let mut reachable = BTreeSet::from([tree.root()]);
        loop {
            let next = reachable
                .iter()
                .copied()
                .min_by(|a, b| weight(a).total_cmp(&weight(b)).then(a.cmp(b)));
            let Some(next) = next else {
                break;
            };
            reachable.remove(&next);
            self.visit(next, tree.parent(next));
            reachable.extend(tree.children(next));
        }
    }

    fn branch_weight(
        &self,
        node: usize,
        tree: &Arborescence,
        memo: &mut BTreeMap<usize, f64>,
    ) -> f64 {
        if let Some(weight) = memo.get(&node) {
            return *weight;
        }
        let mut weight = self.node_weight(node, tree.parent(node));
        for child in tree.children(node) {
            weight += self.branch_weight(child, tree, memo);
        }
        memo.insert(node, weight);
        weight
    }

    /// Cost of the edge into `node` plus the filters on it
    fn node_weight(&self, node: usize, parent: Option<usize>) -> f64 {
        let edge_cost: f64 = parent
            .and_then(|parent| self.edge_fragments.get(&(node, parent)))
            .into_iter()
            .flatten()
            .filter(|&&i| !self.done[i])
            .map(|&i| self.fragments[i].fragment_cost())
            .sum();
        let filter_cost: f64 = self
            .node_fragments
            .get(&node)
            .into_iter()
            .flatten()
            .filter(|&&i| !self.done[i])
            .map(|&i| self.fragments[i].fragment_cost())
            .sum();
        edge_cost + filter_cost
    }

    fn visit(&mut self, node: usize, parent: Option<usize>) {
        if let Some(parent) = parent {
            let mut pending: Vec<usize> = self
                .edge_fragments
                .get(&(node, parent))
                .into_iter()
                .flatten()
                .copied()
                .filter(|&i| !self.done[i])
                .collect();
            self.sort_by_cost(&mut pending);
            for i in pending {
                self.place(i);
            }
        }
        self.place_node_fragments(node);
    }

    /// Place a node's filters, cheapest first
    fn place_node_fragments(&mut self, node: usize) {
        let mut pending: Vec<usize> = self
            .node_fragments
            .get(&node)
            .into_iter()
            .flatten()
            .copied()
            .filter(|&i| !self.done[i])
            .collect();
        self.sort_by_cost(&mut pending);
        for i in pending {
            self.place(i);
        }
    }

    /// Cheapest first; the sorted input order breaks ties
    fn sort_by_cost(&self, indices: &mut [usize]) {
        indices.sort_by(|a, b| {
            self.fragments[*a]
                .fragment_cost()
                .total_cmp(&self.fragments[*b].fragment_cost())
                .then(a.cmp(b))
        });
    }

    /// Append a fragment to the plan, retire its inverse, and place every
    /// dependent fragment that became runnable
    fn place(&mut self, i: usize) {
        if self.done[i] {
            return;
        }
        self.done[i] = true;
        if let Some(inverse) = self.inverses[i] {
            self.done[inverse] = true;
        }
        self.bound.extend(self.fragments[i].vars());
        self.plan.push(i);

        loop {
            let ready = self.dependent_fragments.iter().copied().find(|&d| {
                let fragment = &self.fragments[d];
                !self.done[d]
                    && self.bound.contains(fragment.start())
                    && fragment.dependencies().is_subset(&self.bound)
            });
            match ready {
                Some(d) => self.place(d),
                None => break,
            }
        }
    }

    /// Plan edge fragments the first tree did not reach, rooted at a bound
    /// node when possible. Returns whether anything was placed.
    fn plan_remaining_edges(&mut self) -> PlannerResult<bool> {
        let graph = self.build_graph()?;
        if graph.edges().is_empty() {
            return Ok(false);
        }
        let bound_roots: Vec<usize> = graph
            .nodes()
            .into_iter()
            .filter(|node| {
                self.arena
                    .node(*node)
                    .and_then(|node| node.id().as_var())
                    .map(|var| self.bound.contains(var))
                    .unwrap_or(false)
            })
            .collect();
        let spanning = |roots: &[usize]| {
            self.best_arborescence(&graph, roots)
                .filter(|tree| tree.val.node_count() > 1)
        };
        let mut tree = spanning(&bound_roots);
        if tree.is_none() {
            tree = spanning(&self.starting_nodes(&graph)?);
        }
        if tree.is_none() {
            tree = spanning(&graph.nodes().into_iter().collect::<Vec<_>>());
        }
        let Some(tree) = tree else {
            return Ok(false);
        };
        let placed = self.plan.len();
        self.greedy_traversal(&tree.val);
        Ok(self.plan.len() > placed)
    }

    /// Place the filters of one node no edge leads to. Bound nodes go first,
    /// then nodes with an index-backed filter.
    fn plan_isolated_node(&mut self) -> bool {
        let pending: Vec<usize> = self
            .node_fragments
            .iter()
            .filter(|(_, fragments)| fragments.iter().any(|&i| !self.done[i]))
            .map(|(&node, _)| node)
            .collect();
        let is_bound = |node: &usize| {
            self.arena
                .node(*node)
                .and_then(|node| node.id().as_var())
                .map(|var| self.bound.contains(var))
                .unwrap_or(false)
        };
        let is_indexed = |node: &usize| {
            self.node_fragments.get(node).into_iter().flatten().any(|&i| {
                !self.done[i] && self.fragments[i].has_fixed_fragment_cost()
            })
        };
        let next = pending
            .iter()
            .copied()
            .find(|node| is_bound(node))
            .or_else(|| pending.iter().copied().find(|node| is_indexed(node)))
            .or_else(|| pending.first().copied());
        match next {
            Some(node) => {
                self.place_node_fragments(node);
                true
            }
            None => false,
        }
    }

    /// Place whatever the graph walk missed. Returns the fragments placed.
    fn append_leftovers(&mut self) -> Vec<String> {
        let leftovers: Vec<usize> = (0..self.fragments.len())
            .filter(|&i| !self.done[i])
            .collect();
        if leftovers.is_empty() {
            return Vec::new();
        }
        warn!(
            "Appending fragments the planner could not place: {}",
            leftovers
                .iter()
                .map(|&i| self.fragments[i].to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        let mut unplaced = Vec::with_capacity(leftovers.len());
        for i in leftovers {
            // an earlier leftover may have retired this one as its inverse
            if !self.done[i] {
                unplaced.push(self.fragments[i].to_string());
                self.place(i);
            }
        }
        unplaced
    }

    fn node_name(&self, node: usize) -> String {
        self.arena
            .node(node)
            .map(|node| node.id().to_string())
            .unwrap_or_default()
    }
}

fn node_index(arena: &NodeArena, var: &Variable) -> PlannerResult<usize> {
    let id = NodeId::var(var);
    arena.get(&id).ok_or_else(|| missing_node(&id))
}

fn missing_node(id: &NodeId) -> PlannerError {
    PlannerError::Internal(format!("node {} missing from planning graph", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::{InMemoryConceptManager, InMemoryStatistics, ValueType};
    use crate::pattern::SubDepth;

    fn var(name: &str) -> Variable {
        Variable::named(name)
    }

    fn label(name: &str, label: &str) -> Fragment {
        Fragment::label(var(name), BTreeSet::from([Label::of(label)]))
    }

    fn schema() -> InMemoryConceptManager {
        InMemoryConceptManager::new()
            .with_entity_type("person")
            .with_entity_type("employee")
            .with_supertype("employee", "person")
            .with_attribute_type("name", ValueType::String)
            .with_has("person", "name")
    }

    #[test]
    fn test_components_split_on_shared_variables() {
        let components = connected_components(vec![
            label("a", "person"),
            Fragment::in_isa(var("a"), var("x"), false),
            label("b", "person"),
        ]);
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].len(), 2);
    }

    #[test]
    fn test_starts_from_label_and_picks_one_direction() {
        let cm = schema();
        let stats = InMemoryStatistics::new().with_count("person", 100);
        let planner = TraversalPlanner::new(&cm, &stats, PlannerConfig::minimal());
        let isa = Fragment::out_isa(var("x"), var("t"), false);
        let plan = planner
            .plan_for_conjunction(vec![label("t", "person"), isa.clone(), isa.get_inverse()])
            .unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0], label("t", "person"));
        assert_eq!(plan[1], isa.get_inverse());
    }

    #[test]
    fn test_in_isa_from_indexed_type_gets_accurate_cost() {
        let cm = schema();
        let stats = InMemoryStatistics::new()
            .with_count("person", 20_000)
            .with_count("employee", 10_000);
        let planner = TraversalPlanner::new(&cm, &stats, PlannerConfig::minimal());
        let sub = Fragment::out_sub(var("d"), var("t"), SubDepth::Unlimited);
        let isa = Fragment::out_isa(var("x"), var("d"), false);
        let plan = planner
            .plan_for_conjunction(vec![
                label("t", "person"),
                sub.clone(),
                sub.get_inverse(),
                isa.clone(),
                isa.get_inverse(),
            ])
            .unwrap();
        let in_isa = plan
            .iter()
            .find(|f| matches!(f.kind(), FragmentKind::InIsa { .. }))
            .unwrap();
        let expected = ((30_000f64 / 10_000f64 + 0.25) * 10_000f64).ln();
        assert_eq!(in_isa.accurate_fragment_cost(), Some(expected));
    }

    #[test]
    fn test_empty_conjunction_plans_nothing() {
        let cm = schema();
        let stats = InMemoryStatistics::new();
        let planner = TraversalPlanner::new(&cm, &stats, PlannerConfig::default());
        assert!(planner.plan_for_conjunction(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_node_only_component_is_planned() {
        let cm = schema();
        let stats = InMemoryStatistics::new();
        let planner = TraversalPlanner::new(&cm, &stats, PlannerConfig::minimal());
        let plan = planner
            .plan_for_conjunction(vec![Fragment::is_abstract(var("t")), label("t", "person")])
            .unwrap();
        assert_eq!(plan[0], label("t", "person"));
        assert_eq!(plan.len(), 2);
    }
}
