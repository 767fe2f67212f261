// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Fragments: the atomic traversal steps a query compiles into
//!
//! Every declarative constraint becomes one or more interchangeable
//! fragments. A fragment knows which variables it starts and ends at, what it
//! costs, how it shows up in the planning graph, and which traversal steps it
//! appends when the executor runs it.

pub mod cost;
mod instance_fragments;
mod schema_fragments;

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::concept::schema::generate_attribute_index;
use crate::concept::{ConceptId, ConceptManager, KeyspaceStatistics, Label, ValueType};
use crate::error::{PlannerError, PlannerResult};
use crate::pattern::{SubDepth, ValuePredicate, Variable};
use crate::plan::spanning_tree::{DirectedEdge, Node, NodeArena, NodeId, NodeType, Weighted};
use crate::traversal::GraphTraversal;

use cost::*;

/// The physical edge behind a role-player fragment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RolePlayerEdge {
    /// Reserved variable naming the casting
    pub edge: Variable,
    pub role: Option<Variable>,
    /// Allowed role labels; `None` accepts any role
    pub role_labels: Option<BTreeSet<Label>>,
    /// Allowed relation type labels; `None` accepts any relation type
    pub relation_type_labels: Option<BTreeSet<Label>>,
}

impl RolePlayerEdge {
    pub fn new(edge: Variable, role: Option<Variable>) -> Self {
        Self {
            edge,
            role,
            role_labels: None,
            relation_type_labels: None,
        }
    }

    pub fn with_role_labels(mut self, labels: BTreeSet<Label>) -> Self {
        self.role_labels = Some(labels);
        self
    }

    pub fn with_relation_type_labels(mut self, labels: BTreeSet<Label>) -> Self {
        self.relation_type_labels = Some(labels);
        self
    }
}

/// The physical ownership edge behind an attribute fragment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeEdge {
    pub edge: Variable,
    /// Attribute types the attribute may belong to; empty accepts any
    pub attribute_labels: BTreeSet<Label>,
}

impl AttributeEdge {
    pub fn new(edge: Variable, attribute_labels: BTreeSet<Label>) -> Self {
        Self {
            edge,
            attribute_labels,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Label { labels: BTreeSet<Label> },
    Id { id: ConceptId },
    AttributeIndex { attribute_label: Label, value: String },
    Value { predicate: ValuePredicate },
    InIsa { may_have_edge_instances: bool },
    OutIsa { may_have_edge_instances: bool },
    InSub { depth: SubDepth },
    OutSub { depth: SubDepth },
    InPlays { required: bool },
    OutPlays { required: bool },
    InRelates,
    OutRelates,
    InHas,
    OutHas,
    InKey,
    OutKey,
    InRolePlayer(RolePlayerEdge),
    OutRolePlayer(RolePlayerEdge),
    InAttribute(AttributeEdge),
    OutAttribute(AttributeEdge),
    NotEqual { other: Variable },
    IsAbstract,
    Regex { regex: String },
    NotInternal,
    ValueType { value_type: ValueType },
}

/// One atomic traversal step
///
/// Equality and hashing are structural and ignore the accurate cost, which is
/// a planning-time annotation.
#[derive(Debug, Clone)]
pub struct Fragment {
    kind: FragmentKind,
    start: Variable,
    end: Option<Variable>,
    accurate_cost: Option<f64>,
}

impl PartialEq for Fragment {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.start == other.start && self.end == other.end
    }
}

impl Eq for Fragment {}

impl Hash for Fragment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.start.hash(state);
        self.end.hash(state);
    }
}

// Constructors
impl Fragment {
    fn node(kind: FragmentKind, start: Variable) -> Self {
        Self {
            kind,
            start,
            end: None,
            accurate_cost: None,
        }
    }

    fn edge(kind: FragmentKind, start: Variable, end: Variable) -> Self {
        Self {
            kind,
            start,
            end: Some(end),
            accurate_cost: None,
        }
    }

    pub fn label(start: Variable, labels: BTreeSet<Label>) -> Self {
        Self::node(FragmentKind::Label { labels }, start)
    }

    pub fn id(start: Variable, id: ConceptId) -> Self {
        Self::node(FragmentKind::Id { id }, start)
    }

    pub fn attribute_index(start: Variable, attribute_label: Label, value: impl Into<String>) -> Self {
        Self::node(
            FragmentKind::AttributeIndex {
                attribute_label,
                value: value.into(),
            },
            start,
        )
    }

    pub fn value(start: Variable, predicate: ValuePredicate) -> Self {
        Self::node(FragmentKind::Value { predicate }, start)
    }

    /// From a type to its instances
    pub fn in_isa(start: Variable, end: Variable, may_have_edge_instances: bool) -> Self {
        Self::edge(FragmentKind::InIsa { may_have_edge_instances }, start, end)
    }

    /// From an instance to its type
    pub fn out_isa(start: Variable, end: Variable, may_have_edge_instances: bool) -> Self {
        Self::edge(FragmentKind::OutIsa { may_have_edge_instances }, start, end)
    }

    /// From a type to its subtypes
    pub fn in_sub(start: Variable, end: Variable, depth: SubDepth) -> Self {
        Self::edge(FragmentKind::InSub { depth }, start, end)
    }

    /// From a type to its supertypes
    pub fn out_sub(start: Variable, end: Variable, depth: SubDepth) -> Self {
        Self::edge(FragmentKind::OutSub { depth }, start, end)
    }

    /// From a role to the types playing it
    pub fn in_plays(start: Variable, end: Variable, required: bool) -> Self {
        Self::edge(FragmentKind::InPlays { required }, start, end)
    }

    /// From a type to the roles it plays
    pub fn out_plays(start: Variable, end: Variable, required: bool) -> Self {
        Self::edge(FragmentKind::OutPlays { required }, start, end)
    }

    /// From a role to the relation types relating it
    pub fn in_relates(start: Variable, end: Variable) -> Self {
        Self::edge(FragmentKind::InRelates, start, end)
    }

    /// From a relation type to its roles
    pub fn out_relates(start: Variable, end: Variable) -> Self {
        Self::edge(FragmentKind::OutRelates, start, end)
    }

    /// From an attribute type to the types owning it
    pub fn in_has(start: Variable, end: Variable) -> Self {
        Self::edge(FragmentKind::InHas, start, end)
    }

    /// From a type to the attribute types it owns
    pub fn out_has(start: Variable, end: Variable) -> Self {
        Self::edge(FragmentKind::OutHas, start, end)
    }

    pub fn in_key(start: Variable, end: Variable) -> Self {
        Self::edge(FragmentKind::InKey, start, end)
    }

    pub fn out_key(start: Variable, end: Variable) -> Self {
        Self::edge(FragmentKind::OutKey, start, end)
    }

    /// From a role player to a relation it takes part in
    pub fn in_role_player(start: Variable, end: Variable, edge: RolePlayerEdge) -> Self {
        Self::edge(FragmentKind::InRolePlayer(edge), start, end)
    }

    /// From a relation to one of its role players
    pub fn out_role_player(start: Variable, end: Variable, edge: RolePlayerEdge) -> Self {
        Self::edge(FragmentKind::OutRolePlayer(edge), start, end)
    }

    /// From an attribute to its owners
    pub fn in_attribute(start: Variable, end: Variable, edge: AttributeEdge) -> Self {
        Self::edge(FragmentKind::InAttribute(edge), start, end)
    }

    /// From an owner to its attributes
    pub fn out_attribute(start: Variable, end: Variable, edge: AttributeEdge) -> Self {
        Self::edge(FragmentKind::OutAttribute(edge), start, end)
    }

    pub fn not_equal(start: Variable, other: Variable) -> Self {
        Self::node(FragmentKind::NotEqual { other }, start)
    }

    pub fn is_abstract(start: Variable) -> Self {
        Self::node(FragmentKind::IsAbstract, start)
    }

    pub fn regex(start: Variable, regex: impl Into<String>) -> Self {
        Self::node(FragmentKind::Regex { regex: regex.into() }, start)
    }

    pub fn not_internal(start: Variable) -> Self {
        Self::node(FragmentKind::NotInternal, start)
    }

    pub fn value_type(start: Variable, value_type: ValueType) -> Self {
        Self::node(FragmentKind::ValueType { value_type }, start)
    }
}

impl Fragment {
    pub fn kind(&self) -> &FragmentKind {
        &self.kind
    }

    pub fn start(&self) -> &Variable {
        &self.start
    }

    pub fn end(&self) -> Option<&Variable> {
        self.end.as_ref()
    }

    /// Extend `traversal` with this fragment
    ///
    /// `vars` holds every variable bound so far and is updated in place;
    /// `current_var` is where the traversal is positioned, `None` when it has
    /// not been positioned anywhere yet.
    pub fn apply_traversal(
        &self,
        mut traversal: GraphTraversal,
        concept_manager: &dyn ConceptManager,
        vars: &mut BTreeSet<Variable>,
        current_var: Option<&Variable>,
    ) -> PlannerResult<GraphTraversal> {
        if current_var != Some(&self.start) {
            if vars.contains(&self.start) {
                traversal = traversal.select(self.start.symbol());
            } else if traversal.is_fresh() {
                traversal = traversal.as_(self.start.symbol());
            } else {
                // disconnected from everything before it
                traversal = traversal.v().as_(self.start.symbol());
            }
        }
        vars.insert(self.start.clone());

        traversal = self.apply_traversal_inner(traversal, concept_manager, vars)?;

        if let Some(end) = &self.end {
            if vars.contains(end) {
                traversal = traversal.where_eq(end.symbol());
            } else {
                traversal = traversal.as_(end.symbol());
            }
        }

        vars.extend(self.vars());
        Ok(traversal)
    }

    fn apply_traversal_inner(
        &self,
        traversal: GraphTraversal,
        concept_manager: &dyn ConceptManager,
        vars: &BTreeSet<Variable>,
    ) -> PlannerResult<GraphTraversal> {
        use instance_fragments as instance;
        use schema_fragments as schema;

        let traversal = match &self.kind {
            FragmentKind::Label { labels } => schema::label(traversal, concept_manager, labels)?,
            FragmentKind::Id { id } => instance::id(traversal, id),
            FragmentKind::AttributeIndex {
                attribute_label,
                value,
            } => instance::attribute_index(traversal, attribute_label, value),
            FragmentKind::Value { predicate } => instance::value(traversal, predicate),
            FragmentKind::InIsa {
                may_have_edge_instances,
            } => instance::in_isa(traversal, &self.start, *may_have_edge_instances),
            FragmentKind::OutIsa { .. } => instance::out_isa(traversal, &self.start),
            FragmentKind::InSub { depth } => schema::in_subs(traversal, *depth),
            FragmentKind::OutSub { depth } => schema::out_subs(traversal, *depth),
            FragmentKind::InPlays { required } => schema::in_plays(traversal, *required),
            FragmentKind::OutPlays { required } => schema::out_plays(traversal, *required),
            FragmentKind::InRelates => schema::in_relates(traversal),
            FragmentKind::OutRelates => schema::out_relates(traversal),
            FragmentKind::InHas => schema::in_has(traversal, false),
            FragmentKind::OutHas => schema::out_has(traversal, false),
            FragmentKind::InKey => schema::in_has(traversal, true),
            FragmentKind::OutKey => schema::out_has(traversal, true),
            FragmentKind::InRolePlayer(edge) => {
                instance::in_role_player(traversal, concept_manager, edge, vars)?
            }
            FragmentKind::OutRolePlayer(edge) => {
                instance::out_role_player(traversal, concept_manager, edge, vars)?
            }
            FragmentKind::InAttribute(edge) => {
                instance::in_attribute(traversal, concept_manager, edge)?
            }
            FragmentKind::OutAttribute(edge) => {
                instance::out_attribute(traversal, concept_manager, edge)?
            }
            FragmentKind::NotEqual { other } => instance::not_equal(traversal, &self.start, other),
            FragmentKind::IsAbstract => schema::is_abstract(traversal),
            FragmentKind::Regex { regex } => schema::regex(traversal, regex),
            FragmentKind::NotInternal => schema::not_internal(traversal),
            FragmentKind::ValueType { value_type } => schema::value_type(traversal, *value_type),
        };
        Ok(traversal)
    }

    /// Short debugging name; never used for semantics
    pub fn name(&self) -> String {
        match &self.kind {
            FragmentKind::Label { labels } => format!("[label:{}]", join(labels)),
            FragmentKind::Id { id } => format!("[id:{}]", id),
            FragmentKind::AttributeIndex {
                attribute_label,
                value,
            } => format!(
                "[index:{}]",
                generate_attribute_index(attribute_label, value)
            ),
            FragmentKind::Value { predicate } => format!("[value:{}]", predicate),
            FragmentKind::InIsa {
                may_have_edge_instances: true,
            } => "<-[isa:with-edges]-".to_string(),
            FragmentKind::InIsa { .. } => "<-[isa]-".to_string(),
            FragmentKind::OutIsa { .. } => "-[isa]->".to_string(),
            FragmentKind::InSub { depth } => format!("<-[sub!{}]-", depth),
            FragmentKind::OutSub { depth } => format!("-[sub!{}]->", depth),
            FragmentKind::InPlays { required } => format!("<-[plays{}]-", required_suffix(*required)),
            FragmentKind::OutPlays { required } => format!("-[plays{}]->", required_suffix(*required)),
            FragmentKind::InRelates => "<-[relates]-".to_string(),
            FragmentKind::OutRelates => "-[relates]->".to_string(),
            FragmentKind::InHas => "<-[has]-".to_string(),
            FragmentKind::OutHas => "-[has]->".to_string(),
            FragmentKind::InKey => "<-[key]-".to_string(),
            FragmentKind::OutKey => "-[key]->".to_string(),
            FragmentKind::InRolePlayer(edge) => format!("<-[{}]-", role_player_name(edge)),
            FragmentKind::OutRolePlayer(edge) => format!("-[{}]->", role_player_name(edge)),
            FragmentKind::InAttribute(edge) => format!("<-[{}]-", attribute_name(edge)),
            FragmentKind::OutAttribute(edge) => format!("-[{}]->", attribute_name(edge)),
            FragmentKind::NotEqual { other } => format!("[neq:{}]", other),
            FragmentKind::IsAbstract => "[is-abstract]".to_string(),
            FragmentKind::Regex { regex } => format!("[regex:{}]", regex),
            FragmentKind::NotInternal => "[not-internal]".to_string(),
            FragmentKind::ValueType { value_type } => format!("[value-type:{}]", value_type.name()),
        }
    }

    /// The accurate cost when planning has recorded one, the heuristic otherwise
    pub fn fragment_cost(&self) -> f64 {
        self.accurate_cost
            .unwrap_or_else(|| self.internal_fragment_cost())
    }

    /// Record a statistics-derived cost. Only the first write takes effect.
    pub fn set_accurate_fragment_cost(&mut self, cost: f64) -> bool {
        if self.accurate_cost.is_some() {
            return false;
        }
        self.accurate_cost = Some(cost);
        true
    }

    pub fn accurate_fragment_cost(&self) -> Option<f64> {
        self.accurate_cost
    }

    pub fn internal_fragment_cost(&self) -> f64 {
        match &self.kind {
            FragmentKind::Label { .. } | FragmentKind::Id { .. } => *COST_NODE_INDEX,
            FragmentKind::AttributeIndex { .. } => *COST_NODE_INDEX,
            FragmentKind::Value { predicate } if predicate.is_value_equality() => {
                *COST_NODE_INDEX_VALUE
            }
            FragmentKind::Value { .. } => *COST_NODE_UNSPECIFIC_PREDICATE,
            FragmentKind::InIsa { .. } | FragmentKind::OutIsa { .. } => *COST_INSTANCES_PER_TYPE,
            FragmentKind::InSub { .. } | FragmentKind::OutSub { .. } => *COST_SAME_AS_PREVIOUS,
            FragmentKind::InPlays { .. } | FragmentKind::OutPlays { .. } => *COST_TYPES_PER_ROLE,
            FragmentKind::InRelates => *COST_RELATION_TYPES_PER_ROLE,
            FragmentKind::OutRelates => *COST_ROLES_PER_RELATION,
            FragmentKind::InHas | FragmentKind::InKey => *COST_TYPES_PER_ROLE,
            FragmentKind::OutHas | FragmentKind::OutKey => *COST_ROLES_PER_TYPE,
            FragmentKind::InRolePlayer(_) | FragmentKind::OutRolePlayer(_) => {
                *COST_RELATIONS_PER_INSTANCE
            }
            FragmentKind::InAttribute(_) => *COST_ROLE_PLAYERS_PER_ROLE,
            FragmentKind::OutAttribute(_) => *COST_RELATIONS_PER_INSTANCE,
            FragmentKind::NotEqual { .. } => *COST_NODE_NEQ,
            FragmentKind::IsAbstract => *COST_NODE_IS_ABSTRACT,
            FragmentKind::Regex { .. } => *COST_NODE_REGEX,
            FragmentKind::NotInternal => *COST_NODE_NOT_INTERNAL,
            FragmentKind::ValueType { .. } => *COST_NODE_DATA_TYPE,
        }
    }

    /// Whether this fragment is answered by an index and can start a plan
    pub fn has_fixed_fragment_cost(&self) -> bool {
        match &self.kind {
            FragmentKind::Label { .. }
            | FragmentKind::Id { .. }
            | FragmentKind::AttributeIndex { .. } => true,
            FragmentKind::Value { predicate } => {
                predicate.is_value_equality() && self.dependencies().is_empty()
            }
            _ => false,
        }
    }

    /// Estimated number of results when starting a plan here
    pub fn estimated_cost_as_starting_point(
        &self,
        concept_manager: &dyn ConceptManager,
        statistics: &dyn KeyspaceStatistics,
    ) -> PlannerResult<f64> {
        if !self.has_fixed_fragment_cost() {
            return Err(PlannerError::NotFixedCostStartingPoint(self.to_string()));
        }
        let estimate = match &self.kind {
            FragmentKind::Label { labels } => labels
                .iter()
                .map(|label| statistics.count(concept_manager, label) as f64)
                .sum(),
            FragmentKind::Id { .. } => COST_ID_AS_STARTING_POINT,
            FragmentKind::AttributeIndex {
                attribute_label, ..
            } => instance_fragments::attribute_index_estimate(
                concept_manager,
                statistics,
                attribute_label,
            ),
            FragmentKind::Value { .. } => {
                instance_fragments::value_estimate(concept_manager, statistics)
            }
            _ => return Err(PlannerError::NotFixedCostStartingPoint(self.to_string())),
        };
        Ok(estimate)
    }

    /// Variables that must be bound before this fragment runs
    pub fn dependencies(&self) -> BTreeSet<Variable> {
        match &self.kind {
            FragmentKind::NotEqual { other } => BTreeSet::from([other.clone()]),
            FragmentKind::Value { predicate } => {
                predicate.inner_variable().cloned().into_iter().collect()
            }
            _ => BTreeSet::new(),
        }
    }

    /// Every variable this fragment mentions
    pub fn vars(&self) -> BTreeSet<Variable> {
        let mut vars = BTreeSet::from([self.start.clone()]);
        vars.extend(self.end.iter().cloned());
        match &self.kind {
            FragmentKind::InRolePlayer(edge) | FragmentKind::OutRolePlayer(edge) => {
                vars.insert(edge.edge.clone());
                vars.extend(edge.role.iter().cloned());
            }
            FragmentKind::InAttribute(edge) | FragmentKind::OutAttribute(edge) => {
                vars.insert(edge.edge.clone());
            }
            _ => {}
        }
        vars.extend(self.dependencies());
        vars
    }

    /// The same constraint traversed the other way; node fragments return themselves
    pub fn get_inverse(&self) -> Fragment {
        let (Some(end), start) = (self.end.clone(), self.start.clone()) else {
            return match &self.kind {
                FragmentKind::NotEqual { other } => {
                    Fragment::not_equal(other.clone(), self.start.clone())
                }
                _ => self.clone(),
            };
        };
        let kind = match &self.kind {
            FragmentKind::InIsa {
                may_have_edge_instances,
            } => FragmentKind::OutIsa {
                may_have_edge_instances: *may_have_edge_instances,
            },
            FragmentKind::OutIsa {
                may_have_edge_instances,
            } => FragmentKind::InIsa {
                may_have_edge_instances: *may_have_edge_instances,
            },
            FragmentKind::InSub { depth } => FragmentKind::OutSub { depth: *depth },
            FragmentKind::OutSub { depth } => FragmentKind::InSub { depth: *depth },
            FragmentKind::InPlays { required } => FragmentKind::OutPlays {
                required: *required,
            },
            FragmentKind::OutPlays { required } => FragmentKind::InPlays {
                required: *required,
            },
            FragmentKind::InRelates => FragmentKind::OutRelates,
            FragmentKind::OutRelates => FragmentKind::InRelates,
            FragmentKind::InHas => FragmentKind::OutHas,
            FragmentKind::OutHas => FragmentKind::InHas,
            FragmentKind::InKey => FragmentKind::OutKey,
            FragmentKind::OutKey => FragmentKind::InKey,
            FragmentKind::InRolePlayer(edge) => FragmentKind::OutRolePlayer(edge.clone()),
            FragmentKind::OutRolePlayer(edge) => FragmentKind::InRolePlayer(edge.clone()),
            FragmentKind::InAttribute(edge) => FragmentKind::OutAttribute(edge.clone()),
            FragmentKind::OutAttribute(edge) => FragmentKind::InAttribute(edge.clone()),
            _ => return self.clone(),
        };
        Fragment::edge(kind, end, start)
    }

    /// A copy with concept ids substituted for the variables in `ids`
    pub fn transform(&self, ids: &HashMap<Variable, ConceptId>) -> Fragment {
        match (&self.kind, ids.get(&self.start)) {
            (FragmentKind::Id { .. }, Some(id)) => {
                let mut transformed = Fragment::id(self.start.clone(), id.clone());
                transformed.accurate_cost = self.accurate_cost;
                transformed
            }
            _ => self.clone(),
        }
    }

    /// Deterministic ordering key, readable first
    ///
    /// The display name drops payloads such as the isa edge flag and label
    /// separators, so the structural form follows it; equal keys mean equal
    /// fragments.
    pub fn sort_key(&self) -> String {
        format!("{}|{:?}|{:?}|{:?}", self, self.kind, self.start, self.end)
    }

    /// The planning-graph nodes this fragment touches
    pub fn get_nodes(&self) -> Vec<Node> {
        let mut nodes = vec![self.start_node()];
        if let Some(end) = &self.end {
            nodes.push(self.end_node(end));
        }
        if let Some(middle) = self.middle_node_id() {
            nodes.push(Node::middle(middle));
        }
        nodes
    }

    /// Start to middle at the negated fragment cost, middle to end for free
    ///
    /// Every node returned by [`Fragment::get_nodes`] must already be in
    /// `arena`.
    pub fn directed_edges(&self, arena: &NodeArena) -> PlannerResult<Vec<Weighted<DirectedEdge>>> {
        let (Some(end), Some(middle)) = (&self.end, self.middle_node_id()) else {
            return Ok(Vec::new());
        };
        let start = node_index(arena, &NodeId::var(&self.start))?;
        let middle = node_index(arena, &middle)?;
        let end = node_index(arena, &NodeId::var(end))?;
        Ok(vec![
            Weighted::new(DirectedEdge::new(start, middle), -self.fragment_cost()),
            Weighted::new(DirectedEdge::new(middle, end), 0.0),
        ])
    }

    /// The synthetic node standing for this fragment's graph-native edge
    pub fn middle_node_id(&self) -> Option<NodeId> {
        let end = self.end.as_ref()?;
        let node_type = match &self.kind {
            FragmentKind::InIsa { .. } | FragmentKind::OutIsa { .. } => NodeType::Isa,
            FragmentKind::InSub { .. } | FragmentKind::OutSub { .. } => NodeType::Sub,
            FragmentKind::InPlays { .. } | FragmentKind::OutPlays { .. } => NodeType::Plays,
            FragmentKind::InRelates | FragmentKind::OutRelates => NodeType::Relates,
            FragmentKind::InHas | FragmentKind::OutHas => NodeType::Has,
            FragmentKind::InKey | FragmentKind::OutKey => NodeType::Key,
            FragmentKind::InRolePlayer(edge) | FragmentKind::OutRolePlayer(edge) => {
                return Some(NodeId::edge_instance(NodeType::RolePlayer, &edge.edge));
            }
            FragmentKind::InAttribute(edge) | FragmentKind::OutAttribute(edge) => {
                return Some(NodeId::edge_instance(NodeType::Attribute, &edge.edge));
            }
            _ => return None,
        };
        Some(NodeId::edge(node_type, &self.start, end))
    }

    fn start_node(&self) -> Node {
        match &self.kind {
            FragmentKind::Id { .. } => Node::id_node(&self.start),
            FragmentKind::Label { .. }
            | FragmentKind::InIsa { .. }
            | FragmentKind::InSub { .. }
            | FragmentKind::OutSub { .. }
            | FragmentKind::InPlays { .. }
            | FragmentKind::OutPlays { .. }
            | FragmentKind::InRelates
            | FragmentKind::OutRelates
            | FragmentKind::InHas
            | FragmentKind::OutHas
            | FragmentKind::InKey
            | FragmentKind::OutKey
            | FragmentKind::IsAbstract
            | FragmentKind::Regex { .. }
            | FragmentKind::ValueType { .. } => Node::schema(&self.start),
            _ => Node::instance(&self.start),
        }
    }

    fn end_node(&self, end: &Variable) -> Node {
        match &self.kind {
            FragmentKind::InIsa { .. }
            | FragmentKind::InRolePlayer(_)
            | FragmentKind::OutRolePlayer(_)
            | FragmentKind::InAttribute(_)
            | FragmentKind::OutAttribute(_) => Node::instance(end),
            _ => Node::schema(end),
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.start, self.name())?;
        if let Some(end) = &self.end {
            write!(f, "{}", end)?;
        }
        Ok(())
    }
}

fn node_index(arena: &NodeArena, id: &NodeId) -> PlannerResult<usize> {
    arena
        .get(id)
        .ok_or_else(|| PlannerError::Internal(format!("node {} missing from planning graph", id)))
}

fn join(labels: &BTreeSet<Label>) -> String {
    labels
        .iter()
        .map(|label| label.value())
        .collect::<Vec<_>>()
        .join(",")
}

fn required_suffix(required: bool) -> &'static str {
    if required {
        ":required"
    } else {
        ""
    }
}

fn role_player_name(edge: &RolePlayerEdge) -> String {
    let mut name = format!("role-player:{}", edge.edge);
    if let Some(role) = &edge.role {
        name.push_str(&format!(" role:{}", role));
    }
    if let Some(labels) = &edge.role_labels {
        name.push_str(&format!(" roles:{}", join(labels)));
    }
    if let Some(labels) = &edge.relation_type_labels {
        name.push_str(&format!(" rels:{}", join(labels)));
    }
    name
}

fn attribute_name(edge: &AttributeEdge) -> String {
    if edge.attribute_labels.is_empty() {
        format!("attribute:{}", edge.edge)
    } else {
        format!("attribute:{} labels:{}", edge.edge, join(&edge.attribute_labels))
    }
}
