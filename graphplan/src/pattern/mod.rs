// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Declarative graph patterns consumed by the planner
//!
//! A [`Pattern`] arrives in disjunctive normal form: a list of
//! [`Conjunction`]s, each a list of [`Statement`]s binding one variable to a
//! set of [`Property`] constraints. Parsing the query text into this shape
//! happens upstream.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::concept::{ConceptId, Label, ValueType};

/// Whether a variable was written by the user or generated by the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VariableKind {
    User,
    Reserved,
}

/// A position in a query pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    kind: VariableKind,
}

impl Variable {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::User,
        }
    }

    /// A system-generated variable with a caller-chosen, deterministic name
    pub fn reserved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Reserved,
        }
    }

    /// Name used to label this variable inside a traversal
    pub fn symbol(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    pub fn is_user_defined(&self) -> bool {
        self.kind == VariableKind::User
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.name)
    }
}

/// A literal attribute value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    String(String),
    Long(i64),
    Double(f64),
    Boolean(bool),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::String(_) => ValueType::String,
            Value::Long(_) => ValueType::Long,
            Value::Double(_) => ValueType::Double,
            Value::Boolean(_) => ValueType::Boolean,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::String(_) => 0,
            Value::Long(_) => 1,
            Value::Double(_) => 2,
            Value::Boolean(_) => 3,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Long(a), Value::Long(b)) => a.cmp(b),
            (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::String(value) => value.hash(state),
            Value::Long(value) => value.hash(state),
            Value::Double(value) => value.to_bits().hash(state),
            Value::Boolean(value) => value.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(value) => write!(f, "\"{}\"", value),
            Value::Long(value) => write!(f, "{}", value),
            Value::Double(value) => write!(f, "{}", value),
            Value::Boolean(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Comparator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    Like,
}

impl Comparator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Eq => "==",
            Comparator::Neq => "!=",
            Comparator::Gt => ">",
            Comparator::Gte => ">=",
            Comparator::Lt => "<",
            Comparator::Lte => "<=",
            Comparator::Contains => "contains",
            Comparator::Like => "like",
        }
    }
}

/// Right-hand side of a value comparison
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operand {
    Literal(Value),
    Variable(Variable),
}

/// A comparison applied to an attribute's value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValuePredicate {
    pub comparator: Comparator,
    pub operand: Operand,
}

impl ValuePredicate {
    pub fn new(comparator: Comparator, value: impl Into<Value>) -> Self {
        Self {
            comparator,
            operand: Operand::Literal(value.into()),
        }
    }

    pub fn eq(value: impl Into<Value>) -> Self {
        Self::new(Comparator::Eq, value)
    }

    /// Compare against the value bound to another variable
    pub fn with_variable(comparator: Comparator, var: Variable) -> Self {
        Self {
            comparator,
            operand: Operand::Variable(var),
        }
    }

    /// True for `== literal`, the only predicate answerable from an index
    pub fn is_value_equality(&self) -> bool {
        self.comparator == Comparator::Eq && matches!(self.operand, Operand::Literal(_))
    }

    pub fn inner_variable(&self) -> Option<&Variable> {
        match &self.operand {
            Operand::Variable(var) => Some(var),
            Operand::Literal(_) => None,
        }
    }

    pub fn literal(&self) -> Option<&Value> {
        match &self.operand {
            Operand::Literal(value) => Some(value),
            Operand::Variable(_) => None,
        }
    }
}

impl fmt::Display for ValuePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operand {
            Operand::Literal(value) => write!(f, "{} {}", self.comparator.symbol(), value),
            Operand::Variable(var) => write!(f, "{} {}", self.comparator.symbol(), var),
        }
    }
}

/// How many sub edges a sub constraint may cross
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubDepth {
    /// Reflexive, transitive closure
    Unlimited,
    /// Exactly this many hops; zero means the concept itself
    Exactly(u32),
}

impl SubDepth {
    /// Interpret the conventional integer encoding: -1 unlimited, N hops otherwise
    pub fn from_i32(depth: i32) -> Self {
        if depth < 0 {
            SubDepth::Unlimited
        } else {
            SubDepth::Exactly(depth as u32)
        }
    }
}

impl fmt::Display for SubDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubDepth::Unlimited => write!(f, "*"),
            SubDepth::Exactly(depth) => write!(f, "{}", depth),
        }
    }
}

/// One casting of a relation: an optional role and the player filling it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RolePlayer {
    pub role: Option<Variable>,
    pub player: Variable,
}

/// Declarative constraint on a statement's variable
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    /// `$x type person` (several labels act as alternatives)
    Label(BTreeSet<Label>),
    Id(ConceptId),
    Isa { type_var: Variable, explicit: bool },
    Sub { super_var: Variable, depth: SubDepth },
    Plays { role_var: Variable, required: bool },
    Relates { role_var: Variable },
    /// Type-level ownership: `$t has $a` between types
    Has { attribute_type_var: Variable },
    Key { attribute_type_var: Variable },
    /// Instance-level ownership: `$x has name $n`
    HasAttribute { attribute_type: Label, attribute_var: Variable },
    Relation { role_players: Vec<RolePlayer> },
    Value(ValuePredicate),
    Neq(Variable),
    Regex(String),
    Abstract,
    ValueType(ValueType),
}

/// A variable together with its constraints
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    pub var: Variable,
    pub properties: Vec<Property>,
}

impl Statement {
    pub fn new(var: Variable) -> Self {
        Self {
            var,
            properties: Vec::new(),
        }
    }

    pub fn var(name: &str) -> Self {
        Self::new(Variable::named(name))
    }

    pub fn with(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn label(self, label: &str) -> Self {
        self.with(Property::Label(BTreeSet::from([Label::of(label)])))
    }

    pub fn id(self, id: ConceptId) -> Self {
        self.with(Property::Id(id))
    }

    pub fn isa(self, type_var: &str) -> Self {
        self.with(Property::Isa {
            type_var: Variable::named(type_var),
            explicit: false,
        })
    }

    pub fn sub(self, super_var: &str) -> Self {
        self.with(Property::Sub {
            super_var: Variable::named(super_var),
            depth: SubDepth::Unlimited,
        })
    }

    pub fn plays(self, role_var: &str) -> Self {
        self.with(Property::Plays {
            role_var: Variable::named(role_var),
            required: false,
        })
    }

    pub fn relates(self, role_var: &str) -> Self {
        self.with(Property::Relates {
            role_var: Variable::named(role_var),
        })
    }

    pub fn has(self, attribute_type: &str, attribute_var: &str) -> Self {
        self.with(Property::HasAttribute {
            attribute_type: Label::of(attribute_type),
            attribute_var: Variable::named(attribute_var),
        })
    }

    /// Relation casting; `role` may be empty for an unspecified role
    pub fn rel(mut self, role: Option<&str>, player: &str) -> Self {
        let casting = RolePlayer {
            role: role.map(Variable::named),
            player: Variable::named(player),
        };
        let existing = self.properties.iter_mut().find_map(|property| match property {
            Property::Relation { role_players } => Some(role_players),
            _ => None,
        });
        match existing {
            Some(role_players) => role_players.push(casting),
            None => self.properties.push(Property::Relation {
                role_players: vec![casting],
            }),
        }
        self
    }

    pub fn value(self, predicate: ValuePredicate) -> Self {
        self.with(Property::Value(predicate))
    }

    pub fn neq(self, other: &str) -> Self {
        self.with(Property::Neq(Variable::named(other)))
    }
}

/// Statements that must all hold
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conjunction {
    pub statements: Vec<Statement>,
}

impl Conjunction {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    /// Every variable mentioned anywhere in the conjunction
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut vars = BTreeSet::new();
        for statement in &self.statements {
            vars.insert(statement.var.clone());
            for property in &statement.properties {
                match property {
                    Property::Isa { type_var: var, .. }
                    | Property::Sub { super_var: var, .. }
                    | Property::Plays { role_var: var, .. }
                    | Property::Relates { role_var: var }
                    | Property::Has {
                        attribute_type_var: var,
                    }
                    | Property::Key {
                        attribute_type_var: var,
                    }
                    | Property::HasAttribute {
                        attribute_var: var, ..
                    }
                    | Property::Neq(var) => {
                        vars.insert(var.clone());
                    }
                    Property::Relation { role_players } => {
                        for casting in role_players {
                            vars.insert(casting.player.clone());
                            if let Some(role) = &casting.role {
                                vars.insert(role.clone());
                            }
                        }
                    }
                    Property::Value(predicate) => {
                        if let Some(var) = predicate.inner_variable() {
                            vars.insert(var.clone());
                        }
                    }
                    _ => {}
                }
            }
        }
        vars
    }
}

/// A pattern in disjunctive normal form
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pattern {
    pub conjunctions: Vec<Conjunction>,
}

impl Pattern {
    pub fn new(conjunctions: Vec<Conjunction>) -> Self {
        Self { conjunctions }
    }
}

impl From<Conjunction> for Pattern {
    fn from(conjunction: Conjunction) -> Self {
        Self {
            conjunctions: vec![conjunction],
        }
    }
}
