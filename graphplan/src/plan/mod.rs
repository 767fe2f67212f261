// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query planning
//!
//! A conjunction is broken into [`fragment::Fragment`]s grouped in
//! [`equivalent::EquivalentFragmentSet`]s, of which exactly one fragment per
//! set must run. The [`planner::TraversalPlanner`] picks and orders them.

pub mod equivalent;
pub mod fragment;
mod inference;
pub mod planner;
pub mod spanning_tree;
pub mod trace;
pub mod traversal_plan;

pub use equivalent::{ConjunctionQuery, EquivalentFragmentSet};
pub use fragment::{AttributeEdge, Fragment, FragmentKind, RolePlayerEdge};
pub use planner::TraversalPlanner;
pub use trace::{PlanTrace, PlanTracer, PlanningPhase};
pub use traversal_plan::TraversalPlan;
