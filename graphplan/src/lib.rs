// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! GraphPlan - cost-based traversal planning for graph pattern queries
//!
//! A pattern is a disjunction of conjunctions of statements about variables
//! (`$x isa person; $x has name "Alice"`). GraphPlan compiles each conjunction
//! into an ordered list of fragments, each a single traversal step, and then
//! into a [`GraphTraversal`] the executor interprets.
//!
//! # Features
//!
//! - **Fragment model**: Every property lowers to equivalent fragments, one per
//!   traversal direction, with a heuristic cost
//! - **Statistics**: Instance counts refine the cost of leaving indexed types
//! - **Spanning trees**: Plans follow the maximum arborescence of the planning
//!   graph, rooted at the most selective indexed fragment
//! - **Plan cache**: Compiled plans are reused per pattern and schema version
//!
//! # Usage
//!
//! ```ignore
//! let planner = TraversalPlanner::new(&concepts, &statistics, PlannerConfig::default());
//! let plan = planner.create_traversal(&pattern)?;
//! let traversal = plan.graph_traversal(&concepts)?;
//! ```

pub mod cache;
pub mod concept;
pub mod config;
pub mod error;
pub mod pattern;
pub mod plan;
pub mod traversal;

pub use cache::{PlanCache, PlanCacheKey, PlanCacheStats};
pub use concept::{ConceptManager, KeyspaceStatistics};
pub use config::{PlanCacheConfig, PlannerConfig};
pub use error::{PlannerError, PlannerResult};
pub use pattern::{Conjunction, Pattern, Statement, Variable};
pub use plan::{Fragment, TraversalPlan, TraversalPlanner};
pub use traversal::GraphTraversal;

/// GraphPlan version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
